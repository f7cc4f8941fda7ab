use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::format::format_duration_ms;
use super::types::{
    FlakyTestsResponse, JobMetricsItem, TestCounts, TestMetricsResponse, WorkflowMetricsItem,
    WorkflowRun,
};
use crate::views::{
    FlakyTestRow, FlakyTestsView, JobInsightRow, JobInsightsView, TestMetricsRow, TestMetricsView,
    WorkflowInsightRow, WorkflowInsightsView, WorkflowRunRow, WorkflowRunsView,
};

pub(super) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn seconds_label(seconds: u64) -> String {
    let ms = i64::try_from(seconds).unwrap_or(i64::MAX).saturating_mul(1000);
    format_duration_ms(ms)
}

/// Shapes the provider's pre-aggregated workflow metrics into a view,
/// worst success rate first so problem workflows surface on top.
pub fn summarize_workflow_insights(
    project_slug: &str,
    window: &str,
    items: Vec<WorkflowMetricsItem>,
    collected_at: DateTime<Utc>,
) -> WorkflowInsightsView {
    let mut workflows: Vec<WorkflowInsightRow> = items
        .into_iter()
        .map(|item| WorkflowInsightRow {
            name: item.name,
            success_rate: item.metrics.success_rate,
            total_runs: item.metrics.total_runs,
            failed_runs: item.metrics.failed_runs,
            throughput: item.metrics.throughput,
            mttr_label: seconds_label(item.metrics.mttr),
            duration_median_label: seconds_label(item.metrics.duration_metrics.median),
            duration_p95_label: seconds_label(item.metrics.duration_metrics.p95),
        })
        .collect();

    workflows.sort_by(|a, b| {
        cmp_f64(a.success_rate, b.success_rate).then_with(|| b.total_runs.cmp(&a.total_runs))
    });

    WorkflowInsightsView {
        project_slug: project_slug.to_string(),
        window: window.to_string(),
        collected_at,
        workflows,
    }
}

/// Recent runs of one workflow, newest first.
pub fn summarize_workflow_runs(
    project_slug: &str,
    workflow_name: &str,
    runs: Vec<WorkflowRun>,
    collected_at: DateTime<Utc>,
) -> WorkflowRunsView {
    let mut rows: Vec<WorkflowRunRow> = runs
        .into_iter()
        .map(|run| WorkflowRunRow {
            id: run.id,
            status: run.status,
            branch: run.branch,
            created_at: run.created_at,
            duration_label: match run.duration {
                Some(seconds) => seconds_label(seconds),
                None => format_duration_ms(-1),
            },
        })
        .collect();

    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    WorkflowRunsView {
        project_slug: project_slug.to_string(),
        workflow_name: workflow_name.to_string(),
        collected_at,
        runs: rows,
    }
}

/// Flaky tests ordered by how often they flaked.
pub fn summarize_flaky_tests(
    project_slug: &str,
    response: FlakyTestsResponse,
    collected_at: DateTime<Utc>,
) -> FlakyTestsView {
    let mut tests: Vec<FlakyTestRow> = response
        .flaky_tests
        .into_iter()
        .map(|test| FlakyTestRow {
            test_name: test.test_name,
            job_name: test.job_name,
            times_flaked: test.times_flaked,
            workflow_name: test.workflow_name,
        })
        .collect();

    tests.sort_by(|a, b| {
        b.times_flaked
            .cmp(&a.times_flaked)
            .then_with(|| a.test_name.cmp(&b.test_name))
    });

    FlakyTestsView {
        project_slug: project_slug.to_string(),
        collected_at,
        total_flaky_tests: response.total_flaky_tests,
        tests,
    }
}

/// Per-job metrics for one workflow, slowest p95 first.
pub fn summarize_job_insights(
    project_slug: &str,
    workflow_name: &str,
    window: &str,
    items: Vec<JobMetricsItem>,
    collected_at: DateTime<Utc>,
) -> JobInsightsView {
    let mut jobs: Vec<(u64, JobInsightRow)> = items
        .into_iter()
        .map(|item| {
            let p95 = item.metrics.duration_metrics.p95;
            let row = JobInsightRow {
                name: item.name,
                success_rate: item.metrics.success_rate,
                total_runs: item.metrics.total_runs,
                failed_runs: item.metrics.failed_runs,
                duration_median_label: seconds_label(item.metrics.duration_metrics.median),
                duration_p95_label: seconds_label(p95),
            };
            (p95, row)
        })
        .collect();

    jobs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));

    JobInsightsView {
        project_slug: project_slug.to_string(),
        workflow_name: workflow_name.to_string(),
        window: window.to_string(),
        collected_at,
        jobs: jobs.into_iter().map(|(_, row)| row).collect(),
    }
}

/// Test health for one workflow.
pub fn summarize_test_metrics(
    project_slug: &str,
    workflow_name: &str,
    response: TestMetricsResponse,
    collected_at: DateTime<Utc>,
) -> TestMetricsView {
    #[allow(clippy::cast_possible_truncation)]
    fn to_row(test: TestCounts) -> TestMetricsRow {
        TestMetricsRow {
            test_name: test.test_name,
            job_name: test.job_name,
            failed_runs: test.failed_runs,
            total_runs: test.total_runs,
            p95_label: format_duration_ms((test.p95_duration * 1000.0) as i64),
        }
    }

    TestMetricsView {
        project_slug: project_slug.to_string(),
        workflow_name: workflow_name.to_string(),
        collected_at,
        average_test_count: response.average_test_count,
        total_test_runs: response.total_test_runs,
        most_failed: response.most_failed_tests.into_iter().map(to_row).collect(),
        slowest: response.slowest_tests.into_iter().map(to_row).collect(),
    }
}
