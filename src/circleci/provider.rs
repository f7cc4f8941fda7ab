use std::collections::HashMap;

use chrono::Utc;
use log::{info, warn};

use crate::auth::Token;
use crate::error::Result;
use crate::output::PhaseProgress;
use crate::views::{
    BranchesView, FlakyTestsView, GraphLayout, JobInsightsView, TestMetricsView, Timeline,
    TriggersView, WorkflowInsightsView, WorkflowRunsView,
};

use super::analytics;
use super::branches::{assemble_branches, partition_pipelines};
use super::client::CircleClient;
use super::graph::layout_graph;
use super::status::{worst_status, Status};
use super::timeline::derive_timeline;
use super::triggers::group_triggered;

/// Derives dashboard views for one project.
///
/// Every `collect_*` call fetches a fresh snapshot and recomputes its view
/// from scratch; the provider holds no state between calls beyond the
/// client and its configuration.
pub struct CircleProvider {
    client: CircleClient,
    project_slug: String,
    fan_out_batch: usize,
}

impl CircleProvider {
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed or the HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: &str,
        project_slug: String,
        token: Option<&Token>,
        fan_out_batch: usize,
    ) -> Result<Self> {
        let client = CircleClient::new(base_url, token)?;

        Ok(Self {
            client,
            project_slug,
            fan_out_batch: fan_out_batch.max(1),
        })
    }

    pub fn project_slug(&self) -> &str {
        &self.project_slug
    }

    /// Branch summaries for the project: one row per branch seen in the
    /// fetch window, most recent pipeline retained, worst workflow status
    /// resolved per branch.
    ///
    /// # Errors
    ///
    /// Fails only if the base pipeline listing fails; per-branch workflow
    /// fetch failures are absorbed and leave that branch without a status.
    pub async fn collect_branches(&self, max_pages: usize) -> Result<BranchesView> {
        info!(
            "Collecting branch summaries for {} (up to {max_pages} pages)",
            self.project_slug
        );
        let progress = PhaseProgress::start(3, format!("Fetching up to {max_pages} pages of pipelines..."));

        let pipelines = self
            .client
            .fetch_pipelines(&self.project_slug, None, max_pages)
            .await?;
        let buckets = partition_pipelines(pipelines);

        let progress = progress.next(
            format!(
                "Fetched pipelines for {} branches ({} triggered)",
                buckets.branches.len(),
                buckets.triggered.len()
            ),
            "Resolving workflow statuses...",
        );

        let pipeline_ids: Vec<String> = buckets
            .branches
            .values()
            .map(|bucket| bucket.latest.id.clone())
            .collect();
        let resolved = self.resolve_statuses(&pipeline_ids).await;

        let statuses: HashMap<String, Status> = buckets
            .branches
            .keys()
            .cloned()
            .zip(resolved)
            .filter_map(|(name, status)| status.map(|s| (name, s)))
            .collect();

        let progress = progress.next("Resolved workflow statuses", "Deriving branch summaries...");

        let triggered_count = buckets.triggered.len();
        let branches = assemble_branches(buckets.branches, &statuses);

        progress.finish(format!("Derived {} branch summaries", branches.len()));

        Ok(BranchesView {
            project_slug: self.project_slug.clone(),
            collected_at: Utc::now(),
            branches,
            triggered_count,
        })
    }

    /// Triggered (branchless) pipelines grouped by tag or revision.
    ///
    /// # Errors
    ///
    /// Fails only if the base pipeline listing fails; per-pipeline
    /// workflow fetch failures are absorbed.
    pub async fn collect_triggers(&self, max_pages: usize) -> Result<TriggersView> {
        info!(
            "Collecting trigger groups for {} (up to {max_pages} pages)",
            self.project_slug
        );

        let pipelines = self
            .client
            .fetch_pipelines(&self.project_slug, None, max_pages)
            .await?;
        let triggered = partition_pipelines(pipelines).triggered;

        let pipeline_ids: Vec<String> = triggered.iter().map(|p| p.id.clone()).collect();
        let resolved = self.resolve_statuses(&pipeline_ids).await;

        let members = triggered.into_iter().zip(resolved).collect();

        Ok(TriggersView {
            project_slug: self.project_slug.clone(),
            collected_at: Utc::now(),
            groups: group_triggered(members),
        })
    }

    /// Dependency-graph geometry for one workflow's jobs.
    ///
    /// # Errors
    ///
    /// Fails if the job listing fails.
    pub async fn collect_graph(&self, workflow_id: &str) -> Result<GraphLayout> {
        let jobs = self.client.fetch_jobs(workflow_id).await?;
        Ok(layout_graph(&jobs))
    }

    /// Execution-timeline geometry for one workflow's jobs.
    ///
    /// # Errors
    ///
    /// Fails if the job listing fails.
    pub async fn collect_timeline(&self, workflow_id: &str) -> Result<Timeline> {
        let jobs = self.client.fetch_jobs(workflow_id).await?;
        Ok(derive_timeline(&jobs, Utc::now()))
    }

    /// # Errors
    ///
    /// Fails if the insights listing fails.
    pub async fn collect_workflow_insights(&self, window: &str) -> Result<WorkflowInsightsView> {
        let items = self
            .client
            .fetch_workflow_insights(&self.project_slug, window)
            .await?;
        Ok(analytics::summarize_workflow_insights(
            &self.project_slug,
            window,
            items,
            Utc::now(),
        ))
    }

    /// # Errors
    ///
    /// Fails if the run listing fails.
    pub async fn collect_workflow_runs(&self, workflow_name: &str) -> Result<WorkflowRunsView> {
        let runs = self
            .client
            .fetch_workflow_runs(&self.project_slug, workflow_name)
            .await?;
        Ok(analytics::summarize_workflow_runs(
            &self.project_slug,
            workflow_name,
            runs,
            Utc::now(),
        ))
    }

    /// # Errors
    ///
    /// Fails if the flaky-test listing fails.
    pub async fn collect_flaky_tests(&self) -> Result<FlakyTestsView> {
        let response = self.client.fetch_flaky_tests(&self.project_slug).await?;
        Ok(analytics::summarize_flaky_tests(
            &self.project_slug,
            response,
            Utc::now(),
        ))
    }

    /// # Errors
    ///
    /// Fails if the job-insights listing fails.
    pub async fn collect_job_insights(
        &self,
        workflow_name: &str,
        window: &str,
    ) -> Result<JobInsightsView> {
        let items = self
            .client
            .fetch_job_insights(&self.project_slug, workflow_name, window)
            .await?;
        Ok(analytics::summarize_job_insights(
            &self.project_slug,
            workflow_name,
            window,
            items,
            Utc::now(),
        ))
    }

    /// # Errors
    ///
    /// Fails if the test-metrics fetch fails.
    pub async fn collect_test_metrics(&self, workflow_name: &str) -> Result<TestMetricsView> {
        let response = self
            .client
            .fetch_test_metrics(&self.project_slug, workflow_name)
            .await?;
        Ok(analytics::summarize_test_metrics(
            &self.project_slug,
            workflow_name,
            response,
            Utc::now(),
        ))
    }

    /// Resolves the worst workflow status per pipeline id, issuing fetches
    /// in fixed-size batches rather than one unbounded parallel wave. The
    /// batch boundary is a rate-limit throttle only; every id gets exactly
    /// one slot in the result.
    async fn resolve_statuses(&self, pipeline_ids: &[String]) -> Vec<Option<Status>> {
        let mut resolved = Vec::with_capacity(pipeline_ids.len());

        for batch in pipeline_ids.chunks(self.fan_out_batch) {
            let fetches: Vec<_> = batch
                .iter()
                .map(|id| self.resolve_workflow_status(id))
                .collect();
            resolved.extend(futures::future::join_all(fetches).await);
        }

        resolved
    }

    async fn resolve_workflow_status(&self, pipeline_id: &str) -> Option<Status> {
        match self.client.fetch_workflows(pipeline_id).await {
            Ok(workflows) => worst_status(workflows.iter().map(|w| w.status)),
            Err(e) => {
                warn!("Failed to fetch workflows for pipeline {pipeline_id}: {e}");
                None
            }
        }
    }
}
