use comfy_table::Cell;

use crate::circleci::format::EM_DASH;
use crate::views::{
    BranchesView, FlakyTestsView, GraphLayout, JobInsightsView, TestMetricsRow, TestMetricsView,
    Timeline, TriggersView, WorkflowInsightsView, WorkflowRunsView,
};

use super::styling::{bright, cyan, dim};
use super::tables::{
    create_table, cyan_header, flake_count_cell, optional_status_cell, status_cell,
    success_rate_cell,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prints the branch dashboard: one row per branch, active branches on
/// top, plus the count of pipelines routed to the Triggers view.
pub fn print_branches(view: &BranchesView) {
    println!(
        "{} {}",
        bright("Branches for"),
        cyan(&view.project_slug)
    );

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Branch",
        "Status",
        "Latest pipeline",
        "Created",
        "Recent",
    ]));

    for branch in &view.branches {
        table.add_row(vec![
            Cell::new(&branch.name),
            optional_status_cell(branch.workflow_status),
            Cell::new(format!("#{}", branch.latest_pipeline.number)),
            Cell::new(branch.latest_pipeline.created_at.format(TIME_FORMAT)),
            Cell::new(branch.recent_pipeline_count),
        ]);
    }

    println!("{table}");
    println!(
        "{}",
        dim(format!(
            "{} triggered pipelines (see `ciview triggers`)",
            view.triggered_count
        ))
    );
}

/// Prints trigger groups newest first, with their members.
pub fn print_triggers(view: &TriggersView) {
    println!(
        "{} {}",
        bright("Triggered pipelines for"),
        cyan(&view.project_slug)
    );

    if view.groups.is_empty() {
        println!("{}", dim("No triggered pipelines in the fetch window"));
        return;
    }

    for group in &view.groups {
        let sublabel = group
            .sublabel
            .as_deref()
            .map(|s| format!("  {s}"))
            .unwrap_or_default();
        println!("\n{}{}", bright(&group.label), dim(sublabel));

        let mut table = create_table();
        table.set_header(cyan_header(&["Pipeline", "Kind", "Status", "Created"]));
        for member in &group.pipelines {
            table.add_row(vec![
                Cell::new(format!("#{}", member.pipeline.number)),
                Cell::new(format!("{:?}", member.kind).to_lowercase()),
                optional_status_cell(member.workflow_status),
                Cell::new(member.pipeline.created_at.format(TIME_FORMAT)),
            ]);
        }
        println!("{table}");
    }
}

/// Prints the laid-out dependency graph as a position table; the geometry
/// itself is meant for the JSON output.
pub fn print_graph(layout: &GraphLayout) {
    println!(
        "{} {}",
        bright("Dependency graph"),
        dim(format!(
            "({} jobs, {} edges, canvas {}x{})",
            layout.nodes.len(),
            layout.edges.len(),
            layout.width,
            layout.height
        ))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&["Job", "Status", "Column", "Row", "x", "y"]));
    for node in &layout.nodes {
        table.add_row(vec![
            Cell::new(&node.name),
            status_cell(node.status),
            Cell::new(node.depth),
            Cell::new(node.row),
            Cell::new(node.x),
            Cell::new(node.y),
        ]);
    }
    println!("{table}");
}

/// Prints timeline bars in start order with their durations.
pub fn print_timeline(timeline: &Timeline) {
    println!(
        "{} {}",
        bright("Timeline"),
        dim(format!(
            "(total {}, chart {:.0}px)",
            crate::circleci::format::format_duration_ms(timeline.total_duration_ms),
            timeline.chart_width_px
        ))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&["Job", "Status", "Offset px", "Width px", "Duration"]));
    for bar in &timeline.bars {
        table.add_row(vec![
            Cell::new(&bar.name),
            status_cell(bar.status),
            Cell::new(format!("{:.0}", bar.start_offset_px)),
            Cell::new(format!("{:.0}", bar.width_px)),
            Cell::new(&bar.duration_label),
        ]);
    }
    println!("{table}");
}

pub fn print_workflow_insights(view: &WorkflowInsightsView) {
    println!(
        "{} {} {}",
        bright("Workflow insights for"),
        cyan(&view.project_slug),
        dim(format!("({})", view.window))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Workflow",
        "Success",
        "Runs",
        "Failed",
        "Median",
        "P95",
        "MTTR",
    ]));
    for row in &view.workflows {
        table.add_row(vec![
            Cell::new(&row.name),
            success_rate_cell(row.success_rate),
            Cell::new(row.total_runs),
            Cell::new(row.failed_runs),
            Cell::new(&row.duration_median_label),
            Cell::new(&row.duration_p95_label),
            Cell::new(&row.mttr_label),
        ]);
    }
    println!("{table}");
}

pub fn print_workflow_runs(view: &WorkflowRunsView) {
    println!(
        "{} {} {}",
        bright("Recent runs of"),
        cyan(&view.workflow_name),
        dim(format!("in {}", view.project_slug))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&["Run", "Status", "Branch", "Created", "Duration"]));
    for run in &view.runs {
        table.add_row(vec![
            Cell::new(&run.id),
            status_cell(run.status),
            Cell::new(run.branch.as_deref().unwrap_or(EM_DASH)),
            Cell::new(run.created_at.format(TIME_FORMAT)),
            Cell::new(&run.duration_label),
        ]);
    }
    println!("{table}");
}

pub fn print_flaky_tests(view: &FlakyTestsView) {
    println!(
        "{} {} {}",
        bright("Flaky tests for"),
        cyan(&view.project_slug),
        dim(format!("({} total)", view.total_flaky_tests))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&["Test", "Job", "Workflow", "Times flaked"]));
    for test in &view.tests {
        table.add_row(vec![
            Cell::new(&test.test_name),
            Cell::new(&test.job_name),
            Cell::new(test.workflow_name.as_deref().unwrap_or(EM_DASH)),
            flake_count_cell(test.times_flaked),
        ]);
    }
    println!("{table}");
}

pub fn print_job_insights(view: &JobInsightsView) {
    println!(
        "{} {} {}",
        bright("Job insights for"),
        cyan(format!("{}/{}", view.project_slug, view.workflow_name)),
        dim(format!("({})", view.window))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Job", "Success", "Runs", "Failed", "Median", "P95",
    ]));
    for row in &view.jobs {
        table.add_row(vec![
            Cell::new(&row.name),
            success_rate_cell(row.success_rate),
            Cell::new(row.total_runs),
            Cell::new(row.failed_runs),
            Cell::new(&row.duration_median_label),
            Cell::new(&row.duration_p95_label),
        ]);
    }
    println!("{table}");
}

pub fn print_test_metrics(view: &TestMetricsView) {
    println!(
        "{} {}",
        bright("Test metrics for"),
        cyan(format!("{}/{}", view.project_slug, view.workflow_name))
    );
    println!(
        "{}",
        dim(format!(
            "{} test runs, {:.0} tests per run on average",
            view.total_test_runs, view.average_test_count
        ))
    );

    print_test_section("Most failed", &view.most_failed);
    print_test_section("Slowest", &view.slowest);
}

fn print_test_section(title: &str, rows: &[TestMetricsRow]) {
    println!("\n{}", bright(title));

    let mut table = create_table();
    table.set_header(cyan_header(&["Test", "Job", "Failed", "Runs", "P95"]));
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.test_name),
            Cell::new(row.job_name.as_deref().unwrap_or(EM_DASH)),
            Cell::new(row.failed_runs),
            Cell::new(row.total_runs),
            Cell::new(&row.p95_label),
        ]);
    }
    println!("{table}");
}
