//! View models handed to renderers.
//!
//! Every type here is an immutable value record rebuilt from scratch on
//! each collection pass; nothing holds live references into the fetch
//! layer and nothing is patched incrementally.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::circleci::status::Status;
use crate::circleci::triggers::TriggerKind;
use crate::circleci::types::{JobType, Pipeline};

/// One branch with its most recent pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct BranchSummary {
    pub name: String,
    pub latest_pipeline: Pipeline,
    /// Worst workflow status of the latest pipeline; absent when the
    /// per-branch workflow fetch failed or returned nothing.
    pub workflow_status: Option<Status>,
    /// Pipelines seen for this branch in the current fetch window.
    pub recent_pipeline_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchesView {
    pub project_slug: String,
    pub collected_at: DateTime<Utc>,
    pub branches: Vec<BranchSummary>,
    /// Pipelines without a branch, shown in the Triggers view instead.
    pub triggered_count: usize,
}

impl BranchesView {
    pub fn has_active(&self) -> bool {
        self.branches.iter().any(|branch| {
            branch.workflow_status.is_some_and(Status::is_active)
                || branch.latest_pipeline.state.is_active()
        })
    }
}

/// A branchless pipeline with its classification and resolved status.
#[derive(Debug, Clone, Serialize)]
pub struct TriggeredPipeline {
    pub pipeline: Pipeline,
    pub kind: TriggerKind,
    pub workflow_status: Option<Status>,
}

/// Display group of triggered pipelines sharing a tag or revision.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerGroup {
    /// `tag:<tag>` or `sha:<revision>`
    pub key: String,
    pub label: String,
    pub sublabel: Option<String>,
    pub latest_created_at: DateTime<Utc>,
    /// Worst status across members with a resolved workflow status.
    pub status: Option<Status>,
    /// Members, newest first.
    pub pipelines: Vec<TriggeredPipeline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggersView {
    pub project_slug: String,
    pub collected_at: DateTime<Utc>,
    pub groups: Vec<TriggerGroup>,
}

impl TriggersView {
    pub fn has_active(&self) -> bool {
        self.groups.iter().flat_map(|group| &group.pipelines).any(|member| {
            member.workflow_status.is_some_and(Status::is_active)
                || member.pipeline.state.is_active()
        })
    }
}

/// A laid-out job in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub job_id: String,
    pub name: String,
    pub status: Status,
    pub job_type: JobType,
    /// Longest path from a dependency-free root; the layout column.
    pub depth: usize,
    /// Stable position within the column.
    pub row: usize,
    pub x: u32,
    pub y: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

/// A dependency edge carrying both endpoint snapshots so renderers can
/// color it without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: GraphNode,
    pub to: GraphNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLayout {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub width: u32,
    pub height: u32,
}

impl GraphLayout {
    pub fn has_active(&self) -> bool {
        self.nodes.iter().any(|node| node.status.is_active())
    }
}

/// One horizontal bar of the execution timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBar {
    pub job_id: String,
    pub name: String,
    pub status: Status,
    pub start_offset_px: f64,
    pub width_px: f64,
    pub duration_ms: i64,
    pub duration_label: String,
}

/// A vertical grid line of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineTick {
    pub offset_ms: i64,
    pub x_px: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Shared time origin; `None` when no job has started.
    pub started_at: Option<DateTime<Utc>>,
    pub total_duration_ms: i64,
    pub chart_width_px: f64,
    pub bars: Vec<TimelineBar>,
    pub ticks: Vec<TimelineTick>,
}

impl Timeline {
    pub fn has_active(&self) -> bool {
        self.bars.iter().any(|bar| bar.status.is_active())
    }
}

/// Per-workflow health over a reporting window, worst success rate first.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInsightsView {
    pub project_slug: String,
    pub window: String,
    pub collected_at: DateTime<Utc>,
    pub workflows: Vec<WorkflowInsightRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInsightRow {
    pub name: String,
    pub success_rate: f64,
    pub total_runs: u64,
    pub failed_runs: u64,
    pub throughput: f64,
    pub mttr_label: String,
    pub duration_median_label: String,
    pub duration_p95_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRunsView {
    pub project_slug: String,
    pub workflow_name: String,
    pub collected_at: DateTime<Utc>,
    pub runs: Vec<WorkflowRunRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRunRow {
    pub id: String,
    pub status: Status,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub duration_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlakyTestsView {
    pub project_slug: String,
    pub collected_at: DateTime<Utc>,
    pub total_flaky_tests: u64,
    pub tests: Vec<FlakyTestRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlakyTestRow {
    pub test_name: String,
    pub job_name: String,
    pub times_flaked: u64,
    pub workflow_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobInsightsView {
    pub project_slug: String,
    pub workflow_name: String,
    pub window: String,
    pub collected_at: DateTime<Utc>,
    pub jobs: Vec<JobInsightRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobInsightRow {
    pub name: String,
    pub success_rate: f64,
    pub total_runs: u64,
    pub failed_runs: u64,
    pub duration_median_label: String,
    pub duration_p95_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestMetricsView {
    pub project_slug: String,
    pub workflow_name: String,
    pub collected_at: DateTime<Utc>,
    pub average_test_count: f64,
    pub total_test_runs: u64,
    pub most_failed: Vec<TestMetricsRow>,
    pub slowest: Vec<TestMetricsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestMetricsRow {
    pub test_name: String,
    pub job_name: Option<String>,
    pub failed_runs: u64,
    pub total_runs: u64,
    pub p95_label: String,
}
