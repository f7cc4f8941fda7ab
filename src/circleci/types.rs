use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::Status;

/// One page of a paginated API listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A single triggered run of a project's CI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Provider-assigned pipeline UUID
    pub id: String,
    /// Monotonic per-project sequence number
    pub number: u64,
    /// Pipeline state as reported by the provider
    pub state: Status,
    /// When the pipeline was created
    pub created_at: DateTime<Utc>,
    /// Version-control descriptor; absent for some API-triggered pipelines
    #[serde(default)]
    pub vcs: Option<VcsInfo>,
    /// What triggered the pipeline
    pub trigger: TriggerInfo,
}

impl Pipeline {
    /// Branch this pipeline is bound to, if any. A pipeline without a
    /// branch is a "triggered" pipeline (tag, schedule or direct API call).
    pub fn branch(&self) -> Option<&str> {
        self.vcs.as_ref().and_then(|vcs| vcs.branch.as_deref())
    }

    pub fn tag(&self) -> Option<&str> {
        self.vcs.as_ref().and_then(|vcs| vcs.tag.as_deref())
    }

    pub fn revision(&self) -> Option<&str> {
        self.vcs.as_ref().map(|vcs| vcs.revision.as_str())
    }

    pub fn commit_subject(&self) -> Option<&str> {
        self.vcs
            .as_ref()
            .and_then(|vcs| vcs.commit.as_ref())
            .and_then(|commit| commit.subject.as_deref())
    }
}

/// Version-control metadata attached to a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsInfo {
    /// Branch name; absent for tag- or API-triggered pipelines
    #[serde(default)]
    pub branch: Option<String>,
    /// Git tag; absent unless the pipeline was triggered by a tag push
    #[serde(default)]
    pub tag: Option<String>,
    /// Full revision hash
    pub revision: String,
    /// Commit message metadata, when the provider supplies it
    #[serde(default)]
    pub commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Origin of a pipeline: trigger type plus the actor that caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerInfo {
    /// Trigger type string (e.g. "webhook", "api", "schedule")
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(default)]
    pub actor: Option<Actor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A named sub-graph of jobs within one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    /// Owning pipeline UUID
    pub pipeline_id: String,
    pub pipeline_number: u64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
}

/// A single executable unit within a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub status: Status,
    /// Build step or manual approval gate
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    /// Absent until the job actually starts executing
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
    /// Ids of prerequisite jobs in the same workflow
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    Build,
    Approval,
}

/// Pre-aggregated per-workflow metrics from the provider's insights API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMetricsItem {
    pub name: String,
    pub metrics: WorkflowMetrics,
    #[serde(default)]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMetrics {
    /// Success rate in 0..1
    pub success_rate: f64,
    pub total_runs: u64,
    #[serde(default)]
    pub successful_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
    /// Average runs per day over the reporting window
    #[serde(default)]
    pub throughput: f64,
    /// Mean time to recovery, seconds
    #[serde(default)]
    pub mttr: u64,
    pub duration_metrics: DurationMetrics,
}

/// Duration percentiles in seconds, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationMetrics {
    #[serde(default)]
    pub min: u64,
    #[serde(default)]
    pub max: u64,
    #[serde(default)]
    pub median: u64,
    #[serde(default)]
    pub mean: u64,
    #[serde(default)]
    pub p95: u64,
    #[serde(default)]
    pub standard_deviation: f64,
}

/// One recent run of a named workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: String,
    pub status: Status,
    /// Wall-clock duration, seconds
    #[serde(default)]
    pub duration: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlakyTestsResponse {
    #[serde(default)]
    pub flaky_tests: Vec<FlakyTest>,
    #[serde(default)]
    pub total_flaky_tests: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlakyTest {
    pub test_name: String,
    #[serde(default)]
    pub classname: Option<String>,
    pub job_name: String,
    pub times_flaked: u64,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub pipeline_number: Option<u64>,
}

/// Pre-aggregated per-job metrics for one workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetricsItem {
    pub name: String,
    pub metrics: JobMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetrics {
    pub success_rate: f64,
    pub total_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
    #[serde(default)]
    pub throughput: f64,
    pub duration_metrics: DurationMetrics,
}

/// Aggregated test health for one workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetricsResponse {
    #[serde(default)]
    pub average_test_count: f64,
    #[serde(default)]
    pub total_test_runs: u64,
    #[serde(default)]
    pub most_failed_tests: Vec<TestCounts>,
    #[serde(default)]
    pub slowest_tests: Vec<TestCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCounts {
    pub test_name: String,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub failed_runs: u64,
    #[serde(default)]
    pub total_runs: u64,
    /// 95th percentile runtime, seconds
    #[serde(default)]
    pub p95_duration: f64,
}
