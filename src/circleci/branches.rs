use std::collections::HashMap;

use indexmap::IndexMap;

use super::status::Status;
use super::types::Pipeline;
use crate::views::BranchSummary;

/// Pipelines of one fetch window split into branch buckets and the
/// branchless remainder.
#[derive(Debug, Default)]
pub struct BranchBuckets {
    /// Keyed by branch name, in first-seen order. The input is newest
    /// first, so the retained pipeline per branch is the most recent one.
    pub branches: IndexMap<String, BranchBucket>,
    /// Pipelines with no branch (tag / schedule / API triggered).
    pub triggered: Vec<Pipeline>,
}

#[derive(Debug)]
pub struct BranchBucket {
    pub latest: Pipeline,
    pub count: usize,
}

/// Partitions a reverse-chronological pipeline listing by branch, keeping
/// the most recent pipeline and a running count per branch.
pub fn partition_pipelines(pipelines: Vec<Pipeline>) -> BranchBuckets {
    let mut buckets = BranchBuckets::default();

    for pipeline in pipelines {
        match pipeline.branch() {
            Some(branch) => match buckets.branches.entry(branch.to_string()) {
                indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().count += 1,
                indexmap::map::Entry::Vacant(entry) => {
                    entry.insert(BranchBucket {
                        latest: pipeline,
                        count: 1,
                    });
                }
            },
            None => buckets.triggered.push(pipeline),
        }
    }

    buckets
}

/// Joins branch buckets with their resolved worst workflow statuses and
/// orders the result for display: branches with active work first, then by
/// latest pipeline creation time descending.
pub fn assemble_branches(
    buckets: IndexMap<String, BranchBucket>,
    statuses: &HashMap<String, Status>,
) -> Vec<BranchSummary> {
    let mut branches: Vec<BranchSummary> = buckets
        .into_iter()
        .map(|(name, bucket)| {
            let workflow_status = statuses.get(&name).copied();
            BranchSummary {
                name,
                latest_pipeline: bucket.latest,
                workflow_status,
                recent_pipeline_count: bucket.count,
            }
        })
        .collect();

    branches.sort_by(|a, b| {
        let a_active = a.workflow_status.is_some_and(Status::is_active);
        let b_active = b.workflow_status.is_some_and(Status::is_active);
        b_active
            .cmp(&a_active)
            .then_with(|| b.latest_pipeline.created_at.cmp(&a.latest_pipeline.created_at))
    });

    branches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::circleci::types::TriggerInfo;

    fn pipeline(number: u64, branch: Option<&str>, created_minute: u32) -> Pipeline {
        Pipeline {
            id: format!("pipeline-{number}"),
            number,
            state: Status::Created,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, created_minute, 0).unwrap(),
            vcs: branch.map(|name| crate::circleci::types::VcsInfo {
                branch: Some(name.to_string()),
                tag: None,
                revision: "0123456789abcdef".to_string(),
                commit: None,
            }),
            trigger: TriggerInfo {
                trigger_type: "webhook".to_string(),
                actor: None,
            },
        }
    }

    mod partition_pipelines {
        use super::*;

        #[test]
        fn keeps_most_recent_pipeline_and_counts_the_rest() {
            // Newest first, 3 for main and 2 for dev
            let pipelines = vec![
                pipeline(5, Some("main"), 50),
                pipeline(4, Some("dev"), 40),
                pipeline(3, Some("main"), 30),
                pipeline(2, Some("dev"), 20),
                pipeline(1, Some("main"), 10),
            ];

            let buckets = partition_pipelines(pipelines);

            assert_eq!(buckets.branches.len(), 2);
            let main = &buckets.branches["main"];
            assert_eq!(main.count, 3);
            assert_eq!(main.latest.number, 5);
            let dev = &buckets.branches["dev"];
            assert_eq!(dev.count, 2);
            assert_eq!(dev.latest.number, 4);
            assert!(buckets.triggered.is_empty());
        }

        #[test]
        fn separates_branchless_pipelines() {
            let pipelines = vec![
                pipeline(3, Some("main"), 30),
                pipeline(2, None, 20),
                pipeline(1, None, 10),
            ];

            let buckets = partition_pipelines(pipelines);

            assert_eq!(buckets.branches.len(), 1);
            assert_eq!(buckets.triggered.len(), 2);
        }

        #[test]
        fn empty_input_yields_empty_buckets() {
            let buckets = partition_pipelines(Vec::new());
            assert!(buckets.branches.is_empty());
            assert!(buckets.triggered.is_empty());
        }
    }

    mod assemble_branches {
        use super::*;

        #[test]
        fn active_branches_sort_first_then_newest() {
            let buckets = partition_pipelines(vec![
                pipeline(4, Some("newest-idle"), 40),
                pipeline(3, Some("old-active"), 10),
                pipeline(2, Some("mid-idle"), 20),
            ]);

            let mut statuses = HashMap::new();
            statuses.insert("newest-idle".to_string(), Status::Success);
            statuses.insert("old-active".to_string(), Status::Running);
            statuses.insert("mid-idle".to_string(), Status::Failed);

            let branches = assemble_branches(buckets.branches, &statuses);

            let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(names, vec!["old-active", "newest-idle", "mid-idle"]);
        }

        #[test]
        fn missing_status_is_absent_not_an_error() {
            let buckets = partition_pipelines(vec![pipeline(1, Some("main"), 10)]);
            let branches = assemble_branches(buckets.branches, &HashMap::new());

            assert_eq!(branches.len(), 1);
            assert_eq!(branches[0].workflow_status, None);
            assert_eq!(branches[0].recent_pipeline_count, 1);
        }

        #[test]
        fn each_summary_references_only_the_latest_pipeline() {
            let buckets = partition_pipelines(vec![
                pipeline(9, Some("main"), 50),
                pipeline(8, Some("main"), 40),
                pipeline(7, Some("main"), 30),
            ]);
            let branches = assemble_branches(buckets.branches, &HashMap::new());

            assert_eq!(branches.len(), 1);
            assert_eq!(branches[0].latest_pipeline.number, 9);
            assert_eq!(branches[0].recent_pipeline_count, 3);
        }
    }
}
