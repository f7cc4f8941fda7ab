use indexmap::IndexMap;
use serde::Serialize;

use super::status::worst_status;
use super::types::Pipeline;
use crate::views::{TriggerGroup, TriggeredPipeline};

/// Maximum length of a group sublabel (commit subject excerpt).
const MAX_SUBLABEL_LEN: usize = 72;

/// Length of the short revision prefix used as a group label.
const SHORT_REVISION_LEN: usize = 7;

/// Classified origin of a branchless pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Tag,
    Api,
    Schedule,
    Other,
}

/// Classifies a triggered (branchless) pipeline. A tag wins regardless of
/// the trigger type; otherwise the trigger-type string decides.
pub fn classify(pipeline: &Pipeline) -> TriggerKind {
    if pipeline.tag().is_some() {
        return TriggerKind::Tag;
    }

    match pipeline.trigger.trigger_type.as_str() {
        "schedule" | "scheduled_pipeline" => TriggerKind::Schedule,
        "api" => TriggerKind::Api,
        _ => TriggerKind::Other,
    }
}

/// Groups triggered pipelines for display, keyed by tag when present and
/// by revision otherwise. Groups and their members are ordered newest
/// first; each group carries the worst status across members that have a
/// resolved workflow status.
pub fn group_triggered(members: Vec<(Pipeline, Option<super::status::Status>)>) -> Vec<TriggerGroup> {
    let mut grouped: IndexMap<String, Vec<TriggeredPipeline>> = IndexMap::new();

    for (pipeline, workflow_status) in members {
        let key = group_key(&pipeline);
        let kind = classify(&pipeline);
        grouped.entry(key).or_default().push(TriggeredPipeline {
            pipeline,
            kind,
            workflow_status,
        });
    }

    let mut groups: Vec<TriggerGroup> = grouped
        .into_iter()
        .map(|(key, mut pipelines)| {
            pipelines.sort_by(|a, b| b.pipeline.created_at.cmp(&a.pipeline.created_at));

            let latest_created_at = pipelines[0].pipeline.created_at;
            let status = worst_status(pipelines.iter().filter_map(|p| p.workflow_status));
            let (label, sublabel) = group_labels(&pipelines[0].pipeline);

            TriggerGroup {
                key,
                label,
                sublabel,
                latest_created_at,
                status,
                pipelines,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.latest_created_at.cmp(&a.latest_created_at));
    groups
}

fn group_key(pipeline: &Pipeline) -> String {
    match pipeline.tag() {
        Some(tag) => format!("tag:{tag}"),
        None => format!("sha:{}", pipeline.revision().unwrap_or("unknown")),
    }
}

fn group_labels(pipeline: &Pipeline) -> (String, Option<String>) {
    let short_revision = pipeline.revision().map(short_revision);
    let subject = pipeline.commit_subject().map(|s| truncate(s, MAX_SUBLABEL_LEN));

    match pipeline.tag() {
        Some(tag) => {
            // Tag groups compose the revision into the sublabel so both
            // identities stay visible.
            let sublabel = match (short_revision, subject) {
                (Some(rev), Some(subject)) => Some(format!("{rev} · {subject}")),
                (Some(rev), None) => Some(rev),
                (None, subject) => subject,
            };
            (tag.to_string(), sublabel)
        }
        None => {
            let label = short_revision.unwrap_or_else(|| "unknown".to_string());
            (label, subject)
        }
    }
}

fn short_revision(revision: &str) -> String {
    revision.chars().take(SHORT_REVISION_LEN).collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{prefix}…")
    }
}
