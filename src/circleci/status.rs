use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Execution state of a pipeline, workflow or job.
///
/// The provider reports three overlapping string vocabularies (pipeline
/// states, workflow states, job states). They are collapsed into one closed
/// enum so that worst-status aggregation, the activity predicate and the
/// badge lookup all share a single source of truth. Any string the provider
/// ever sends maps to exactly one variant; unrecognized strings map to
/// [`Status::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    // Pipeline states
    Created,
    Errored,
    SetupPending,
    Setup,
    Pending,
    // Workflow states
    Success,
    Running,
    NotRun,
    Failed,
    Error,
    Failing,
    OnHold,
    Canceled,
    Unauthorized,
    // Job-only states
    Retried,
    Queued,
    NotRunning,
    InfrastructureFail,
    Timedout,
    TerminatedUnknown,
    Blocked,
    /// Fallback for strings outside the known vocabularies.
    Unknown,
}

/// Worst-first priority order used by [`worst_status`]. Statuses not listed
/// here never win the aggregation on their own.
const WORST_FIRST: [Status; 9] = [
    Status::Failed,
    Status::Error,
    Status::Failing,
    Status::Running,
    Status::OnHold,
    Status::Canceled,
    Status::NotRun,
    Status::Unauthorized,
    Status::Success,
];

impl Status {
    /// Total mapping from a wire string. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "created" => Self::Created,
            "errored" => Self::Errored,
            "setup-pending" => Self::SetupPending,
            "setup" => Self::Setup,
            "pending" => Self::Pending,
            "success" => Self::Success,
            "running" => Self::Running,
            "not_run" => Self::NotRun,
            "failed" => Self::Failed,
            "error" => Self::Error,
            "failing" => Self::Failing,
            "on_hold" => Self::OnHold,
            "canceled" => Self::Canceled,
            "unauthorized" => Self::Unauthorized,
            "retried" => Self::Retried,
            "queued" => Self::Queued,
            "not_running" => Self::NotRunning,
            "infrastructure_fail" => Self::InfrastructureFail,
            "timedout" => Self::Timedout,
            "terminated-unknown" => Self::TerminatedUnknown,
            "blocked" => Self::Blocked,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Errored => "errored",
            Self::SetupPending => "setup-pending",
            Self::Setup => "setup",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Running => "running",
            Self::NotRun => "not_run",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Failing => "failing",
            Self::OnHold => "on_hold",
            Self::Canceled => "canceled",
            Self::Unauthorized => "unauthorized",
            Self::Retried => "retried",
            Self::Queued => "queued",
            Self::NotRunning => "not_running",
            Self::InfrastructureFail => "infrastructure_fail",
            Self::Timedout => "timedout",
            Self::TerminatedUnknown => "terminated-unknown",
            Self::Blocked => "blocked",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this status represents work still in progress, as opposed to
    /// a terminal success/failure/cancellation.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Running
                | Self::Failing
                | Self::Queued
                | Self::NotRunning
                | Self::Created
                | Self::Pending
                | Self::SetupPending
                | Self::Setup
        )
    }

    /// Visual token for rendering this status. Same status, same token.
    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Success => StatusBadge::new("Success", StatusColor::Success, "✓"),
            Self::Failed => StatusBadge::new("Failed", StatusColor::Failure, "✕"),
            Self::Error => StatusBadge::new("Error", StatusColor::Failure, "✕"),
            Self::Errored => StatusBadge::new("Errored", StatusColor::Failure, "✕"),
            Self::Failing => StatusBadge::new("Failing", StatusColor::Failure, "▼"),
            Self::InfrastructureFail => {
                StatusBadge::new("Infra fail", StatusColor::Failure, "✕")
            }
            Self::Timedout => StatusBadge::new("Timed out", StatusColor::Failure, "⏱"),
            Self::TerminatedUnknown => {
                StatusBadge::new("Terminated", StatusColor::Failure, "✕")
            }
            Self::Running => StatusBadge::new("Running", StatusColor::Info, "●"),
            Self::Pending => StatusBadge::new("Pending", StatusColor::Info, "◌"),
            Self::Created => StatusBadge::new("Created", StatusColor::Info, "◌"),
            Self::Setup => StatusBadge::new("Setup", StatusColor::Info, "◌"),
            Self::SetupPending => StatusBadge::new("Setup pending", StatusColor::Info, "◌"),
            Self::Queued => StatusBadge::new("Queued", StatusColor::Info, "◌"),
            Self::NotRunning => StatusBadge::new("Not running", StatusColor::Info, "◌"),
            Self::OnHold => StatusBadge::new("On hold", StatusColor::Warning, "⏸"),
            Self::Blocked => StatusBadge::new("Blocked", StatusColor::Warning, "⊘"),
            Self::Retried => StatusBadge::new("Retried", StatusColor::Warning, "↻"),
            Self::Canceled => StatusBadge::new("Canceled", StatusColor::Neutral, "⊘"),
            Self::NotRun => StatusBadge::new("Not run", StatusColor::Neutral, "−"),
            Self::Unauthorized => StatusBadge::new("Unauthorized", StatusColor::Neutral, "⊘"),
            Self::Unknown => StatusBadge::new("Unknown", StatusColor::Neutral, "?"),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// Semantic color category of a status badge. The terminal renderer and any
/// downstream UI map these to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Success,
    Failure,
    Warning,
    Info,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: StatusColor,
    pub icon: &'static str,
}

impl StatusBadge {
    const fn new(label: &'static str, color: StatusColor, icon: &'static str) -> Self {
        Self { label, color, icon }
    }
}

/// Collapses a collection of statuses to the single worst one.
///
/// The worst status is the earliest match in a fixed priority order
/// (`failed > error > failing > running > on_hold > canceled > not_run >
/// unauthorized > success`). If no member appears in that order the first
/// element by iteration order is returned; an empty collection yields
/// `None` and the caller treats it as unknown.
pub fn worst_status<I>(statuses: I) -> Option<Status>
where
    I: IntoIterator<Item = Status>,
{
    let statuses: Vec<Status> = statuses.into_iter().collect();

    for candidate in WORST_FIRST {
        if statuses.contains(&candidate) {
            return Some(candidate);
        }
    }

    statuses.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse {
        use super::*;

        #[test]
        fn maps_every_known_wire_string() {
            assert_eq!(Status::parse("success"), Status::Success);
            assert_eq!(Status::parse("setup-pending"), Status::SetupPending);
            assert_eq!(Status::parse("not_run"), Status::NotRun);
            assert_eq!(Status::parse("infrastructure_fail"), Status::InfrastructureFail);
            assert_eq!(Status::parse("terminated-unknown"), Status::TerminatedUnknown);
        }

        #[test]
        fn falls_back_to_unknown() {
            assert_eq!(Status::parse("zombie"), Status::Unknown);
            assert_eq!(Status::parse(""), Status::Unknown);
        }

        #[test]
        fn round_trips_through_as_str() {
            let all = [
                Status::Created,
                Status::Errored,
                Status::SetupPending,
                Status::Setup,
                Status::Pending,
                Status::Success,
                Status::Running,
                Status::NotRun,
                Status::Failed,
                Status::Error,
                Status::Failing,
                Status::OnHold,
                Status::Canceled,
                Status::Unauthorized,
                Status::Retried,
                Status::Queued,
                Status::NotRunning,
                Status::InfrastructureFail,
                Status::Timedout,
                Status::TerminatedUnknown,
                Status::Blocked,
            ];
            for status in all {
                assert_eq!(Status::parse(status.as_str()), status);
            }
        }

        #[test]
        fn deserializes_from_json_strings() {
            let status: Status = serde_json::from_str("\"on_hold\"").unwrap();
            assert_eq!(status, Status::OnHold);

            let unknown: Status = serde_json::from_str("\"whatever\"").unwrap();
            assert_eq!(unknown, Status::Unknown);
        }

        #[test]
        fn serializes_to_wire_strings() {
            assert_eq!(serde_json::to_string(&Status::SetupPending).unwrap(), "\"setup-pending\"");
            assert_eq!(serde_json::to_string(&Status::Unknown).unwrap(), "\"unknown\"");
        }
    }

    mod worst_status {
        use super::*;

        #[test]
        fn returns_none_for_empty_input() {
            assert_eq!(worst_status([]), None);
        }

        #[test]
        fn single_distinct_status_returns_itself() {
            assert_eq!(worst_status([Status::Success]), Some(Status::Success));
            assert_eq!(
                worst_status([Status::Canceled, Status::Canceled]),
                Some(Status::Canceled)
            );
        }

        #[test]
        fn failed_beats_success() {
            assert_eq!(
                worst_status([Status::Success, Status::Failed]),
                Some(Status::Failed)
            );
        }

        #[test]
        fn running_beats_success() {
            assert_eq!(
                worst_status([Status::Running, Status::Success]),
                Some(Status::Running)
            );
        }

        #[test]
        fn is_order_independent() {
            let forward = worst_status([Status::Success, Status::OnHold, Status::Error]);
            let backward = worst_status([Status::Error, Status::OnHold, Status::Success]);
            assert_eq!(forward, Some(Status::Error));
            assert_eq!(forward, backward);
        }

        #[test]
        fn statuses_outside_the_order_fall_back_to_first_element() {
            assert_eq!(
                worst_status([Status::Queued, Status::Blocked]),
                Some(Status::Queued)
            );
        }

        #[test]
        fn ordered_member_wins_over_unordered_ones() {
            assert_eq!(
                worst_status([Status::Queued, Status::Success, Status::Blocked]),
                Some(Status::Success)
            );
        }
    }

    mod is_active {
        use super::*;

        #[test]
        fn terminal_statuses_are_not_active() {
            assert!(!Status::Success.is_active());
            assert!(!Status::Failed.is_active());
            assert!(!Status::Canceled.is_active());
            assert!(!Status::OnHold.is_active());
            assert!(!Status::Unknown.is_active());
        }

        #[test]
        fn in_progress_statuses_are_active() {
            assert!(Status::Running.is_active());
            assert!(Status::Queued.is_active());
            assert!(Status::Failing.is_active());
            assert!(Status::NotRunning.is_active());
            assert!(Status::Created.is_active());
            assert!(Status::Pending.is_active());
            assert!(Status::SetupPending.is_active());
            assert!(Status::Setup.is_active());
        }
    }

    mod badge {
        use super::*;

        #[test]
        fn badge_is_stable_per_status() {
            assert_eq!(Status::Success.badge(), Status::Success.badge());
            assert_eq!(Status::Failed.badge().color, StatusColor::Failure);
            assert_eq!(Status::Running.badge().color, StatusColor::Info);
        }

        #[test]
        fn unknown_status_has_a_defined_default_badge() {
            let badge = Status::Unknown.badge();
            assert_eq!(badge.label, "Unknown");
            assert_eq!(badge.color, StatusColor::Neutral);
            assert_eq!(badge.icon, "?");
        }
    }
}
