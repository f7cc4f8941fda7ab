mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{
    print_branches, print_flaky_tests, print_graph, print_job_insights, print_test_metrics,
    print_timeline, print_triggers, print_workflow_insights, print_workflow_runs,
};

/// Prints the `ciview` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("◢ ciview"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI pipeline dashboard views")
    );
}
