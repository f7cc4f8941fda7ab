use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use crate::auth::Token;
use crate::circleci::CircleProvider;
use crate::config::{Config, OutputFormat};
use crate::output;

#[derive(Parser)]
#[command(name = "ciview")]
#[command(author, version, about = "CI pipeline dashboard views", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format (summary table or JSON view model)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Keep re-collecting on an interval while entities are active
    #[arg(short, long, global = true, default_value_t = false)]
    watch: bool,
}

#[derive(Args)]
struct ProviderArgs {
    /// API token
    #[arg(short, long, env = "CIRCLE_TOKEN")]
    token: Option<String>,

    /// Provider base URL
    #[arg(short, long)]
    url: Option<String>,

    /// Project slug (e.g. 'gh/org/repo')
    #[arg(short = 'P', long)]
    project: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Branch summaries with each branch's worst workflow status
    Branches {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Maximum pipeline pages to fetch
        #[arg(short, long)]
        max_pages: Option<usize>,
    },
    /// Triggered (branchless) pipelines grouped by tag or revision
    Triggers {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Maximum pipeline pages to fetch
        #[arg(short, long)]
        max_pages: Option<usize>,
    },
    /// Dependency-graph layout for one workflow's jobs
    Graph {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Workflow id
        workflow_id: String,
    },
    /// Execution timeline for one workflow's jobs
    Timeline {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Workflow id
        workflow_id: String,
    },
    /// Per-workflow health metrics over a reporting window
    Insights {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Reporting window (e.g. last-7-days, last-90-days)
        #[arg(long)]
        window: Option<String>,
    },
    /// Recent runs of one named workflow
    Runs {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Workflow name
        workflow: String,
    },
    /// Per-job health metrics for one named workflow
    Jobs {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Workflow name
        workflow: String,

        /// Reporting window (e.g. last-7-days, last-90-days)
        #[arg(long)]
        window: Option<String>,
    },
    /// Flaky tests detected in the project
    Flaky {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Aggregated test health for one named workflow
    Tests {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Workflow name
        workflow: String,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Branches { provider, max_pages } => {
                let provider = self.provider(provider, &config)?;
                let max_pages = max_pages.unwrap_or(config.circleci.max_pages);
                self.emit_loop(
                    &config,
                    || provider.collect_branches(max_pages),
                    output::print_branches,
                    crate::views::BranchesView::has_active,
                )
                .await
            }
            Commands::Triggers { provider, max_pages } => {
                let provider = self.provider(provider, &config)?;
                let max_pages = max_pages.unwrap_or(config.circleci.max_pages);
                self.emit_loop(
                    &config,
                    || provider.collect_triggers(max_pages),
                    output::print_triggers,
                    crate::views::TriggersView::has_active,
                )
                .await
            }
            Commands::Graph { provider, workflow_id } => {
                let provider = self.provider(provider, &config)?;
                self.emit_loop(
                    &config,
                    || provider.collect_graph(workflow_id),
                    output::print_graph,
                    crate::views::GraphLayout::has_active,
                )
                .await
            }
            Commands::Timeline { provider, workflow_id } => {
                let provider = self.provider(provider, &config)?;
                self.emit_loop(
                    &config,
                    || provider.collect_timeline(workflow_id),
                    output::print_timeline,
                    crate::views::Timeline::has_active,
                )
                .await
            }
            Commands::Insights { provider, window } => {
                let provider = self.provider(provider, &config)?;
                let window = window.as_deref().unwrap_or(&config.circleci.reporting_window);
                let view = provider.collect_workflow_insights(window).await?;
                self.emit(&view, output::print_workflow_insights, &config)
            }
            Commands::Runs { provider, workflow } => {
                let provider = self.provider(provider, &config)?;
                let view = provider.collect_workflow_runs(workflow).await?;
                self.emit(&view, output::print_workflow_runs, &config)
            }
            Commands::Jobs { provider, workflow, window } => {
                let provider = self.provider(provider, &config)?;
                let window = window.as_deref().unwrap_or(&config.circleci.reporting_window);
                let view = provider.collect_job_insights(workflow, window).await?;
                self.emit(&view, output::print_job_insights, &config)
            }
            Commands::Flaky { provider } => {
                let provider = self.provider(provider, &config)?;
                let view = provider.collect_flaky_tests().await?;
                self.emit(&view, output::print_flaky_tests, &config)
            }
            Commands::Tests { provider, workflow } => {
                let provider = self.provider(provider, &config)?;
                let view = provider.collect_test_metrics(workflow).await?;
                self.emit(&view, output::print_test_metrics, &config)
            }
        }
    }

    fn provider(&self, args: &ProviderArgs, config: &Config) -> Result<CircleProvider> {
        let token = args
            .token
            .clone()
            .or_else(|| config.circleci.token.clone())
            .map(|t| Token::from(t.as_str()));

        let base_url = args
            .url
            .clone()
            .unwrap_or_else(|| config.circleci.base_url.clone());

        let project_slug = args
            .project
            .clone()
            .or_else(|| config.circleci.project_slug.clone())
            .context("No project given; pass --project or set project-slug in the config file")?;

        info!("Using project {project_slug} at {base_url}");

        Ok(CircleProvider::new(
            &base_url,
            project_slug,
            token.as_ref(),
            config.circleci.fan_out_batch,
        )?)
    }

    /// Collect and emit once; with `--watch`, keep re-collecting on the
    /// configured interval for as long as the view reports active
    /// entities. Each pass is a full recompute from a fresh snapshot, and
    /// the loop is strictly sequential so a stale response can never
    /// overwrite a newer one.
    async fn emit_loop<T, Fut>(
        &self,
        config: &Config,
        mut collect: impl FnMut() -> Fut,
        print: impl Fn(&T),
        has_active: impl Fn(&T) -> bool,
    ) -> Result<()>
    where
        T: Serialize,
        Fut: Future<Output = crate::error::Result<T>>,
    {
        loop {
            let view = collect().await?;
            self.emit(&view, &print, config)?;

            if !self.watch || !has_active(&view) {
                return Ok(());
            }

            info!(
                "Active entities present; refreshing in {}s",
                config.watch.interval_secs
            );
            tokio::time::sleep(Duration::from_secs(config.watch.interval_secs)).await;
        }
    }

    fn emit<T: Serialize>(&self, view: &T, print: impl Fn(&T), config: &Config) -> Result<()> {
        let pretty = self.pretty || config.output.pretty;
        let json = if pretty {
            serde_json::to_string_pretty(view)?
        } else {
            serde_json::to_string(view)?
        };

        if let Some(path) = &self.output {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("View written to: {}", path.display());
            return Ok(());
        }

        match self.format.unwrap_or(config.output.format) {
            OutputFormat::Json => println!("{json}"),
            OutputFormat::Summary => print(view),
        }

        Ok(())
    }
}
