use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollout_describe::{
    describe::{DeploymentConfigDescriber, DescriberSettings, LatestDeploymentsDescriber},
    graph::HistoryLimit,
    storage::fixtures,
    Storage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Describe deployment configs and their rollout history
#[derive(Parser)]
#[command(name = "rollout-describe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database holding the cluster objects
    #[arg(long, env = "ROLLOUT_DATABASE_URL", default_value = "sqlite:rollout.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a deployment config with its latest and prior deployments
    Describe {
        name: String,

        #[arg(long, short, default_value = "default")]
        namespace: String,

        /// Leave out the events section
        #[arg(long)]
        no_events: bool,

        /// Show name, selector and pod status for prior deployments too
        #[arg(long)]
        verbose: bool,

        /// Prior deployments to show
        #[arg(long, default_value_t = 3)]
        max_deployments: usize,

        /// Most recent events to show
        #[arg(long, default_value_t = 8)]
        max_events: usize,
    },

    /// One status line per deployment, most recent first
    History {
        name: String,

        #[arg(long, short, default_value = "default")]
        namespace: String,

        /// Deployments to list
        #[arg(long, default_value_t = 1, conflicts_with = "until_success")]
        count: usize,

        /// List back to the most recent successful deployment
        #[arg(long)]
        until_success: bool,
    },

    /// Store the objects of a multi-document YAML file
    Load {
        file: PathBuf,

        /// Namespace for objects that do not name one
        #[arg(long, short, default_value = "default")]
        namespace: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollout_describe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;
    storage.migrate().await?;

    match cli.command {
        Commands::Describe {
            name,
            namespace,
            no_events,
            verbose,
            max_deployments,
            max_events,
        } => {
            let settings = DescriberSettings {
                show_events: !no_events,
                max_deployments,
                max_events,
                verbose_history: verbose,
            };
            let out = DeploymentConfigDescriber::new(&storage)
                .settings(settings)
                .describe(&namespace, &name)
                .await?;
            print!("{}", out);
        }
        Commands::History {
            name,
            namespace,
            count,
            until_success,
        } => {
            let limit = if until_success {
                HistoryLimit::UntilLastSuccess
            } else {
                HistoryLimit::Count(count)
            };
            let out = LatestDeploymentsDescriber::new(&storage, limit)
                .describe(&namespace, &name)
                .await?;
            print!("{}", out);
        }
        Commands::Load { file, namespace } => {
            let summary = fixtures::load_file(&storage, &file, &namespace).await?;
            if summary.skipped > 0 {
                tracing::warn!("Skipped {} documents of unsupported kinds", summary.skipped);
            }
        }
    }

    Ok(())
}
