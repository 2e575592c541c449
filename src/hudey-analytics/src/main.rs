//! Hudey analytics CLI: scoped dashboard metrics, tab exports, and
//! campaign polling against snapshot files.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hudey_core::config::{AppConfig, LineEnding};
use hudey_core::error::HudeyError;
use hudey_core::types::{AnalyticsSnapshot, Scope};
use hudey_monitor::{CampaignPoller, PollExit, SnapshotFileFetcher};
use hudey_reporting::export::write_export;
use hudey_reporting::{assemble_dashboard, CampaignSource, ExportFormat, ExportTab, ScopedDashboard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "hudey-analytics")]
#[command(about = "Influencer campaign analytics: scoped metrics, exports and campaign polling")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables prefixed HUDEY__ override it)
    #[arg(long, env = "HUDEY_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON (overrides config)
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print dashboard metrics for a scope as JSON
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// `all` or a campaign id
        #[arg(short, long, default_value = "all")]
        scope: String,
    },

    /// Print per-campaign metric rows as JSON
    Campaigns {
        #[command(flatten)]
        input: InputArgs,

        /// Only print this campaign
        #[arg(short, long)]
        id: Option<String>,
    },

    /// Write one dashboard tab to a file
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// `all` or a campaign id
        #[arg(short, long, default_value = "all")]
        scope: String,

        /// overview, campaigns, creators, email, funnel or content
        #[arg(short, long, default_value = "overview")]
        tab: String,

        /// csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output directory (overrides config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Separate CSV rows with CRLF (overrides config)
        #[arg(long, default_value_t = false)]
        crlf: bool,
    },

    /// Poll a campaign in a snapshot file until it stops running
    Watch {
        /// Dashboard snapshot JSON, re-read on every tick
        #[arg(long)]
        snapshot: PathBuf,

        /// Campaign id to follow
        #[arg(short, long)]
        campaign: String,

        /// Seconds between refreshes (overrides config)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Dashboard snapshot JSON (camelCase dashboard payload)
    #[arg(long, conflicts_with = "sources", required_unless_present = "sources")]
    snapshot: Option<PathBuf>,

    /// Raw per-campaign source bundle JSON, assembled into a snapshot
    #[arg(long)]
    sources: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> anyhow::Result<AnalyticsSnapshot> {
        match (&self.snapshot, &self.sources) {
            (Some(path), _) => {
                let json = read(path)?;
                AnalyticsSnapshot::from_json(&json)
                    .with_context(|| format!("invalid snapshot in {}", path.display()))
            }
            (None, Some(path)) => {
                let json = read(path)?;
                let sources: Vec<CampaignSource> = serde_json::from_str(&json)
                    .with_context(|| format!("invalid campaign sources in {}", path.display()))?;
                info!(campaigns = sources.len(), "Assembling dashboard from raw sources");
                Ok(assemble_dashboard(&sources))
            }
            (None, None) => anyhow::bail!("either --snapshot or --sources is required"),
        }
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn init_tracing(config: &AppConfig, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.clone().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let loaded = AppConfig::load_from(cli.config.as_deref());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(&config, cli.json_logs || config.logging.json);
    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    match cli.command {
        Commands::Summary { input, scope } => {
            let scope: Scope = scope.parse()?;
            let dashboard = ScopedDashboard::new(input.load()?);
            let view = dashboard.view(&scope);
            info!(scope = %scope, campaigns = view.total_campaigns, "Dashboard derived");
            println!("{}", serde_json::to_string_pretty(&*view)?);
        }

        Commands::Campaigns { input, id } => {
            let dashboard = ScopedDashboard::new(input.load()?);
            let rows = match id {
                Some(id) => vec![dashboard
                    .get_campaign_metrics(&id)
                    .ok_or(HudeyError::CampaignNotFound(id))?],
                None => dashboard.list_campaign_metrics(),
            };
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Export {
            input,
            scope,
            tab,
            format,
            out_dir,
            crlf,
        } => {
            let scope: Scope = scope.parse()?;
            let tab: ExportTab = tab.parse()?;
            let format: ExportFormat = format.parse()?;
            let line_ending = if crlf {
                LineEnding::Crlf
            } else {
                config.reporting.line_ending
            };
            let dir = out_dir.unwrap_or_else(|| PathBuf::from(&config.reporting.export_dir));

            let dashboard = ScopedDashboard::new(input.load()?);
            let view = dashboard.view(&scope);
            let path = write_export(
                &dir,
                &view,
                tab,
                format,
                line_ending,
                chrono::Local::now().date_naive(),
            )?;
            println!("{}", path.display());
        }

        Commands::Watch {
            snapshot,
            campaign,
            interval_secs,
        } => {
            let secs = interval_secs.unwrap_or(config.monitor.poll_interval_secs);
            let fetcher = Arc::new(SnapshotFileFetcher::new(snapshot));
            let mut poller = CampaignPoller::spawn(fetcher, campaign, Duration::from_secs(secs))?;
            let mut updates = poller.subscribe();

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if let Some(c) = updates.borrow_and_update().as_ref() {
                            println!(
                                "{} [{}] creators={} responded={} agreed={} emails_sent={} open_rate={}%",
                                c.name, c.status, c.creators, c.responded, c.agreed, c.emails_sent, c.open_rate
                            );
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!(campaign_id = %poller.campaign_id(), "Interrupted");
                        poller.cancel();
                        break;
                    }
                }
            }

            let campaign_id = poller.campaign_id().to_string();
            match poller.join().await? {
                PollExit::Inactive(status) => {
                    info!(campaign_id = %campaign_id, status = %status, "Campaign finished")
                }
                PollExit::Cancelled => info!(campaign_id = %campaign_id, "Watch cancelled"),
            }
        }
    }

    Ok(())
}
