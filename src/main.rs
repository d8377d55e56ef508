use clap::Parser;
use log::{error, info};
use std::sync::Arc;

use jira_api::JiraClient;
use robilytics::config::{store_path, ConfigManager};
use robilytics::{Context, Fault, FaultKind, LogSink, RedbStore, Report, SharedSink};

#[derive(Parser)]
#[command(
    name = "robilytics",
    about = "Collect weekly delivery metrics from Jira into the metrics store",
    version
)]
struct Cli {
    /// Report to run
    #[arg(long, value_enum)]
    report: Report,
}

#[tokio::main]
async fn main() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();

    let cli = Cli::parse();
    let sink: SharedSink = Arc::new(LogSink);

    let manager = ConfigManager::from_env();
    info!("loading configuration from {}", manager.path().display());
    let config = manager.load(sink.as_ref());

    let path = store_path();
    let store = match RedbStore::open(&path) {
        Ok(store) => store,
        Err(err) => {
            error!("could not open metrics store {}: {}", path.display(), err);
            return;
        }
    };

    let client = match JiraClient::new(config.jira()) {
        Ok(client) => client,
        Err(err) => {
            sink.report(Fault::new(
                FaultKind::Transport,
                "could not build Jira client",
                err,
            ));
            return;
        }
    };

    let ctx = Context::new(client, store, Arc::clone(&sink));
    robilytics::run(cli.report, &config, &ctx).await;
}
