use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use companion_bootstrap::{run_standalone, AppContext};
use companion_infrastructure::CONFIG_PATH_ENV;

#[derive(Parser, Debug)]
#[command(name = "bingo-companion")]
#[command(about = "Bingo competition companion", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = tracing_subscriber::fmt::layer();
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bingo-companion.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_PATH_ENV, config);
    }

    // logging needs log_dir, so config is loaded before the subscriber exists
    let context = AppContext::new().await?;
    let _guard = init_tracing(context.log_dir.as_deref());

    run_standalone(context).await
}
