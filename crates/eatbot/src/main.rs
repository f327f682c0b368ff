use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chat_core::{Config, UserId};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eatbot::{build_router, console, ConsoleRenderer};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug, Clone)]
#[command(name = "eatbot")]
#[command(about = "Browse recipes and products from the terminal")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "EATBOT_DEBUG", default_value = "false")]
    debug: bool,

    /// Directory holding the JSON catalogs
    #[arg(long, env = "EATBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Navigation history kept per user
    #[arg(long, env = "EATBOT_STACK_LIMIT")]
    stack_limit: Option<usize>,

    /// Items per list page
    #[arg(long, env = "EATBOT_PAGE_SIZE")]
    page_size: Option<usize>,

    /// User id for lines that do not start with one
    #[arg(long, default_value = "1")]
    user: i64,
}

fn init_logging(config: &Config) {
    let fallback = if config.debug { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(
            fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load().with_overrides(cli.data_dir, cli.stack_limit, cli.page_size);
    config.debug |= cli.debug;
    init_logging(&config);

    tracing::info!(
        data_dir = %config.data_dir.display(),
        stack_limit = config.stack_limit,
        page_size = config.page_size,
        session_idle_minutes = config.session_idle_minutes,
        "starting eatbot"
    );

    let renderer = Arc::new(ConsoleRenderer::new(tokio::io::stdout()));
    let router = match build_router(&config, renderer).await {
        Ok(router) => router,
        Err(e) => {
            tracing::error!("Failed to start: {:#}", e);
            std::process::exit(1);
        }
    };

    let _sweeper = config
        .session_idle_timeout()
        .map(|max_idle| router.sessions().clone().spawn_sweeper(max_idle, SWEEP_INTERVAL));

    let input = BufReader::new(tokio::io::stdin());
    if let Err(e) = console::run(&router, input, UserId(cli.user)).await {
        tracing::error!("Console input failed: {:#}", e);
        std::process::exit(1);
    }
}
