use clap::Parser;
use log::info;
use std::time::Duration;
use watcher::notify::{LogNotifier, Notifier, TelegramNotifier};
use watcher::watcher::{Watcher, WatcherConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server host to watch
    #[arg(short = 'H', long)]
    host: String,

    /// Game server query port
    #[arg(short, long, default_value = "27015")]
    port: u16,

    /// Receive timeout per query round trip, in milliseconds
    #[arg(long, default_value = "2500")]
    timeout_ms: u64,

    /// Seconds between polls
    #[arg(short = 'i', long, default_value = "20")]
    poll_interval_secs: u64,

    /// Minimum seconds between repeat notifications for the same name
    #[arg(short = 'c', long, default_value = "300")]
    cooldown_secs: u64,

    /// Telegram bot token; without it notifications only go to the log
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    telegram_token: Option<String>,

    /// Telegram chat id (@channel or numeric id)
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = WatcherConfig {
        host: args.host.clone(),
        port: args.port,
        timeout: Duration::from_millis(args.timeout_ms),
        poll_interval: Duration::from_secs(args.poll_interval_secs),
        cooldown_secs: args.cooldown_secs,
    };

    let notifier: Box<dyn Notifier> = match (args.telegram_token, args.telegram_chat_id) {
        (Some(token), Some(chat_id)) => {
            info!("Delivering notifications via Telegram");
            Box::new(TelegramNotifier::new(token, chat_id))
        }
        _ => {
            info!("No Telegram credentials configured, logging notifications only");
            Box::new(LogNotifier)
        }
    };

    info!(
        "Watching {}:{} every {}s (cooldown {}s)",
        args.host, args.port, args.poll_interval_secs, args.cooldown_secs
    );

    let mut watcher = Watcher::new(&config, notifier);
    watcher.run().await;

    Ok(())
}
