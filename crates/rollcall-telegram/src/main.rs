//! Rollcall Telegram Bot binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx MAIN_ADMIN_ID=123 STORE_URI=file:///var/lib/rollcall cargo run -p rollcall-telegram
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use rollcall_core::{config, Config};
use rollcall_telegram::{Dispatcher, RollcallBot};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Rollcall Telegram Bot - daily attendance and laundry status for a community
#[derive(Parser, Debug)]
#[command(name = "rollcall-telegram")]
#[command(about = "Telegram bot for tracking attendance and washing machine availability")]
struct Args {
    /// Public HTTPS URL to register as webhook (default: polling mode)
    #[arg(short, long)]
    webhook_url: Option<Url>,

    /// Webhook port (default: 8443)
    #[arg(short, long, default_value = "8443")]
    port: u16,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let filter = match args.verbose {
        0 => "rollcall_telegram=info,teloxide=warn",
        1 => "rollcall_telegram=debug,rollcall_core=debug,teloxide=info",
        2 => "rollcall_telegram=trace,rollcall_core=trace,rollcall_persistence=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let dispatcher = Arc::new(Dispatcher::bootstrap(&config).await?);
    let bot = RollcallBot::new(&config.bot_token, dispatcher);

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\nRollcall Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Store: {}", config.store_scheme());
            println!(
                "   Mode: {}",
                if args.webhook_url.is_some() { "webhook" } else { "polling" }
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    if let Err(e) = bot.register_commands().await {
        tracing::warn!(error = %e, "Failed to register bot commands");
    }

    println!("\nOpen Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    match args.webhook_url {
        Some(url) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
            bot.start_webhook(addr, url).await?;
        }
        None => bot.start_polling().await?,
    }

    Ok(())
}
