//! Demo: Live Quote Stream
//!
//! Showcases: Streaming feed, connected notice, reconnection attempts, Ctrl+C shutdown
//!
//! Run: TRADERMADE_STREAM_KEY=... cargo run --bin stream_quotes -- EURUSD GBPUSD XAUUSD

use colored::*;
use std::time::Duration;
use tradermade_sdk::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_SYMBOLS: [&str; 3] = ["EURUSD", "GBPUSD", "XAUUSD"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect();
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  LIVE QUOTE STREAM".cyan().bold());
    println!("{}", "  TraderMade SDK Demo - Streaming Feed".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!("  Symbols:  {}", symbols.join(", ").yellow());
    println!("  Retries:  {} every {}s", "10".cyan(), "5".cyan());
    println!();

    let feed = FeedBuilder::new(&symbols)
        .with_max_attempts(10)
        .with_retry_delay(Duration::from_secs(5))
        .on_connected(|notice| {
            println!("  {} {}", "●".green(), format!("Connected: {}", notice.message).green());
        })
        .on_quote(|quote, timestamp| {
            println!(
                "  {} {:<8} bid {:>12} ask {:>12} spread {:>10}",
                format!("[{}]", timestamp).dimmed(),
                quote.symbol.cyan(),
                quote.bid.to_string().green(),
                quote.ask.to_string().red(),
                quote.spread().to_string().yellow()
            );
        })
        .on_reconnect_attempt(|attempt| {
            println!("  {} Reconnecting... (attempt {})", "●".yellow(), attempt);
        })
        .on_fault(|fault| {
            if let FeedFault::RetriesExhausted { attempts } = fault {
                println!("  {} Gave up after {} attempts", "●".red(), attempts);
            }
        })
        .build()?;

    if let Err(e) = feed.connect().await {
        println!("  {} Failed to connect: {}", "●".red(), e);
    }

    tokio::signal::ctrl_c().await?;

    println!();
    println!("  {}", "Shutting down feed client...".dimmed());
    feed.disconnect().await?;

    Ok(())
}
