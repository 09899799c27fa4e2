//! Demo: REST Rates
//!
//! Showcases: Live rates, daily and hourly history, conversion, time series
//!
//! Run: TRADERMADE_API_KEY=... cargo run --bin rest_rates

use chrono::{Duration, Utc};
use colored::*;
use rust_decimal::Decimal;
use tradermade_sdk::prelude::*;
use tracing_subscriber::EnvFilter;

fn section(title: &str) {
    println!();
    println!("{}", format!("  {}", title).white().bold());
    println!("  {}", "─".repeat(50));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = TraderMadeClient::from_env()?;

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  REST RATES".cyan().bold());
    println!("{}", "  TraderMade SDK Demo - Request/Response API".cyan());
    println!("{}", "═".repeat(65).cyan());

    section("LIVE RATES");
    let live = client.live_rates(&["EURUSD", "GBPUSD", "USDJPY"]).await?;
    for quote in &live.quotes {
        println!(
            "  {:<8} bid {:>12} ask {:>12} mid {:>12}",
            quote.symbol().cyan(),
            quote.bid.to_string().green(),
            quote.ask.to_string().red(),
            quote.mid
        );
    }

    let yesterday = Utc::now() - Duration::days(1);

    section("DAILY HISTORY (yesterday)");
    let date = yesterday.format("%Y-%m-%d").to_string();
    match client.historical("EURUSD", &date, "day").await? {
        Historical::Day(rates) => {
            for bar in &rates.quotes {
                println!(
                    "  {}{}  O {}  H {}  L {}  C {}",
                    bar.base_currency.cyan(),
                    bar.quote_currency.cyan(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close
                );
            }
        }
        other => println!("  Unexpected response: {:?}", other),
    }

    section("HOURLY HISTORY");
    let date_time = yesterday.format("%Y-%m-%d-%H:00").to_string();
    let hour = client.hour_historical("EURUSD", &date_time).await?;
    println!(
        "  {}  O {}  H {}  L {}  C {}",
        hour.date_time.dimmed(),
        hour.open,
        hour.high,
        hour.low,
        hour.close
    );

    section("CONVERT 1000 EUR TO GBP");
    let converted = client.convert("EUR ", "GBP", Decimal::new(1000, 0)).await?;
    println!("  Quote: {}", converted.quote.to_string().yellow());
    println!("  Total: {} {}", converted.total.to_string().green(), converted.quote_currency);

    let series_runs = [
        ("daily", None, "2019-10-01", "2019-10-10"),
        ("hourly", Some(4), "2024-10-01-10:00", "2024-10-02-11:00"),
        ("minute", Some(15), "2024-10-02-00:00", "2024-10-02-02:00"),
    ];
    for (interval, period, start, end) in series_runs {
        let interval = TimeSeriesInterval::parse(interval, period)?;
        section(&format!("TIME SERIES ({})", interval));

        let series = client.timeseries("EURUSD", start, end, interval).await?;
        for bar in &series.quotes {
            println!(
                "  {:<18} O {}  H {}  L {}  C {}",
                bar.date.dimmed(),
                bar.open,
                bar.high,
                bar.low,
                bar.close
            );
        }
    }

    Ok(())
}
