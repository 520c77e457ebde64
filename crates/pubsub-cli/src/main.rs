//! pubsub - demo and inspection tool for the publish/subscribe registry

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use pubsub_config::load_config;
use pubsub_core::Registry;
use pubsub_telemetry::init_subscriber;
use serde_json::Value;
use std::time::Duration;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_subscriber(&config.telemetry).context("Failed to initialize logging")?;

    let registry: Registry<Value> = Registry::new().with_events(config.events.iter().cloned());

    match cli.command {
        Commands::Demo {
            event,
            observer,
            data,
            delay_ms,
            with_failing,
        } => {
            run_demo(
                &registry,
                &event,
                observer,
                parse_payload(&data),
                delay_ms,
                with_failing,
            )
            .await
        }
        Commands::Events { json } => print_events(&registry, json),
    }
}

async fn run_demo(
    registry: &Registry<Value>,
    event: &str,
    observer: String,
    payload: Value,
    delay_ms: u64,
    with_failing: bool,
) -> anyhow::Result<()> {
    if with_failing {
        registry.subscribe(event, "demo.failing".to_string(), |data: &Value| {
            Err::<(), _>(format!("refusing payload {data}"))
        });
    }

    let heard = event.to_string();
    registry.subscribe(event, observer.clone(), move |data: &Value| {
        println!(
            "{} The \"{}\" event has been heard! {}",
            "✓".green().bold(),
            heard.cyan(),
            data.to_string().dimmed()
        );
    });

    if !registry.is_subscribed(event) {
        anyhow::bail!("Could not subscribe '{}' to event '{}'", observer, event);
    }

    tracing::info!(event, observer = %observer, delay_ms, "waiting to publish");
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    registry.publish(event, &payload);

    registry.unsubscribe(event, observer.as_str());
    Ok(())
}

fn print_events(registry: &Registry<Value>, json: bool) -> anyhow::Result<()> {
    let snapshot = registry.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Known events:".cyan().bold());
    for (name, observers) in snapshot.iter() {
        println!(
            "  {} {}",
            name.yellow(),
            format!("({} subscribers)", observers.len()).dimmed()
        );
    }
    Ok(())
}

fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
