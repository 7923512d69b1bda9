//! SDK Sandbox - try a payment SDK integration from the terminal
//!
//! Generate fake credentials, inspect mocked API exchanges and walk through
//! the apartment booking and checkout payment forms.

use anyhow::Result;
use sdk_sandbox::checkout::{CheckoutSession, Order};
use sdk_sandbox::config::SandboxConfig;
use sdk_sandbox::console::{Command, Console, HELP};
use sdk_sandbox::form::presets;
use sdk_sandbox::sdk::SandboxClient;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdk_sandbox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = SandboxConfig::load()?.with_env_overrides()?;

    let client = SandboxClient::new(config.mode())
        .with_latency(config.latency())
        .with_failing_user_lookup(config.fail_user_lookup());
    let form = presets::payment_form(config.form_options())?;
    let booking = presets::booking_form(chrono::Local::now().date_naive(), config.form_options());
    let order = Order::new(config.charge_amount(), config.charge_currency());
    let mut console =
        Console::new(CheckoutSession::new(form, client, order)).with_booking(booking);

    println!("Payment SDK sandbox ({} mode)", config.mode());
    println!("{HELP}");

    let result = run(&mut console).await;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(console: &mut Console<SandboxClient>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match console.execute(command).await {
            Ok(output) => println!("{output}"),
            Err(err) => {
                tracing::warn!("Command failed: {err:#}");
                println!("Error: {err}");
            }
        }

        if console.should_quit() {
            return Ok(());
        }
    }
}
