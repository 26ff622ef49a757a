//! planshift CLI
//!
//! Opens the upgrade dialog for the signed-in account in the terminal.
//!
//! Usage:
//!   PLANSHIFT_BASE_URL=https://ntfy.example.com PLANSHIFT_ACCESS_TOKEN=tk_... planshift
//!
//! Pick a tier by number, then `s` to submit or `q` to close.

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod terminal;

use std::io::Write;

use planshift_billing::{
    BillingClient, SessionManager, SubmitOutcome, UpgradeDialog, LOGIN_ROUTE,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::terminal::{render, TerminalNavigator, TerminalSession};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,planshift_billing=debug".into());
    let json = std::env::var("PLANSHIFT_LOG_JSON")
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    init_tracing();

    let client = BillingClient::from_env()?;
    let config = client.config().clone();
    tracing::info!(base_url = %config.base_url, "Starting planshift v{}", env!("CARGO_PKG_VERSION"));

    let session = TerminalSession::new(&config.base_url, config.token_file.clone());
    let account = match client.get_account().await {
        Ok(account) => account,
        Err(e) if e.is_unauthorized() => {
            session.reset_and_redirect(LOGIN_ROUTE);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let dialog = UpgradeDialog::new(
        client,
        session,
        TerminalNavigator,
        account,
        Box::new(|| println!("\nDialog closed.")),
    );
    dialog.load_catalog().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(view) = dialog.view() {
        print!("{}> ", render(&view));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            dialog.close();
            break;
        };
        let input = line.trim();

        match input {
            "q" | "Q" => dialog.close(),
            "s" | "S" => match dialog.submit().await {
                SubmitOutcome::Ignored => println!("\nNothing to change."),
                SubmitOutcome::Failed { .. } => {}
                SubmitOutcome::Redirected { .. }
                | SubmitOutcome::SessionExpired
                | SubmitOutcome::Closed
                | SubmitOutcome::Dismissed => break,
            },
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 && n <= view.cards.len() => {
                    let code = view.cards[n - 1].code.as_deref();
                    if let Err(e) = dialog.select(code) {
                        println!("\n{}", e);
                    }
                }
                _ => println!("\nEnter a tier number, 's' or 'q'."),
            },
        }
    }

    Ok(())
}
