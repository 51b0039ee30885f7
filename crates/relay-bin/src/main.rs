//! fact-relay - batch fact delivery to the KPI intake API.

mod logging;

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Parser;
use fact_outbox::{Fact, FactBuffer, FactSender, SenderConfig};
use tracing::info;

/// Number of facts in the sample batch.
const SAMPLE_BATCH_SIZE: i64 = 10;

/// Fact relay command-line interface.
#[derive(Parser)]
#[command(name = "fact-relay")]
#[command(about = "Delivers a batch of facts to the KPI intake API")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Override the fact intake endpoint
    #[arg(long, env = "FACT_RELAY_ENDPOINT")]
    endpoint: Option<String>,

    /// Override the bearer token
    #[arg(long, env = "FACT_RELAY_AUTH_TOKEN")]
    auth_token: Option<String>,
}

/// Build the deterministic sample batch for the December reporting period.
fn sample_facts() -> Vec<Fact> {
    let period_start = NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date");
    let period_end = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");

    (1..=SAMPLE_BATCH_SIZE)
        .map(|value| Fact {
            period_start,
            period_end,
            period_key: "month".to_string(),
            indicator_to_mo_id: 227_373,
            indicator_to_mo_fact_id: 0,
            value,
            fact_time: period_end,
            is_plan: false,
            auth_user_id: 40,
            comment: format!("buffer Last_name {}", value),
        })
        .collect()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    info!("Starting fact buffer");
    let started = Instant::now();

    let mut config = SenderConfig::default();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(auth_token) = cli.auth_token {
        config.auth_token = auth_token;
    }

    let buffer = Arc::new(FactBuffer::new(FactSender::new(config)));

    buffer.add_facts(sample_facts()).await;
    buffer.join().await;

    let outcomes = buffer.outcomes();
    let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
    let failed = outcomes.len() - delivered;

    info!(
        delivered = delivered,
        failed = failed,
        elapsed = ?started.elapsed(),
        "All facts processed"
    );
}
