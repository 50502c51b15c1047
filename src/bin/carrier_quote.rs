//! `carrier-quote`: requests quotes from the configured carriers and prints
//! the merged result as JSON.

use anyhow::{Context, Result};
use carrier_gateway::application::bootstrap::build_registry;
use carrier_gateway::config::GatewayConfig;
use carrier_gateway::domain::messages::{QuoteRequest, QuoteResponse};
use carrier_gateway::domain::value_objects::{RequestContext, ServiceType};
use carrier_gateway::telemetry::init_tracing;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "carrier-quote", version, about = "Fan a quote request out to every configured carrier")]
struct Args {
    /// Path to a JSON-encoded quote request.
    request: PathBuf,

    /// Only query this carrier; repeat for several.
    #[arg(short, long = "carrier")]
    carriers: Vec<String>,

    /// Overall deadline for the fan-out, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Keep only rates of this service type; repeat for several.
    #[arg(long = "service-type")]
    service_types: Vec<ServiceType>,

    /// Print only the cheapest rate of each carrier.
    #[arg(long)]
    cheapest: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = GatewayConfig::from_env().context("loading configuration")?;
    init_tracing(&config.telemetry);

    let registry = build_registry(&config).context("building carrier registry")?;
    let raw = std::fs::read_to_string(&args.request)
        .with_context(|| format!("reading {}", args.request.display()))?;
    let request: QuoteRequest = serde_json::from_str(&raw).context("parsing quote request")?;

    let mut ctx = RequestContext::new();
    if let Some(ms) = args.timeout_ms {
        ctx = ctx.with_timeout(Duration::from_millis(ms));
    }
    let outcome = registry
        .get_quotes_from_carriers(&ctx, &request, args.carriers.as_slice())
        .await;

    let quotes: Vec<QuoteResponse> = outcome
        .responses
        .into_iter()
        .map(|q| q.filter_service_types(&args.service_types))
        .collect();
    let quotes = if args.cheapest {
        quotes
            .iter()
            .filter_map(QuoteResponse::cheapest)
            .map(|rate| json!(rate))
            .collect::<Vec<_>>()
    } else {
        quotes.iter().map(|q| json!(q)).collect()
    };
    let errors: Vec<_> = outcome
        .errors
        .iter()
        .map(|f| {
            json!({
                "carrier": f.carrier,
                "code": f.error.code(),
                "message": f.error.message(),
                "retryable": f.error.is_retryable(),
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "quotes": quotes, "errors": errors }))?
    );
    Ok(())
}
