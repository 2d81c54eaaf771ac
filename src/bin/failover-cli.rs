use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use edge_failover::config::HealthSourceConfig;
use edge_failover::health::{evaluate, HealthCheckSource, HttpHealthCheckSource};

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Management CLI for the edge failover router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check router status
    Status,
    /// Check both endpoints through the router
    Endpoints,
    /// Query a health-check id directly and print the verdict
    Evaluate {
        health_check_id: String,

        /// Base URL of the health-check status service
        #[arg(long, default_value = "http://127.0.0.1:9000")]
        source_url: String,

        /// Status path template containing {id}
        #[arg(long, default_value = "/2013-04-01/healthcheck/{id}/status")]
        status_path: String,

        /// Bearer token for the status service
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => admin_get(&cli.url, &cli.key, "/admin/status").await?,
        Commands::Endpoints => admin_get(&cli.url, &cli.key, "/admin/endpoints").await?,
        Commands::Evaluate {
            health_check_id,
            source_url,
            status_path,
            token,
        } => {
            let source = HttpHealthCheckSource::new(&HealthSourceConfig {
                base_url: source_url,
                status_path,
                bearer_token: token,
                ..HealthSourceConfig::default()
            })?;

            let report = source.health_check_status(&health_check_id).await?;
            let verdict = match evaluate(&report.observations) {
                Ok(tally) => json!({ "healthy": true, "ok": tally.ok, "failed": tally.failed }),
                Err(e) => json!({ "healthy": false, "reason": e.to_string() }),
            };
            let output = json!({
                "health_check_id": health_check_id,
                "observations": report.observations,
                "verdict": verdict,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

async fn admin_get(base: &str, key: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);

    let res = reqwest::Client::new()
        .get(format!("{}{}", base, path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
