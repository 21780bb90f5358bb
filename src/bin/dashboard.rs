//! Terminal dashboard for the GST Foundation backend
//!
//! ```text
//! gst-dashboard health
//! gst-dashboard insert-document --value hello
//! gst-dashboard fetch-node --id 1c7c...
//! gst-dashboard create-relationship --from Alice --to Bob --relationship KNOWS
//! ```

use clap::Parser;
use gst_foundation::client::render::{render_failure, render_response};
use gst_foundation::client::{
    DEFAULT_BASE_URL, DashboardClient, Operation, OperationArgs, OperationKind,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gst-dashboard")]
#[command(about = "Call the GST Foundation backend and show the results")]
struct Cli {
    /// Operation to run
    #[arg(value_enum)]
    operation: OperationKind,

    /// Backend base URL
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Record id for fetch operations (latest record when omitted)
    #[arg(long)]
    id: Option<String>,

    /// Optional record name
    #[arg(long)]
    name: Option<String>,

    /// Record value for insert/create operations
    #[arg(long)]
    value: Option<String>,

    /// Start node of a relationship
    #[arg(long)]
    from: Option<String>,

    /// End node of a relationship
    #[arg(long)]
    to: Option<String>,

    /// Relationship type (defaults to KNOWS)
    #[arg(long)]
    relationship: Option<String>,

    /// Maximum number of items for list operations
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kind = cli.operation;
    let args = OperationArgs {
        id: cli.id,
        name: cli.name,
        value: cli.value,
        from: cli.from,
        to: cli.to,
        relationship: cli.relationship,
        limit: cli.limit,
    };

    let result = async {
        let operation = Operation::from_parts(kind, args)?;
        let client =
            DashboardClient::with_timeout(&cli.base_url, Duration::from_secs(cli.timeout))?;
        client.call(&operation).await
    }
    .await;

    match result {
        Ok(body) => {
            println!("{}", render_response(kind, &body));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render_failure(&err));
            ExitCode::FAILURE
        }
    }
}
