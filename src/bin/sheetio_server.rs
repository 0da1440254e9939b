//! Sheetio API Server binary
//!
//! HTTP REST API for spreadsheet export and import.

use clap::Parser;
use royalbit_sheetio::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetio-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Sheetio API Server - HTTP REST API for spreadsheet export/import")]
#[command(long_about = r#"
Sheetio API Server - HTTP REST API

Provides RESTful endpoints for spreadsheet export and import:
  - POST /api/v1/export             - Rows to xlsx/xls/csv/html (file download)
  - POST /api/v1/export/legacy-csv  - Rows to the legacy tab-comma text layout
  - POST /api/v1/import             - First sheet of an xlsx/xls file to rows

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                  - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs
  - Tracing and structured logging

Example usage:
  sheetio-server                           # Start on localhost:8080
  sheetio-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/export \
    -H "Content-Type: application/json" \
    -d '{"headers": [["Status(select):1=Active,2=Inactive", "status"]],
         "rows": [{"status": "1,2"}], "format": "xlsx", "filename": "people"}' \
    -o people.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETIO_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETIO_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
