//! Writes the OpenAPI document for the telemetry API
//!
//! Usage: gen_openapi [PATH]    (defaults to openapi.json, `-` for stdout)

use anyhow::Context;
use utoipa::OpenApi;

use kubeslo_telemetry::api::openapi::ApiDoc;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> anyhow::Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let document = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to render OpenAPI document")?;

    if output == "-" {
        println!("{}", document);
        return Ok(());
    }

    std::fs::write(&output, document).with_context(|| format!("failed to write {}", output))?;
    eprintln!("Wrote {}", output);
    Ok(())
}
