//! Operator console for archived-lead redistribution.
//!
//! Loads the first filtered page, prints the facets, and, when a target is
//! configured, selects every matching lead, previews the move and
//! optionally executes it. See [`options`] for the environment variables.

mod options;

use anyhow::Context;
use leadbridge_client::{ClientConfig, LeadsApiClient};
use leadbridge_core::leads::FacetOption;
use leadbridge_engine::{EngineConfig, RedistributionSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use options::RunOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "leadbridge_cli=info,leadbridge_engine=info,leadbridge_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let client_config = ClientConfig::from_env()?;
    let engine_config = EngineConfig::from_env()?;
    let options = RunOptions::from_env()?;
    tracing::info!(
        base_url = %client_config.base_url,
        per_page = engine_config.per_page,
        "Loaded configuration"
    );

    let client = LeadsApiClient::new(&client_config)?;
    let mut session = RedistributionSession::new(&engine_config);

    // --- Listing ---
    let request = session.set_filters(options.filters.clone());
    session
        .run_reload(&client, request)
        .await
        .context("Failed to load archived leads")?;

    let pagination = session.pagination();
    tracing::info!(
        total = pagination.total(),
        page = pagination.page(),
        pages = pagination.total_pages(),
        "Archived leads loaded"
    );
    for lead in session.items() {
        println!(
            "{:>8}  {:<32}  {:<14}  {}",
            lead.id,
            lead.name,
            lead.status,
            lead.owner.as_deref().unwrap_or("-")
        );
    }
    print_facets("reasons", &session.facets().reasons);
    print_facets("owners", &session.facets().owners);
    print_facets("queues", &session.facets().queues);
    print_facets("tags", &session.facets().tags);

    // --- Import ---
    if let Some(path) = &options.import_file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read import file {path}"))?;
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&raw).with_context(|| format!("{path} is not a JSON array"))?;
        if let Some(destination) = &options.destination {
            session.set_destination(destination.clone());
        }
        let response = session
            .import_batch(&client, records, Some(path.clone()))
            .await
            .context("Import failed")?;
        tracing::info!(
            batch_id = %response.batch_id,
            accepted = response.accepted,
            rejected = response.rejected,
            "Import finished"
        );
        for error in &response.errors {
            println!("row {}: {}", error.row, error.message);
        }
    }

    // --- Redistribution ---
    let Some(destination) = options.destination else {
        tracing::info!("No LEADS_TARGET_ID set, skipping redistribution");
        return Ok(());
    };
    session.set_destination(destination);
    session.select_all_matching();
    if session.selection_payload().is_none() {
        anyhow::bail!("Refusing to redistribute every archived lead: set at least one filter");
    }

    let preview = session.preview(&client).await.context("Preview failed")?;
    if let Some(preview) = &preview {
        println!(
            "preview: {} selected, {} movable, {} blocked",
            preview.total_selected, preview.movable, preview.blocked
        );
        for warning in &preview.warnings {
            println!("warning: {warning}");
        }
    }

    if let Some(operator) = &options.execute_as {
        let response = session
            .execute(&client, operator)
            .await
            .context("Redistribution failed")?;
        tracing::info!(
            job_id = response.job.id,
            status = response.job.status.as_str(),
            requested = response.job.requested_count,
            "Redistribution submitted"
        );
    }

    Ok(())
}

fn print_facets(label: &str, options: &[FacetOption]) {
    if options.is_empty() {
        return;
    }
    let rendered: Vec<String> = options
        .iter()
        .map(|o| match o.count {
            Some(count) => format!("{} ({count})", o.label),
            None => o.label.clone(),
        })
        .collect();
    println!("{label}: {}", rendered.join(", "));
}
