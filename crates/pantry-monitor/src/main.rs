mod bootstrap;
mod export;
mod report;

use anyhow::{Context, Result};
use pantry_core::settings::{selector_filter, Settings};
use pantry_data::analysis::{analyze_table, AnalysisOptions};
use pantry_runtime::manager::TableManager;
use pantry_runtime::source::source_for;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Pantry Monitor v{} starting", env!("CARGO_PKG_VERSION"));

    let location = settings
        .source
        .clone()
        .or_else(bootstrap::discover_source)
        .context("no table source configured; pass --source or set PANTRY_TABLE")?;

    let source = source_for(&location, settings.token.clone())?;
    tracing::info!("Source: {}", source.describe());

    let mut manager = TableManager::new(source, settings.cache_ttl);
    let raw = manager.get_table(settings.refresh)?.to_vec();

    let options = AnalysisOptions {
        date_from: settings.from,
        date_to: settings.to,
        site: selector_filter(&settings.site),
        category: selector_filter(&settings.category),
        as_of: chrono::Local::now().date_naive(),
        top_n: settings.top_n,
    };

    let result = analyze_table(&raw, &options)?;

    tracing::info!(
        "{} records after filters ({} read, {} dropped)",
        result.metadata.rows_after_filter,
        result.metadata.rows_read,
        result.metadata.rows_dropped
    );

    if let Some(path) = &settings.export {
        export::write_records_csv(path, &result.records)?;
        tracing::info!("Exported filtered records to {}", path.display());
    }

    match settings.report.as_str() {
        "json" => println!("{}", report::render_json(&result)?),
        _ => print!("{}", report::render_text(&result)),
    }

    Ok(())
}
