use anyhow::Result;
use resx_translator::{azure::AzureTranslator, config::Config, pipeline};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("resx_translator=info".parse()?),
        )
        .init();

    info!("Starting resource translation job");

    // Load configuration from environment
    let config = Config::from_env()?;
    let targets: Vec<_> = config
        .target_languages()
        .map(|l| l.culture_code.as_str())
        .collect();
    info!(
        "Translating {} into {}",
        config.source_path.display(),
        targets.join(", ")
    );

    let translator = AzureTranslator::new(&config)?;
    let report = pipeline::run(&config, &translator).await?;

    for language in &report.languages {
        info!(
            "{}: {} files, {:.1}% of values translated",
            language.culture_code,
            language.files_written.len(),
            language.stats.success_rate()
        );
    }
    if report.failed_batches() > 0 {
        info!(
            "{} batches fell back to source text; rerun to retry them",
            report.failed_batches()
        );
    }

    Ok(())
}
