use anyhow::Result;
use tracing::{error, info, warn};
use wasla_site::config::Config;
use wasla_site::i18n::I18n;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wasla_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    match &config.i18n_dir {
        Some(dir) => info!("Checking dictionaries in {}", dir.display()),
        None => info!("Checking dictionaries at {}", config.i18n_base_url),
    }

    let i18n = I18n::from_config(&config)?;
    info!(
        "Default language '{}', stored preference '{}'",
        i18n.default_language(),
        i18n.language()
    );

    // Every translation is checked against the default dictionary
    let mut missing_keys = 0;
    for (language, report) in i18n.validate_dictionaries().await {
        for e in &report.errors {
            error!("[{}] {}", language, e);
        }
        for warning in &report.warnings {
            warn!("[{}] {}", language, warning);
        }
        info!(
            "Dictionary '{}': {} errors, {} warnings",
            language,
            report.errors.len(),
            report.warnings.len()
        );
        missing_keys += report.errors.len();
    }

    info!(
        "i18n metrics: {}",
        serde_json::to_string(&i18n.metrics().report())?
    );

    if missing_keys > 0 {
        anyhow::bail!("{} dictionary errors found", missing_keys);
    }

    info!("All dictionaries complete");
    Ok(())
}
