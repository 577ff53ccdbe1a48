use anyhow::{Context, Result};
use cultural_translator::backend::{
    load_descriptors, BackendDescriptor, BackendProfile, BackendRegistry, HttpBackend,
};
use cultural_translator::catalog::LanguageCatalog;
use cultural_translator::config::AppConfig;
use cultural_translator::retry::RetryConfig;
use cultural_translator::{server, TranslationPipeline};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cultural_translator=info".parse()?),
        )
        .init();

    info!("Starting cultural translator");

    let config = AppConfig::from_env()?;
    let catalog = Arc::new(LanguageCatalog::with_defaults());
    info!("Loaded {} languages", catalog.len());

    let registry = Arc::new(BackendRegistry::new());
    for descriptor in backend_descriptors(&config, &catalog)? {
        let backend = HttpBackend::within_budget(
            descriptor,
            config.pipeline.backend_timeout(),
            RetryConfig::backend_call(),
        )?;
        registry.register(Arc::new(backend))?;
    }
    if registry.is_empty() {
        warn!("No translation backends configured; set BACKENDS_FILE or LIBRETRANSLATE_URL");
    }

    let pipeline = TranslationPipeline::new(catalog, registry, config.pipeline.clone())
        .context("Invalid pipeline configuration")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, server::router(pipeline))
        .await
        .context("Server error")?;

    Ok(())
}

/// Descriptors from `BACKENDS_FILE`, else a single generic LibreTranslate
/// backend covering every catalog language.
fn backend_descriptors(config: &AppConfig, catalog: &LanguageCatalog) -> Result<Vec<BackendDescriptor>> {
    if let Some(path) = &config.backends_file {
        let descriptors = load_descriptors(path)?;
        info!("Loaded {} backends from {}", descriptors.len(), path.display());
        return Ok(descriptors);
    }

    let Some(url) = &config.libretranslate_url else {
        return Ok(Vec::new());
    };
    let codes: Vec<String> = catalog.list_languages().into_iter().map(|l| l.code).collect();
    let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
    Ok(vec![BackendDescriptor {
        profile: BackendProfile::new("libretranslate", &codes, 0.75),
        url: url.clone(),
        api_key: config.libretranslate_api_key.clone(),
    }])
}
