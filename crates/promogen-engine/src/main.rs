//! Batch generation binary.
//!
//! Reads product images from `PROMOGEN_PRODUCT_IMAGES` (comma separated
//! paths), runs one batch, and writes every generated image to the output
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use promogen_client::{GeminiClient, GeminiConfig};
use promogen_engine::{EngineConfig, Studio};
use promogen_models::{AspectRatio, GenerationInputs, ImageData};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("rustls crypto provider was already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting promogen");
    if let Err(e) = run().await {
        error!("promogen failed: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["promogen=info", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();
    info!("Engine config: {:?}", config);

    let client = GeminiClient::new(GeminiConfig::from_env()?)?;
    let inputs = load_inputs(&config)?;

    let studio = Studio::new(Arc::new(client), config.clone());
    let report = studio.run_batch(&inputs).await?;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    for (key, slot) in studio.slots().iter() {
        let Some(image) = &slot.image else { continue };
        let path = config.output_dir.join(format!("{}.{}", key, image.extension()));
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(slot = %key, path = %path.display(), "Saved image");
    }

    for (key, message) in &report.failed {
        warn!(slot = %key, "Slot failed: {}", message);
    }
    info!(
        run_id = %report.run_id,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Batch finished"
    );
    Ok(())
}

fn load_inputs(config: &EngineConfig) -> anyhow::Result<GenerationInputs> {
    let paths: Vec<PathBuf> = std::env::var("PROMOGEN_PRODUCT_IMAGES")
        .context("PROMOGEN_PRODUCT_IMAGES not set")?
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        bail!("PROMOGEN_PRODUCT_IMAGES has no paths");
    }

    let product_images = paths.iter().map(|p| read_image(p)).collect::<anyhow::Result<Vec<_>>>()?;
    let language = std::env::var("PROMOGEN_LANGUAGE").unwrap_or_else(|_| config.default_language.clone());
    let mut inputs = GenerationInputs::new(product_images, language);

    if let Ok(ratio) = std::env::var("PROMOGEN_ASPECT_RATIO") {
        let ratio: AspectRatio = ratio.parse()?;
        inputs = inputs.with_aspect_ratio(ratio);
    }
    if let Ok(description) = std::env::var("PROMOGEN_PRODUCT_DESCRIPTION") {
        inputs = inputs.with_product_description(description);
    }
    if let Ok(models) = std::env::var("PROMOGEN_MODEL_IMAGES") {
        for path in models.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            inputs = inputs.with_model(read_image(Path::new(path))?, "");
        }
    }
    Ok(inputs)
}

fn read_image(path: &Path) -> anyhow::Result<ImageData> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("jpg");
    Ok(ImageData::new(ImageData::mime_for_extension(extension), bytes))
}
