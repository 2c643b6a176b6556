use anyhow::Context;
use clap::Parser;
use district_layers::core::ConfigProvider;
use district_layers::utils::{logger, validation::Validate};
use district_layers::{LayerEngine, LayerPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-layers")]
#[command(about = "Build district map layers from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "layers.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override validation.strict_locations from config
    #[arg(long)]
    strict: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based layer loader");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(strict) = args.strict {
        let validation = config
            .validation
            .get_or_insert(district_layers::config::toml_config::ValidationConfig {
                strict_locations: None,
            });
        validation.strict_locations = Some(strict);
        tracing::info!("🔧 Strict locations overridden to: {}", strict);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be read or written");
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = LayerPipeline::new(storage, config).context("Failed to load gazetteer")?;
    let engine = LayerEngine::new(pipeline);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("❌ Layer load failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    println!(
        "✅ {} layer(s) loaded, {} rejected",
        summary.loaded, summary.rejected
    );
    println!("📁 Output saved to: {}", summary.output_path);

    let code = summary.exit_code();
    if code > 0 {
        std::process::exit(code);
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Project: {}", config.project.name);
    if let Some(description) = &config.project.description {
        tracing::info!("   {}", description);
    }
    for input in config.inputs() {
        tracing::info!("   📄 {}", input);
    }
    tracing::info!(
        "   Gazetteer: {}",
        config.gazetteer_path().unwrap_or("official")
    );
    tracing::info!("   Strict locations: {}", config.strict_locations());
    tracing::info!("   Output: {}", config.output_path());
    tracing::info!("   Formats: {:?}", config.output_formats());
    match config.archive_name() {
        Some(archive) => tracing::info!("   Archive: {}", archive),
        None => tracing::info!("   Archive: disabled"),
    }
}
