use clap::Parser;
use district_layers::domain::model::{RunSummary, TransformResult};
use district_layers::utils::error::LayerError;
use district_layers::utils::{logger, validation::Validate};
use district_layers::{CliConfig, LayerEngine, LayerPipeline, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_format == "json" {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting district-layers CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let check_only = config.check;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match LayerPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(e),
    };

    let engine = LayerEngine::new(pipeline);

    if check_only {
        let result = match engine.check().await {
            Ok(result) => result,
            Err(e) => fail(e),
        };
        print_check(&result);
        std::process::exit(result.exit_code());
    }

    match engine.run().await {
        Ok(summary) => {
            print_summary(&summary);
            let code = summary.exit_code();
            if code > 0 {
                std::process::exit(code);
            }
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn print_check(result: &TransformResult) {
    for layer in &result.layers {
        println!(
            "✅ {} — {} row(s), {:?}, {} unknown location(s)",
            layer.source,
            layer.rows.len(),
            layer.render_mode,
            layer.issues.len()
        );
        for issue in &layer.issues {
            match &issue.hint {
                Some(hint) => println!(
                    "   line {}: '{}' (did you mean '{}'?)",
                    issue.line, issue.location, hint
                ),
                None => println!("   line {}: '{}'", issue.line, issue.location),
            }
        }
    }
    for rejected in &result.rejected {
        println!("❌ {} — {}", rejected.source, rejected.reason);
    }
}

fn print_summary(summary: &RunSummary) {
    tracing::info!("✅ Layer load completed");
    println!(
        "✅ {} layer(s) loaded, {} rejected",
        summary.loaded, summary.rejected
    );
    println!("📁 Output saved to: {}", summary.output_path);
}

fn fail(e: LayerError) -> ! {
    tracing::error!(
        "❌ Layer load failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
