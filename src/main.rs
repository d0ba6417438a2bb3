use clap::Parser;
use doc_loader::utils::error::{DocumentError, ErrorSeverity};
use doc_loader::utils::logger;
use doc_loader::{
    CliConfig, DocumentProcessor, IngestEngine, IngestSettings, LocalStorage, Manifest,
    OutputWriter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting doc-loader");
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(&settings).await {
        fail(&e);
    }

    Ok(())
}

async fn run(settings: &IngestSettings) -> doc_loader::Result<()> {
    let processor = DocumentProcessor::new(Some(settings.processor.clone()))
        .with_loader_options(settings.loader);

    let engine = IngestEngine::new_with_monitoring(processor, settings.monitor)
        .split(settings.split)
        .recursive(settings.recursive)
        .concurrency(settings.concurrency);

    let report = engine.run(&settings.inputs).await?;

    let unit = if settings.split { "chunks" } else { "documents (unsplit)" };
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(docs) => println!("Loaded {} {} from {}", docs.len(), unit, outcome.path.display()),
            Err(e) => eprintln!("❌ {}: {}", outcome.path.display(), e),
        }
    }

    if let Some(output) = &settings.output {
        let storage = LocalStorage::new(output.path.clone());
        let writer = OutputWriter::new(storage, output.format, output.compress, output.filename.clone());
        let manifest = Manifest::new(&report, engine.processor().config(), settings.split);

        for file in writer.write(&report, &manifest).await? {
            tracing::info!("📁 Output saved to: {}", output.path.join(&file).display());
            println!("📁 Output saved to: {}", output.path.join(&file).display());
        }
    }

    Ok(())
}

fn fail(e: &DocumentError) -> ! {
    tracing::error!(
        "❌ doc-loader failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
