use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use clap::Parser;
use lfsh::{ShellBuilder, StdioStream};
use lfsh_config::{ConfigLoader, LfshConfig, LogFormat, LogLevel, LoggingConfig, StoreSection};
use lfsh_core::{default_registry, StoreConfig};
use lfsh_sdk::FileStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// lfsh - Command line file manager for small flash file stores
#[derive(Parser, Debug)]
#[command(name = "lfsh", version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Host directory to manage instead of an in-memory store
    #[arg(short, long)]
    root: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<LogLevel>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let (mut config, config_error) = match loader.load() {
        Ok(config) => (config, None),
        Err(e) => (LfshConfig::default(), Some(e)),
    };

    if let Some(root) = args.root {
        config.store.backend = "local".to_string();
        config
            .store
            .options
            .insert("root".to_string(), root.into());
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging)?;
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    let store = create_store(&config.store)?;
    tracing::info!(backend = %config.store.backend, "Store ready");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            on_interrupt.cancel();
        }
    });

    let mut shell = ShellBuilder::new(store)
        .stream(StdioStream::new()?)
        .cancellation_token(cancel)
        .config(&config.shell)
        .build();
    shell.run().await?;

    Ok(())
}

fn create_store(section: &StoreSection) -> Result<Arc<dyn FileStore>, Box<dyn std::error::Error>> {
    let mut store_config = StoreConfig {
        options: section.options.clone(),
    };
    if let Some(root) = section.root() {
        store_config = store_config.with("root", root);
    }
    Ok(default_registry().create(&section.backend, store_config)?)
}

fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (writer, ansi) = match logging.file_path() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };
    let filter = tracing_subscriber::EnvFilter::new(logging.directive());
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);

    match logging.format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(layer.compact())
            .with(filter)
            .init(),
    }
    Ok(())
}
