use std::env;
use std::fs;

use ethernity_sentinel::{ChainEvent, DetectorPipeline, SentinelConfig};
use tracing::info;

/// Reproduz um log gravado de eventos (array JSON de `ChainEvent`) e imprime os alertas.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <EVENTOS_JSON> [CONFIG_JSON]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => SentinelConfig::from_json(&fs::read_to_string(path)?)?,
        None => SentinelConfig::default(),
    };
    let pipeline = DetectorPipeline::new(config)?;

    let events: Vec<ChainEvent> = serde_json::from_str(&fs::read_to_string(&args[1])?)?;
    info!("Reproduzindo {} eventos", events.len());

    let mut total = 0;
    for event in &events {
        let output = pipeline.process(event);
        for failure in &output.failures {
            eprintln!("falha em {}: {}", failure.key, failure.error);
        }
        for alert in output.alerts {
            println!("{}", serde_json::to_string(&alert)?);
            total += 1;
        }
    }
    info!("{} alertas emitidos", total);
    Ok(())
}
