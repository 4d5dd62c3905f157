use anyhow::Result;
use device_simulator::{
    config::AppConfig,
    domain::MeterReading,
    metrics_server, observability,
    pipeline::Pipeline,
    sinks::NdjsonStdoutSink,
    sources::SimulatedMeterSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::serve(&metrics_cfg.bind_addr).await?;
    }

    tracing::info!("meter agent started");

    let sink: NdjsonStdoutSink<MeterReading> = NdjsonStdoutSink::new();
    let pipeline = Pipeline {
        source: SimulatedMeterSource::new(),
        sink,
    };

    // The reading stream is infinite; any error here is fatal and the
    // supervisor is expected to restart the process.
    pipeline.run().await?;

    Ok(())
}
