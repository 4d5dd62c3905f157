use anyhow::Result;
use device_simulator::{
    config::AppConfig,
    domain::DeviceStatus,
    metrics_server, observability,
    pipeline::Pipeline,
    sinks::NdjsonStdoutSink,
    sources::SimulatedPlugSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::serve(&metrics_cfg.bind_addr).await?;
    }

    let source = SimulatedPlugSource::new();
    tracing::info!(device_id = %source.device_id(), "plug agent started");

    let sink: NdjsonStdoutSink<DeviceStatus> = NdjsonStdoutSink::new();
    let pipeline = Pipeline { source, sink };

    // The status stream is infinite; any error here is fatal and the
    // supervisor is expected to restart the process.
    pipeline.run().await?;

    Ok(())
}
