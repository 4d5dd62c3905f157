use std::{pin::Pin, time::SystemTime};

use async_stream::try_stream;
use futures::Stream;
use rand::{rngs::StdRng, SeedableRng};
use time::OffsetDateTime;

use crate::{
    domain::MeterReading,
    pipeline::{Envelope, PipelineError, Source},
    schedule::EmitSchedule,
};

/// Seconds slept between readings, inclusive on both ends.
pub const DELAY_MIN_SECS: u64 = 3;
pub const DELAY_MAX_SECS: u64 = 10;

/// Synthetic energy-meter agent source.
///
/// Yields one `MeterReading` per iteration, then sleeps for a uniformly
/// random whole-second delay in `[3, 10]`. The stream never ends on its
/// own; killing the process is the only way to stop it.
pub struct SimulatedMeterSource {
    schedule: EmitSchedule,
}

impl SimulatedMeterSource {
    pub fn new() -> Self {
        Self {
            schedule: EmitSchedule::uniform_secs(DELAY_MIN_SECS, DELAY_MAX_SECS),
        }
    }
}

impl Default for SimulatedMeterSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Source<MeterReading> for SimulatedMeterSource {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<MeterReading>, PipelineError>> + Send>> {
        let schedule = self.schedule.clone();

        let s = try_stream! {
            let mut rng = StdRng::from_os_rng();
            loop {
                let now = OffsetDateTime::now_utc();
                let reading = MeterReading::sample(&mut rng, now)
                    .map_err(|e| PipelineError::Source(format!("failed to format timestamp: {e}")))?;

                metrics::counter!("meter_readings_generated_total").increment(1);

                yield Envelope {
                    payload: reading,
                    generated_at: SystemTime::now(),
                };

                let delay = schedule.next_delay(&mut rng);
                tracing::debug!(delay_secs = delay.as_secs(), "meter reading generated, sleeping");
                tokio::time::sleep(delay).await;
            }
        };

        Box::pin(s)
    }
}
