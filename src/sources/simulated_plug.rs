use std::{pin::Pin, time::SystemTime};

use async_stream::try_stream;
use futures::Stream;
use rand::{rngs::StdRng, SeedableRng};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    domain::DeviceStatus,
    pipeline::{Envelope, PipelineError, Source},
    schedule::EmitSchedule,
};

/// Seconds between status pings. The cadence is fixed, kept as the
/// degenerate `[10, 10]` draw so the plug shares the meter's emit path.
pub const HEARTBEAT_SECS: u64 = 10;

/// Synthetic smart-plug agent source.
///
/// The device identity is generated once, when the source is built at
/// process start, and every ping of the run carries it unchanged.
pub struct SimulatedPlugSource {
    device_id: Uuid,
    schedule: EmitSchedule,
}

impl SimulatedPlugSource {
    pub fn new() -> Self {
        Self::with_device_id(Uuid::new_v4())
    }

    pub fn with_device_id(device_id: Uuid) -> Self {
        Self {
            device_id,
            schedule: EmitSchedule::fixed_secs(HEARTBEAT_SECS),
        }
    }

    pub fn device_id(&self) -> Uuid {
        self.device_id
    }
}

impl Default for SimulatedPlugSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Source<DeviceStatus> for SimulatedPlugSource {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<DeviceStatus>, PipelineError>> + Send>> {
        let device_id = self.device_id;
        let schedule = self.schedule.clone();

        let s = try_stream! {
            let mut rng = StdRng::from_os_rng();
            loop {
                let now = OffsetDateTime::now_utc();
                let ping = DeviceStatus::heartbeat(device_id, now);

                metrics::counter!("plug_heartbeats_generated_total").increment(1);

                yield Envelope {
                    payload: ping,
                    generated_at: SystemTime::now(),
                };

                tokio::time::sleep(schedule.next_delay(&mut rng)).await;
            }
        };

        Box::pin(s)
    }
}
