use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEVICE_TYPE: &str = "ZWave smart plug";
pub const STATUS_ACTIVE: &str = "active";

/// Simulated smart-plug heartbeat record. Unlike the meter reading this
/// one carries the epoch seconds as a decimal string, which is what the
/// consuming side expects for this device class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub timestamp: String,
    pub id: Uuid,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: String,
}

impl DeviceStatus {
    /// One status ping for `now`. `device_id` is minted once at process
    /// start and passed in unchanged for every ping of the run.
    pub fn heartbeat(device_id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            timestamp: now.unix_timestamp().to_string(),
            id: device_id,
            device_type: DEVICE_TYPE.to_string(),
            status: STATUS_ACTIVE.to_string(),
        }
    }
}
