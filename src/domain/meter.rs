use rand::Rng;
use serde::Serialize;
use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

pub const ENERGY_MIN: u32 = 23;
pub const ENERGY_MAX: u32 = 26;
pub const ENERGY_CUMUL: u32 = 150;
pub const POWER_MAX: u32 = 30;
pub const POWER_MIN: u32 = 20;

/// Space-separated UTC wall-clock time with six subsecond digits and no
/// offset suffix; the shape gateway-side consumers of these lines parse.
/// A reading landing on an exact whole second drops the fractional part
/// entirely.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");
const TIMESTAMP_FORMAT_WHOLE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Simulated energy-meter telemetry record.
///
/// The emitted JSON keys follow field order here, so the order must not
/// change: consumers diff raw lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub timestamp: String,
    pub start: String,
    pub end: String,
    pub energy: u32,
    pub energy_cumul: u32,
    pub power_max: u32,
    pub power_min: u32,
}

impl MeterReading {
    /// Builds one reading for `now`, drawing the energy value uniformly
    /// from `[ENERGY_MIN, ENERGY_MAX]`. The three time fields share one
    /// formatted string so `start == end == timestamp` holds exactly,
    /// even when the clock crosses a microsecond boundary mid-build.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        now: OffsetDateTime,
    ) -> Result<Self, time::error::Format> {
        let stamp = if now.microsecond() == 0 {
            now.format(TIMESTAMP_FORMAT_WHOLE)?
        } else {
            now.format(TIMESTAMP_FORMAT)?
        };
        Ok(Self {
            timestamp: stamp.clone(),
            start: stamp.clone(),
            end: stamp,
            energy: rng.random_range(ENERGY_MIN..=ENERGY_MAX),
            energy_cumul: ENERGY_CUMUL,
            power_max: POWER_MAX,
            power_min: POWER_MIN,
        })
    }
}
