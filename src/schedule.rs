use std::{ops::RangeInclusive, time::Duration};

use rand::Rng;

/// Inter-emission delay policy for a simulated agent.
///
/// Delays are whole seconds drawn uniformly from an inclusive range. A
/// fixed cadence is the degenerate range `[secs, secs]`, which keeps
/// both agents on the same draw path.
#[derive(Debug, Clone)]
pub struct EmitSchedule {
    secs: RangeInclusive<u64>,
}

impl EmitSchedule {
    pub fn uniform_secs(min: u64, max: u64) -> Self {
        assert!(min <= max, "delay range must satisfy min <= max");
        Self { secs: min..=max }
    }

    pub fn fixed_secs(secs: u64) -> Self {
        Self { secs: secs..=secs }
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.random_range(self.secs.clone()))
    }
}
