use chrono::{DateTime, Utc};

use crate::quantity::energy::KilowattHours;

/// Energy delivered since the previous sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EnergySample {
    pub timestamp: DateTime<Utc>,
    pub energy: KilowattHours,
}

/// One charging event.
#[derive(Clone, Debug)]
pub struct ChargingSession {
    /// Opaque upstream identifier.
    pub id: String,

    pub device_name: Option<String>,

    /// Chronologically ordered energy deltas.
    pub samples: Vec<EnergySample>,
}

impl ChargingSession {
    #[must_use]
    pub fn total_energy(&self) -> KilowattHours {
        self.samples.iter().map(|sample| sample.energy).sum()
    }
}
