use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::{
    core::{
        fee::{FeeSchedule, FeeTier},
        price::{Currency, PricePoint},
        session::EnergySample,
    },
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Swedish standard VAT rate («moms»).
pub const VAT_RATE: f64 = 0.25;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Itemized cost of one energy sample.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostRecord {
    #[serde(rename = "SessionId")]
    pub session_id: String,

    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "Energy")]
    pub energy: KilowattHours,

    /// Spot price.
    #[serde(rename = "EnergyUsageFee")]
    pub energy_rate: KilowattHourRate,

    /// Net usage fee rate of the resolved tier.
    #[serde(rename = "NetUsageFee")]
    pub net_rate: KilowattHourRate,

    #[serde(rename = "EnergyCost")]
    pub energy_cost: Cost,

    #[serde(rename = "NetUsageCost")]
    pub net_cost: Cost,

    #[serde(rename = "TotalCostNoVat")]
    pub total_excluding_vat: Cost,

    #[serde(rename = "TotalCostWithVAT")]
    pub total_including_vat: Cost,

    #[serde(rename = "CostCurrency")]
    pub currency: Currency,

    #[serde(skip)]
    pub fee_tier: FeeTier,
}

impl CostRecord {
    pub fn calculate(
        session_id: &str,
        sample: EnergySample,
        price: &PricePoint,
        fee_tier: FeeTier,
        fee_schedule: &FeeSchedule,
    ) -> Self {
        let net_rate = fee_schedule.rate(fee_tier);
        let energy_cost = sample.energy * price.rate;
        let net_cost = sample.energy * net_rate;
        let total_excluding_vat = energy_cost + net_cost;
        Self {
            session_id: session_id.to_string(),
            timestamp: sample.timestamp,
            energy: sample.energy,
            energy_rate: price.rate,
            net_rate,
            energy_cost,
            net_cost,
            total_excluding_vat,
            total_including_vat: total_excluding_vat.with_vat(VAT_RATE),
            currency: price.currency,
            fee_tier,
        }
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}
