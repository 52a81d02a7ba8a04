use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::{
    core::{cost::CostRecord, fee::FeeTier, price::Currency},
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Per-session totals over consecutive cost records.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub first_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    pub energy: KilowattHours,

    /// Energy charged at the high net usage fee.
    pub high_tier_energy: KilowattHours,

    pub energy_cost: Cost,
    pub net_cost: Cost,
    pub total_excluding_vat: Cost,
    pub total_including_vat: Cost,
    pub currency: Currency,
}

impl SessionSummary {
    pub fn summarize(records: &[CostRecord]) -> Vec<Self> {
        let sessions = records.iter().chunk_by(|record| record.session_id.as_str());
        sessions
            .into_iter()
            .filter_map(|(_, records)| records.fold(None, Self::accumulate))
            .collect()
    }

    /// Grand total over the summaries, labelled with the `label` in place of a session ID.
    pub fn total(summaries: &[Self], label: &str) -> Option<Self> {
        let mut summaries = summaries.iter().cloned();
        let first = summaries.next()?;
        let initial = Self { session_id: label.to_string(), ..first };
        Some(summaries.fold(initial, |total, summary| Self {
            first_at: total.first_at.min(summary.first_at),
            last_at: total.last_at.max(summary.last_at),
            energy: total.energy + summary.energy,
            high_tier_energy: total.high_tier_energy + summary.high_tier_energy,
            energy_cost: total.energy_cost + summary.energy_cost,
            net_cost: total.net_cost + summary.net_cost,
            total_excluding_vat: total.total_excluding_vat + summary.total_excluding_vat,
            total_including_vat: total.total_including_vat + summary.total_including_vat,
            ..total
        }))
    }

    fn accumulate(summary: Option<Self>, record: &CostRecord) -> Option<Self> {
        let Some(mut summary) = summary else {
            return Some(Self {
                session_id: record.session_id.clone(),
                first_at: record.timestamp,
                last_at: record.timestamp,
                energy: record.energy,
                high_tier_energy: Self::high_tier_energy(record),
                energy_cost: record.energy_cost,
                net_cost: record.net_cost,
                total_excluding_vat: record.total_excluding_vat,
                total_including_vat: record.total_including_vat,
                currency: record.currency,
            });
        };
        summary.first_at = summary.first_at.min(record.timestamp);
        summary.last_at = summary.last_at.max(record.timestamp);
        summary.energy += record.energy;
        summary.high_tier_energy += Self::high_tier_energy(record);
        summary.energy_cost += record.energy_cost;
        summary.net_cost += record.net_cost;
        summary.total_excluding_vat += record.total_excluding_vat;
        summary.total_including_vat += record.total_including_vat;
        Some(summary)
    }

    fn high_tier_energy(record: &CostRecord) -> KilowattHours {
        match record.fee_tier {
            FeeTier::High => record.energy,
            FeeTier::Low => KilowattHours::ZERO,
        }
    }
}
