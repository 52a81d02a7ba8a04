use bon::Builder;
use chrono::{DateTime, Utc};

use crate::{
    core::{
        cost::CostRecord,
        fee::{FeeSchedule, FeeTier},
        price::PriceBook,
        session::ChargingSession,
    },
    prelude::*,
};

/// What to do with a sample that no price point covers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum MissingPricePolicy {
    /// Abort the run.
    #[default]
    Fail,

    /// Leave the sample out of the output and log a warning.
    Skip,
}

#[derive(Debug, thiserror::Error)]
#[error("no price point covers the sample of session `{session_id}` at {timestamp}")]
pub struct MissingPriceError {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Builder)]
pub struct CostCalculator<'a> {
    prices: &'a PriceBook,
    fee_schedule: FeeSchedule,

    #[builder(default)]
    on_missing_price: MissingPricePolicy,
}

impl CostCalculator<'_> {
    /// Price every sample of every session.
    ///
    /// The output follows the session order, and then the sample order within each session.
    #[instrument(skip_all, fields(n_sessions = sessions.len()))]
    pub fn calculate(
        &self,
        sessions: &[ChargingSession],
    ) -> Result<Vec<CostRecord>, MissingPriceError> {
        let mut records =
            Vec::with_capacity(sessions.iter().map(|session| session.samples.len()).sum());
        for session in sessions {
            for sample in &session.samples {
                let Some(price) = self.prices.find(sample.timestamp) else {
                    match self.on_missing_price {
                        MissingPricePolicy::Fail => {
                            return Err(MissingPriceError {
                                session_id: session.id.clone(),
                                timestamp: sample.timestamp,
                            });
                        }
                        MissingPricePolicy::Skip => {
                            warn!(
                                session_id = %session.id,
                                timestamp = %sample.timestamp,
                                "no applicable price, skipping",
                            );
                            continue;
                        }
                    }
                };
                records.push(CostRecord::calculate(
                    &session.id,
                    *sample,
                    price,
                    FeeTier::at(sample.timestamp),
                    &self.fee_schedule,
                ));
            }
        }
        info!(n_records = records.len(), "calculated");
        Ok(records)
    }
}
