mod credentials;
mod report;

use chrono::NaiveDate;
use clap::Parser;

pub use self::report::report;
use crate::{
    cli::credentials::CredentialArgs,
    core::{fee::FeeSchedule, pipeline::MissingPricePolicy, price::PriceArea},
    output::OutputTarget,
    quantity::rate::KilowattHourRate,
};

/// Fetch Zaptec charging sessions and calculate their costs with spot prices and net usage fees.
#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Start date (inclusive) in format `YYYY-MM-DD`.
    #[clap(long = "from_date", alias = "from-date")]
    pub from_date: NaiveDate,

    /// End date (exclusive) in format `YYYY-MM-DD`.
    #[clap(long = "to_date", alias = "to-date")]
    pub to_date: NaiveDate,

    /// Path to the output CSV file, `-` writes to the standard output.
    #[clap(long = "output_file", alias = "output-file")]
    pub output_file: OutputTarget,

    #[clap(flatten)]
    pub credentials: CredentialArgs,

    /// Price area to use for the electricity spot prices.
    #[clap(long = "price_area", alias = "price-area", default_value = "SE4")]
    pub price_area: PriceArea,

    #[clap(flatten)]
    pub fees: FeeArgs,

    /// What to do with energy samples which no spot price covers.
    #[clap(long = "on_missing_price", alias = "on-missing-price", value_enum, default_value = "fail")]
    pub on_missing_price: MissingPricePolicy,

    /// Do not print the session summary table.
    #[clap(long = "no_summary", alias = "no-summary")]
    pub no_summary: bool,
}

#[derive(Copy, Clone, Parser)]
pub struct FeeArgs {
    /// Net usage fee for nights and weekends, per kilowatt-hour.
    #[clap(long = "low_net_usage_fee", alias = "low-net-usage-fee", default_value = "0.1259")]
    pub low_net_usage_fee: KilowattHourRate,

    /// Net usage fee for weekday daytime, per kilowatt-hour.
    #[clap(long = "high_net_usage_fee", alias = "high-net-usage-fee", default_value = "0.2459")]
    pub high_net_usage_fee: KilowattHourRate,
}

impl FeeArgs {
    pub fn schedule(self) -> FeeSchedule {
        FeeSchedule::builder().low(self.low_net_usage_fee).high(self.high_net_usage_fee).build()
    }
}
