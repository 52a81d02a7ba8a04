use crate::{
    api::{elpris, zaptec},
    cli::Args,
    core::{
        pipeline::CostCalculator,
        price::market_dates,
        summary::SessionSummary,
    },
    prelude::*,
    tables::build_summary_table,
};

/// Fetch the sessions and prices, and write the cost breakdown.
#[instrument(skip_all, fields(from = %args.from_date, to = %args.to_date, area = %args.price_area))]
pub fn report(args: &Args) -> Result {
    ensure!(
        args.from_date < args.to_date,
        "`--to_date` ({}) must be after `--from_date` ({})",
        args.to_date,
        args.from_date,
    );

    let credentials = args.credentials.resolve()?;
    let sessions = zaptec::Api::authenticate(&credentials)?
        .get_charge_history(args.from_date, args.to_date)
        .context("failed to fetch the charging sessions")?;
    let n_samples: usize = sessions.iter().map(|session| session.samples.len()).sum();
    info!(n_sessions = sessions.len(), n_samples, "fetched the charging sessions");
    for session in &sessions {
        debug!(
            id = %session.id,
            device = session.device_name.as_deref().unwrap_or("-"),
            n_samples = session.samples.len(),
            energy = %session.total_energy(),
            "session",
        );
    }

    let prices = elpris::Api::default()
        .get_price_book(market_dates(&sessions), args.price_area)
        .context("failed to fetch the spot prices")?;

    let records = CostCalculator::builder()
        .prices(&prices)
        .fee_schedule(args.fees.schedule())
        .on_missing_price(args.on_missing_price)
        .build()
        .calculate(&sessions)?;
    args.output_file.write(&records)?;

    if !args.no_summary && !args.output_file.is_stdout() {
        println!("{}", build_summary_table(&SessionSummary::summarize(&records)));
    }
    Ok(())
}
