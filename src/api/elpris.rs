//! [Elpriset just nu](https://www.elprisetjustnu.se/elpris-api) client.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use ureq::Agent;

use crate::{
    api::client,
    core::price::{Currency, PriceArea, PriceBook, PricePoint},
    ops::Interval,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("prices in {area} on {on} are not published")]
    NotPublished { on: NaiveDate, area: PriceArea },

    #[error("failed to fetch the prices in {area} on {on}")]
    Network {
        on: NaiveDate,
        area: PriceArea,

        #[source]
        source: ureq::Error,
    },
}

pub struct Api(Agent);

impl Default for Api {
    fn default() -> Self {
        Self(client::new())
    }
}

impl Api {
    /// Fetch the prices for every market day, each day is fetched once.
    #[instrument(skip_all, fields(area = %area))]
    pub fn get_price_book(
        &self,
        market_dates: impl IntoIterator<Item = NaiveDate>,
        area: PriceArea,
    ) -> Result<PriceBook, Error> {
        let mut points = Vec::new();
        for on in market_dates {
            points.extend(self.get_prices(on, area)?);
        }
        let book: PriceBook = points.into_iter().collect();
        if book.is_empty() {
            warn!("the price book is empty");
        } else {
            info!(n_points = book.len(), "fetched the price book");
        }
        Ok(book)
    }

    /// Get all prices on the specified market day.
    #[instrument(skip_all, fields(on = %on, area = %area))]
    pub fn get_prices(&self, on: NaiveDate, area: PriceArea) -> Result<Vec<PricePoint>, Error> {
        info!("fetching…");
        let network_error = |source| Error::Network { on, area, source };
        let items = match self.0.get(url(on, area)).call() {
            Ok(mut response) => {
                response.body_mut().read_json::<Vec<Item>>().map_err(network_error)?
            }
            Err(ureq::Error::StatusCode(404)) => return Err(Error::NotPublished { on, area }),
            Err(error) => return Err(network_error(error)),
        };
        info!(n_items = items.len(), "fetched");
        Ok(items.into_iter().map(PricePoint::from).collect())
    }
}

fn url(on: NaiveDate, area: PriceArea) -> String {
    format!("https://www.elprisetjustnu.se/api/v1/prices/{}_{area}.json", on.format("%Y/%m-%d"))
}

#[derive(Deserialize)]
struct Item {
    #[serde(rename = "SEK_per_kWh")]
    sek_per_kwh: f64,

    time_start: DateTime<FixedOffset>,
    time_end: DateTime<FixedOffset>,
}

impl From<Item> for PricePoint {
    fn from(item: Item) -> Self {
        Self {
            interval: Interval::from_std(item.time_start.to_utc()..item.time_end.to_utc()),
            rate: KilowattHourRate(item.sek_per_kwh),
            currency: Currency::Sek,
        }
    }
}
