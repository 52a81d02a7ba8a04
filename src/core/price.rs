use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::{Europe::Stockholm, Tz};
use serde::Serialize;

use crate::{core::session::ChargingSession, ops::Interval, quantity::rate::KilowattHourRate};

/// Nord Pool delivery days for the Swedish areas follow the Swedish local time.
pub const MARKET_TIME_ZONE: Tz = Stockholm;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PriceArea {
    /// Luleå.
    Se1,

    /// Sundsvall.
    Se2,

    /// Stockholm.
    Se3,

    /// Malmö.
    #[default]
    Se4,
}

impl PriceArea {
    pub const ALL: [Self; 4] = [Self::Se1, Self::Se2, Self::Se3, Self::Se4];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Se1 => "SE1",
            Self::Se2 => "SE2",
            Self::Se3 => "SE3",
            Self::Se4 => "SE4",
        }
    }
}

impl Display for PriceArea {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown price area `{0}`, expected one of SE1, SE2, SE3, or SE4")]
pub struct UnknownAreaError(pub String);

impl FromStr for PriceArea {
    type Err = UnknownAreaError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|area| area.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| UnknownAreaError(code.to_string()))
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "SEK")]
    Sek,
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sek => f.write_str("SEK"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PricePoint {
    pub interval: Interval,
    pub rate: KilowattHourRate,
    pub currency: Currency,
}

/// Price points ordered by their start time.
#[must_use]
#[derive(Debug, Default)]
pub struct PriceBook(Vec<PricePoint>);

impl FromIterator<PricePoint> for PriceBook {
    fn from_iter<T: IntoIterator<Item = PricePoint>>(iter: T) -> Self {
        let mut points: Vec<_> = iter.into_iter().collect();
        points.sort_by_key(|point| point.interval.start);
        points.dedup_by_key(|point| point.interval.start);
        Self(points)
    }
}

impl PriceBook {
    /// Find the price point whose interval contains the timestamp.
    #[must_use]
    pub fn find(&self, at: DateTime<Utc>) -> Option<&PricePoint> {
        let index = self.0.partition_point(|point| point.interval.start <= at);
        index
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .filter(|point| point.interval.contains(at))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Market delivery days which contain at least one sample of the sessions.
#[must_use]
pub fn market_dates(sessions: &[ChargingSession]) -> BTreeSet<NaiveDate> {
    sessions
        .iter()
        .flat_map(|session| &session.samples)
        .map(|sample| sample.timestamp.with_timezone(&MARKET_TIME_ZONE).date_naive())
        .collect()
}
