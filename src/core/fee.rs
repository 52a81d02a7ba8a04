use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::quantity::rate::KilowattHourRate;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FeeTier {
    /// Nights and weekends.
    Low,

    /// Weekday daytime.
    High,
}

impl FeeTier {
    /// First hour of the high-tier window, inclusive.
    const DAYTIME_START_HOUR: u32 = 6;

    /// Last hour of the high-tier window, exclusive.
    const DAYTIME_END_HOUR: u32 = 22;

    /// Resolve the tier, the window is evaluated in UTC.
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        let is_weekend = matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun);
        let is_daytime =
            (Self::DAYTIME_START_HOUR..Self::DAYTIME_END_HOUR).contains(&timestamp.hour());
        if is_daytime && !is_weekend { Self::High } else { Self::Low }
    }
}

/// Net usage fee («nätavgift») rates.
#[derive(Copy, Clone, Debug, PartialEq, bon::Builder)]
pub struct FeeSchedule {
    pub low: KilowattHourRate,
    pub high: KilowattHourRate,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { low: KilowattHourRate(0.1259), high: KilowattHourRate(0.2459) }
    }
}

impl FeeSchedule {
    #[must_use]
    pub const fn rate(&self, tier: FeeTier) -> KilowattHourRate {
        match tier {
            FeeTier::Low => self.low,
            FeeTier::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> FeeTier {
        FeeTier::at(Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap())
    }

    #[test]
    fn test_weekday_daytime_is_high() {
        // Friday.
        assert_eq!(at(2023, 9, 29, 6, 0), FeeTier::High);
        assert_eq!(at(2023, 9, 29, 12, 30), FeeTier::High);
        assert_eq!(at(2023, 9, 29, 21, 59), FeeTier::High);
    }

    #[test]
    fn test_weekday_night_is_low() {
        assert_eq!(at(2023, 9, 29, 5, 59), FeeTier::Low);
        assert_eq!(at(2023, 9, 29, 22, 0), FeeTier::Low);
        assert_eq!(at(2023, 9, 29, 23, 0), FeeTier::Low);
    }

    #[test]
    fn test_weekend_is_low() {
        // Saturday and Sunday.
        assert_eq!(at(2023, 9, 30, 12, 0), FeeTier::Low);
        assert_eq!(at(2023, 10, 1, 12, 0), FeeTier::Low);
        // Monday morning again.
        assert_eq!(at(2023, 10, 2, 6, 0), FeeTier::High);
    }

    #[test]
    fn test_deterministic() {
        let timestamp = Utc.with_ymd_and_hms(2023, 10, 4, 14, 15, 0).unwrap();
        assert_eq!(FeeTier::at(timestamp), FeeTier::at(timestamp));
    }

    #[test]
    fn test_schedule_rate() {
        let schedule = FeeSchedule::builder()
            .low(KilowattHourRate(0.2259))
            .high(KilowattHourRate(0.5))
            .build();
        assert_eq!(schedule.rate(FeeTier::Low), KilowattHourRate(0.2259));
        assert_eq!(schedule.rate(FeeTier::High), KilowattHourRate(0.5));
        assert_eq!(FeeSchedule::default().low, KilowattHourRate(0.1259));
    }
}
