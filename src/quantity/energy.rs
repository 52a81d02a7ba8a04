use std::ops::Mul;

use crate::quantity::{cost::Cost, rate::KilowattHourRate};

quantity!(KilowattHours, "kWh");

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_energy_times_rate() {
        let cost = KilowattHours(2.5) * KilowattHourRate(0.4);
        assert_abs_diff_eq!(cost.0, 1.0);
    }

    #[test]
    fn test_sum() {
        let total: KilowattHours = [KilowattHours(1.0), KilowattHours(0.5)].into_iter().sum();
        assert_eq!(total, KilowattHours(1.5));
    }
}
