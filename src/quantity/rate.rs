quantity!(
    /// Price of one kilowatt-hour in the price point currency.
    KilowattHourRate,
    "kr/kWh"
);
