quantity!(Cost, "kr");

impl Cost {
    /// Apply the value-added tax on top of the net amount.
    #[must_use]
    pub fn with_vat(self, vat_rate: f64) -> Self {
        self * (1.0 + vat_rate)
    }
}
