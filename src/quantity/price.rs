quantity!(
    /// Euro per kilowatt-hour, as published by the price source.
    KilowattHourPrice, via: f64, suffix: "€/kWh", precision: 4
);

quantity!(
    /// Euro cents per kilowatt-hour, the display unit.
    CentsPerKilowattHour, via: f64, suffix: "c/kWh", precision: 2
);

impl CentsPerKilowattHour {
    pub const PER_EURO: f64 = 100.0;
}

impl From<KilowattHourPrice> for CentsPerKilowattHour {
    fn from(price: KilowattHourPrice) -> Self {
        Self(price.0 * Self::PER_EURO)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_into_cents() {
        let cents = CentsPerKilowattHour::from(KilowattHourPrice(0.1234));
        assert_abs_diff_eq!(cents.0, 12.34, epsilon = 1e-9);
    }

    #[test]
    fn test_ordering_is_total() {
        assert!(KilowattHourPrice(-0.01) < KilowattHourPrice(0.0));
        assert!(KilowattHourPrice(f64::NAN) > KilowattHourPrice(1000.0));
        assert_eq!(KilowattHourPrice(0.25), KilowattHourPrice(0.25));
    }

    #[test]
    fn test_display() {
        assert_eq!(CentsPerKilowattHour(12.346).to_string(), "12.35 c/kWh");
        assert_eq!(format!("{:.1}", CentsPerKilowattHour(12.346)), "12.3 c/kWh");
        assert_eq!(KilowattHourPrice(0.1).to_string(), "0.1000 €/kWh");
    }
}
