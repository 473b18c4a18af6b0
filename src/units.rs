use crate::error::{Error, Result};

/// Kilometres per statute mile.
pub const KM_PER_MILE: f64 = 1.609344;

/// Convert a distance in kilometres to miles.
pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

/// Convert an average consumption in kWh/100 km into miles per kWh.
///
/// A zero consumption has no finite equivalent and is reported as
/// [`Error::UndefinedEfficiency`] rather than as infinity.
pub fn consumption_to_miles_per_kwh(kwh_per_100km: f64) -> Result<f64> {
    if !kwh_per_100km.is_finite() || kwh_per_100km < 0.0 {
        return Err(Error::InvalidMeasurement {
            name: "average consumption",
            value: kwh_per_100km,
        });
    }
    if kwh_per_100km == 0.0 {
        return Err(Error::UndefinedEfficiency);
    }
    Ok(100.0 / (kwh_per_100km * KM_PER_MILE))
}

/// Round to `places` decimal places, halves away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_km_is_zero_miles() {
        assert_eq!(km_to_miles(0.0), 0.0);
    }

    #[test]
    fn km_to_miles_is_non_negative_and_monotonic() {
        let mut previous = km_to_miles(0.0);
        for step in 1..500 {
            let miles = km_to_miles(step as f64 * 3.7);
            assert!(miles >= 0.0);
            assert!(miles > previous, "not increasing at step {step}");
            previous = miles;
        }
    }

    #[test]
    fn one_mile_round_trips() {
        assert!((km_to_miles(KM_PER_MILE) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn consumption_converts_to_miles_per_kwh() {
        // 16 kWh/100km is a typical small EV figure, about 3.88 mi/kWh.
        let mpk = consumption_to_miles_per_kwh(16.0).unwrap();
        assert!((mpk - 3.8836).abs() < 1e-3, "got {mpk}");
    }

    #[test]
    fn zero_consumption_is_undefined() {
        let err = consumption_to_miles_per_kwh(0.0).unwrap_err();
        assert!(matches!(err, Error::UndefinedEfficiency));
    }

    #[test]
    fn negative_or_nan_consumption_is_rejected() {
        assert!(matches!(
            consumption_to_miles_per_kwh(-1.0),
            Err(Error::InvalidMeasurement { .. })
        ));
        assert!(matches!(
            consumption_to_miles_per_kwh(f64::NAN),
            Err(Error::InvalidMeasurement { .. })
        ));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(49.96, 1), 50.0);
    }
}
