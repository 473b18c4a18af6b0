//! Human-readable vehicle status and last-trip summaries.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use tracing::warn;

use crate::api::{TripRecord, VehicleState};
use crate::error::{Error, Result};
use crate::geo::{Location, Position};
use crate::units::{consumption_to_miles_per_kwh, km_to_miles, round_to};

const TRIP_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Figures derived from one vehicle's state and its last trip, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub name: String,
    /// Whole miles, truncated.
    pub odometer_miles: u64,
    pub remaining_range_miles: f64,
    pub charge_percent: f64,
    pub location: Location,
    pub since_last_charge_miles: f64,
    /// Display form of the trip date, also used as the marker value.
    pub trip_timestamp: String,
    pub trip_distance_miles: f64,
    pub trip_duration_minutes: u32,
    pub miles_per_kwh: f64,
    /// Efficiency on a 0-5 scale.
    pub rating: f64,
}

impl StatusReport {
    /// Derive the report figures. Fails when the trip has no date or its
    /// efficiency is undefined.
    pub fn build(
        name: &str,
        state: &VehicleState,
        trip: &TripRecord,
        home: Position,
    ) -> Result<Self> {
        if trip.date.trim().is_empty() {
            return Err(Error::MissingTripDate);
        }
        let max_range_miles = km_to_miles(state.max_range_electric);
        let since_last_charge = max_range_miles - state.remaining_range_electric_mls;
        Ok(StatusReport {
            name: name.to_string(),
            odometer_miles: km_to_miles(state.mileage).max(0.0) as u64,
            remaining_range_miles: state.remaining_range_electric_mls,
            charge_percent: state.charging_level_hv,
            location: Location::classify(home, state.position),
            since_last_charge_miles: round_to(since_last_charge, 1),
            trip_timestamp: trip_timestamp(&trip.date),
            trip_distance_miles: round_to(km_to_miles(trip.total_distance), 1),
            trip_duration_minutes: trip.duration,
            miles_per_kwh: consumption_to_miles_per_kwh(trip.avg_electric_consumption)?,
            rating: round_to(trip.efficiency_value * 5.0, 1),
        })
    }

    /// The short summary published once per trip.
    pub fn post_text(&self) -> String {
        [
            "Last journey / status:".to_string(),
            format!(
                " \u{1F697} {:.1} miles in {} mins",
                self.trip_distance_miles, self.trip_duration_minutes
            ),
            format!(" \u{1F30D} {:.1} mi/kWh", self.miles_per_kwh),
            format!(
                " \u{1F50B} {}% ({} miles)",
                self.charge_percent, self.remaining_range_miles
            ),
            format!(" \u{1F6E1}\u{FE0F} {:.1}/5.0", self.rating),
        ]
        .join("\n")
    }
}

/// The multi-line console report.
impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "mileage: {}", self.odometer_miles)?;
        writeln!(f, "E-Range: {} miles", self.remaining_range_miles)?;
        writeln!(f, "Battery: {}%", self.charge_percent)?;
        match self.location {
            Location::Home => writeln!(f, "Location: home")?,
            Location::Away { miles } => writeln!(f, "Location: {:.1} miles from home", miles)?,
            Location::Unknown => writeln!(f, "Location: unknown")?,
        }
        writeln!(
            f,
            "Distance since last charge: {:.1} miles",
            self.since_last_charge_miles
        )?;
        writeln!(f)?;
        writeln!(f, "Last Trip:")?;
        writeln!(f, "{}", self.trip_timestamp)?;
        writeln!(
            f,
            "{:.1} miles in {} minutes",
            self.trip_distance_miles, self.trip_duration_minutes
        )?;
        writeln!(f, "{:.2} mi/kWh", self.miles_per_kwh)?;
        writeln!(f, "Efficiency: {:.1} /5.0", self.rating)
    }
}

/// Normalise a trip date such as `2023-01-01T10:00:00+0100` to
/// `2023-01-01 10:00:00` in its own offset. Unparseable dates pass through.
pub fn trip_timestamp(raw: &str) -> String {
    let with_offset = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw));
    if let Ok(date) = with_offset {
        return date.naive_local().format(TRIP_DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return date.format(TRIP_DATE_FORMAT).to_string();
    }
    warn!(date = raw, "unrecognised trip date format, using it verbatim");
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::DEFAULT_HOME;

    fn state() -> VehicleState {
        VehicleState {
            mileage: 16093.44,
            remaining_range_electric_mls: 50.0,
            max_range_electric: 160.9344,
            charging_level_hv: 80.0,
            position: Some(DEFAULT_HOME),
        }
    }

    fn trip() -> TripRecord {
        TripRecord {
            date: "2023-01-01T10:00:00+0100".into(),
            duration: 25,
            total_distance: 16.09344,
            avg_electric_consumption: 16.0,
            efficiency_value: 0.8,
        }
    }

    #[test]
    fn derives_odometer_and_since_last_charge() {
        let report = StatusReport::build("i3", &state(), &trip(), DEFAULT_HOME).unwrap();
        assert_eq!(report.odometer_miles, 10000);
        assert_eq!(report.since_last_charge_miles, 50.0);
        assert_eq!(report.location, Location::Home);

        let text = report.to_string();
        assert!(text.contains("mileage: 10000\n"), "{text}");
        assert!(text.contains("Distance since last charge: 50.0 miles\n"), "{text}");
    }

    #[test]
    fn efficiency_rating_is_scaled_to_five() {
        let report = StatusReport::build("i3", &state(), &trip(), DEFAULT_HOME).unwrap();
        assert_eq!(report.rating, 4.0);
        assert!(report.to_string().contains("Efficiency: 4.0 /5.0"));
    }

    #[test]
    fn renders_fields_in_fixed_order() {
        let report = StatusReport::build("i3 94", &state(), &trip(), DEFAULT_HOME).unwrap();
        let expected = "\
i3 94
mileage: 10000
E-Range: 50 miles
Battery: 80%
Location: home
Distance since last charge: 50.0 miles

Last Trip:
2023-01-01 10:00:00
10.0 miles in 25 minutes
3.88 mi/kWh
Efficiency: 4.0 /5.0
";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn away_and_unknown_locations() {
        let mut away = state();
        away.position = Some(Position::new(53.4808, -2.2426));
        let text = StatusReport::build("i3", &away, &trip(), DEFAULT_HOME)
            .unwrap()
            .to_string();
        assert!(text.contains(" miles from home\n"), "{text}");

        let mut hidden = state();
        hidden.position = None;
        let text = StatusReport::build("i3", &hidden, &trip(), DEFAULT_HOME)
            .unwrap()
            .to_string();
        assert!(text.contains("Location: unknown\n"));
    }

    #[test]
    fn zero_consumption_surfaces_error() {
        let mut t = trip();
        t.avg_electric_consumption = 0.0;
        let err = StatusReport::build("i3", &state(), &t, DEFAULT_HOME).unwrap_err();
        assert!(matches!(err, Error::UndefinedEfficiency));
    }

    #[test]
    fn blank_trip_date_is_rejected() {
        for date in ["", "   "] {
            let mut t = trip();
            t.date = date.into();
            let err = StatusReport::build("i3", &state(), &t, DEFAULT_HOME).unwrap_err();
            assert!(matches!(err, Error::MissingTripDate), "{date:?}");
        }
    }

    #[test]
    fn post_text_summarises_trip() {
        let report = StatusReport::build("i3", &state(), &trip(), DEFAULT_HOME).unwrap();
        let text = report.post_text();
        assert!(text.starts_with("Last journey / status:\n"));
        assert!(text.contains("10.0 miles in 25 mins"));
        assert!(text.contains("3.9 mi/kWh"));
        assert!(text.contains("80% (50 miles)"));
        assert!(text.ends_with("4.0/5.0"));
    }

    #[test]
    fn trip_timestamp_formats() {
        assert_eq!(trip_timestamp("2023-01-02T09:00:00+0000"), "2023-01-02 09:00:00");
        assert_eq!(trip_timestamp("2023-01-02T09:00:00"), "2023-01-02 09:00:00");
        assert_eq!(trip_timestamp("2023-01-02T09:00:00Z"), "2023-01-02 09:00:00");
        assert_eq!(trip_timestamp("2023-01-02T09:00:00+01:00"), "2023-01-02 09:00:00");
        assert_eq!(trip_timestamp("yesterday"), "yesterday");
    }
}
