use thiserror::Error;

/// Convenient result alias for the status computations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while deriving report figures from vehicle data.
#[derive(Debug, Error)]
pub enum Error {
    /// Average consumption of zero has no miles-per-kWh equivalent.
    #[error("efficiency is undefined for a trip with zero average consumption")]
    UndefinedEfficiency,

    /// The trip record carried no date, so it cannot be told apart from others.
    #[error("trip record has no date")]
    MissingTripDate,

    /// A measurement reported by the vehicle was negative or not a number.
    #[error("invalid {name} measurement: {value}")]
    InvalidMeasurement { name: &'static str, value: f64 },
}
