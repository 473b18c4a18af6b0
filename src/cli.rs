use clap::{Args, Parser, Subcommand};

use crate::api::Region;
use crate::geo::Position;

#[derive(Parser, Debug)]
#[command(
    name = "drivestatus-cli",
    version,
    about = "Show a nicely formatted vehicle status: mileage, charge, range and last trip"
)]
pub struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get the current status of each vehicle on the account.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// ConnectedDrive user name.
    pub username: String,
    /// ConnectedDrive password, or `-` to be prompted.
    pub password: String,
    /// Region of the ConnectedDrive account.
    #[arg(value_enum)]
    pub region: Region,
    /// Optional: your GPS latitude.
    #[arg(allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Optional: your GPS longitude.
    #[arg(allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// Post a summary of each new trip.
    #[arg(long)]
    pub post: bool,
}

impl StatusArgs {
    /// The caller's position, when both coordinates are given and non-zero.
    pub fn observer(&self) -> Option<Position> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(Position::new(lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(args: &[&str]) -> StatusArgs {
        let cli = Cli::try_parse_from(
            ["drivestatus-cli", "status"].iter().chain(args.iter()).copied(),
        )
        .expect("arguments parse");
        match cli.command {
            Command::Status(args) => args,
        }
    }

    #[test]
    fn parses_required_positionals() {
        let args = status(&["me@example.com", "pw", "rest_of_world"]);
        assert_eq!(args.username, "me@example.com");
        assert_eq!(args.region, Region::RestOfWorld);
        assert!(args.observer().is_none());
        assert!(!args.post);
    }

    #[test]
    fn parses_negative_coordinates() {
        let args = status(&["u", "p", "north_america", "53.42", "-2.75", "--post"]);
        assert_eq!(args.observer(), Some(Position::new(53.42, -2.75)));
        assert!(args.post);
    }

    #[test]
    fn zero_or_partial_coordinates_are_ignored() {
        assert!(status(&["u", "p", "china", "53.42"]).observer().is_none());
        assert!(status(&["u", "p", "china", "0", "-2.75"]).observer().is_none());
    }

    #[test]
    fn dash_password_is_accepted() {
        assert_eq!(status(&["u", "-", "china"]).password, "-");
    }

    #[test]
    fn rejects_unknown_region() {
        let err = Cli::try_parse_from(["drivestatus-cli", "status", "u", "p", "mars"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn rejects_missing_region() {
        assert!(Cli::try_parse_from(["drivestatus-cli", "status", "u", "p"]).is_err());
    }
}
