// UI layer: runs the `status` flow. Fetches vehicle data through a
// `VehicleAccount`, prints one report per vehicle and, when asked, posts a
// summary of each new trip through a `Publisher`.

use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::api::{ConnectedDriveAccount, VehicleAccount};
use crate::cli::StatusArgs;
use crate::config::Config;
use crate::geo::Position;
use crate::marker::{DuplicatePostGuard, GuardOutcome, MarkerFile};
use crate::publish::{MicroblogClient, Publisher};
use crate::report::StatusReport;

/// Entry point for `status`: log in, then print (and optionally post).
pub fn status_command(config: &Config, args: &StatusArgs, out: &mut impl Write) -> Result<()> {
    // Missing secrets fail before any network traffic.
    let auth = config.client_auth()?;
    let publisher = if args.post {
        Some(MicroblogClient::new(&config.post_url, config.post_token()?)?)
    } else {
        None
    };

    let password = if args.password == "-" {
        Password::new().with_prompt("ConnectedDrive password").interact()?
    } else {
        args.password.clone()
    };

    let spinner = spinner("Logging in...");
    let account = ConnectedDriveAccount::login(
        &args.username,
        &password,
        args.region,
        config.server.as_deref(),
        &auth,
    );
    spinner.finish_and_clear();
    let mut account = account?;

    run_status(
        &mut account,
        config,
        args.observer(),
        publisher.as_ref().map(|p| p as &dyn Publisher),
        out,
    )
}

/// Refresh every vehicle and write its report to `out`. With a publisher,
/// also post each vehicle's trip summary once per new trip.
pub fn run_status<A: VehicleAccount>(
    account: &mut A,
    config: &Config,
    observer: Option<Position>,
    publisher: Option<&dyn Publisher>,
    out: &mut impl Write,
) -> Result<()> {
    let spinner = spinner("Refreshing vehicle states...");
    let refreshed = account.update_vehicle_states(observer);
    spinner.finish_and_clear();
    refreshed?;

    let home = observer.unwrap_or(config.home);
    debug!(?home, vehicles = account.vehicles().len(), "vehicle states refreshed");
    let marker = MarkerFile::new(&config.marker_path);

    for vehicle in account.vehicles() {
        let state = vehicle
            .state
            .as_ref()
            .ok_or_else(|| anyhow!("No state reported for vehicle {}", vehicle.vin))?;
        let trip = account.last_trip(&vehicle.vin)?;
        let report = StatusReport::build(&vehicle.name, state, &trip, home)?;

        writeln!(out)?;
        write!(out, "{}", report)?;

        let Some(publisher) = publisher else {
            continue;
        };
        let text = report.post_text();
        writeln!(out)?;
        writeln!(out, "{}", text)?;

        match DuplicatePostGuard::new(&marker).report(&report.trip_timestamp, &text, publisher)? {
            GuardOutcome::AlreadyReported => {
                writeln!(out, "Trip {} already posted", report.trip_timestamp)?
            }
            GuardOutcome::Posted => writeln!(out, "Posted trip {}", report.trip_timestamp)?,
            GuardOutcome::PostFailed(reason) => {
                writeln!(out, "post error (duplicate?): {}", reason)?
            }
        }
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
