// Library root
// -----------
// The binary (`main.rs`) parses arguments and hands them to `ui`, which runs
// the status flow on top of the other modules.
//
// Module responsibilities:
// - `api`: ConnectedDrive account client (login, vehicles, state, last trip).
// - `publish`: microblog posting client.
// - `units`, `geo`: unit conversions and distance from home.
// - `report`: builds the console report and the post summary.
// - `marker`: once-per-trip posting guard backed by a marker file.
// - `config`: environment-supplied settings and secrets.
// - `cli`, `ui`: argument model and the `status` flow.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod marker;
pub mod publish;
pub mod report;
pub mod ui;
pub mod units;

pub use error::{Error, Result};
