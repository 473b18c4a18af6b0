// Runtime configuration: secrets and the home location come from the
// environment so nothing sensitive is compiled into the binary.

use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::api::ClientAuth;
use crate::geo::{Position, DEFAULT_HOME};
use crate::publish::DEFAULT_POST_URL;

pub const HOME_LAT_ENV: &str = "DRIVESTATUS_HOME_LAT";
pub const HOME_LNG_ENV: &str = "DRIVESTATUS_HOME_LNG";
pub const MARKER_FILE_ENV: &str = "DRIVESTATUS_MARKER_FILE";
pub const CLIENT_ID_ENV: &str = "CONNECTED_DRIVE_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "CONNECTED_DRIVE_CLIENT_SECRET";
pub const SERVER_ENV: &str = "CONNECTED_DRIVE_SERVER";
pub const POST_TOKEN_ENV: &str = "DRIVESTATUS_POST_TOKEN";
pub const POST_URL_ENV: &str = "DRIVESTATUS_POST_URL";

const MARKER_FILE_NAME: &str = ".drivestatus_last_trip";

#[derive(Clone)]
pub struct Config {
    pub home: Position,
    pub marker_path: PathBuf,
    /// Overrides the region's API host.
    pub server: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub post_url: String,
    pub post_token: Option<String>,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let home = match (var(HOME_LAT_ENV), var(HOME_LNG_ENV)) {
            (None, None) => DEFAULT_HOME,
            (Some(lat), Some(lng)) => Position::new(
                parse_coordinate(HOME_LAT_ENV, &lat)?,
                parse_coordinate(HOME_LNG_ENV, &lng)?,
            ),
            _ => {
                return Err(anyhow!(
                    "{} and {} must be set together",
                    HOME_LAT_ENV,
                    HOME_LNG_ENV
                ))
            }
        };

        let marker_path = match var(MARKER_FILE_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(MARKER_FILE_NAME),
        };

        Ok(Config {
            home,
            marker_path,
            server: var(SERVER_ENV),
            client_id: var(CLIENT_ID_ENV),
            client_secret: var(CLIENT_SECRET_ENV),
            post_url: var(POST_URL_ENV).unwrap_or_else(|| DEFAULT_POST_URL.to_string()),
            post_token: var(POST_TOKEN_ENV),
        })
    }

    /// OAuth client credentials for the account login.
    pub fn client_auth(&self) -> Result<ClientAuth> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok(ClientAuth {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => Err(anyhow!(
                "{} and {} must be set to log in",
                CLIENT_ID_ENV,
                CLIENT_SECRET_ENV
            )),
        }
    }

    /// Bearer token for the posting service.
    pub fn post_token(&self) -> Result<&str> {
        self.post_token
            .as_deref()
            .ok_or_else(|| anyhow!("{} must be set to post", POST_TOKEN_ENV))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("home", &self.home)
            .field("marker_path", &self.marker_path)
            .field("server", &self.server)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("post_url", &self.post_url)
            .field("post_token", &redact(&self.post_token))
            .finish()
    }
}

fn parse_coordinate(key: &str, value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} is not a number: {}", key, value))?;
    if !parsed.is_finite() {
        return Err(anyhow!("{} is not a finite number: {}", key, value));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.home, DEFAULT_HOME);
        assert!(cfg.marker_path.ends_with(MARKER_FILE_NAME));
        assert_eq!(cfg.post_url, DEFAULT_POST_URL);
        assert!(cfg.client_auth().is_err());
        assert!(cfg.post_token().is_err());
    }

    #[test]
    fn reads_home_and_marker_overrides() {
        let cfg = config(&[
            (HOME_LAT_ENV, "51.5"),
            (HOME_LNG_ENV, " -0.12 "),
            (MARKER_FILE_ENV, "/tmp/trip.txt"),
        ])
        .unwrap();
        assert_eq!(cfg.home, Position::new(51.5, -0.12));
        assert_eq!(cfg.marker_path, PathBuf::from("/tmp/trip.txt"));
    }

    #[test]
    fn half_a_home_location_is_an_error() {
        assert!(config(&[(HOME_LAT_ENV, "51.5")]).is_err());
        assert!(config(&[(HOME_LAT_ENV, "north"), (HOME_LNG_ENV, "0")]).is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = config(&[
            (CLIENT_ID_ENV, "client"),
            (CLIENT_SECRET_ENV, "hunter2"),
            (POST_TOKEN_ENV, "tok-123"),
        ])
        .unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-123"));
        assert_eq!(cfg.client_auth().unwrap().client_secret, "hunter2");
        assert_eq!(cfg.post_token().unwrap(), "tok-123");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = config(&[(POST_TOKEN_ENV, ""), (SERVER_ENV, "  ")]).unwrap();
        assert!(cfg.post_token.is_none());
        assert!(cfg.server.is_none());
    }
}
