// Account client module: a small blocking HTTP client for the ConnectedDrive
// web API. It logs in once, lists the account's vehicles and fetches their
// state and last-trip statistics.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::ValueEnum;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, REFERER};
use serde::Deserialize;
use tracing::debug;

use crate::geo::Position;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_SCOPE: &str = "authenticate_user vehicle_data remote_services";
const WEB_REFERER: &str = "https://www.bmw-connecteddrive.de/app/index.html";

/// Regions served by separate ConnectedDrive API hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    #[value(name = "north_america")]
    NorthAmerica,
    #[value(name = "china")]
    China,
    #[value(name = "rest_of_world")]
    RestOfWorld,
}

impl Region {
    /// API host for this region.
    pub fn server(self) -> &'static str {
        match self {
            Region::NorthAmerica => "b2vapi.bmwgroup.us",
            Region::China => "b2vapi.bmwgroup.cn:8592",
            Region::RestOfWorld => "b2vapi.bmwgroup.com",
        }
    }
}

/// OAuth client credentials the account service expects on the token request.
#[derive(Clone)]
pub struct ClientAuth {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientAuth {
    fn basic_header(&self) -> Result<HeaderValue> {
        let encoded = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        HeaderValue::from_str(&format!("Basic {}", encoded))
            .context("OAuth client credentials are not valid header text")
    }
}

impl std::fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Snapshot of a vehicle's state as reported by the service.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    /// Odometer in kilometres.
    pub mileage: f64,
    /// Remaining electric range in miles.
    pub remaining_range_electric_mls: f64,
    /// Electric range at full charge in kilometres.
    pub max_range_electric: f64,
    /// High-voltage battery charge, 0-100.
    pub charging_level_hv: f64,
    #[serde(default)]
    pub position: Option<Position>,
}

/// The vehicle's most recently completed journey.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Fixed-offset timestamp, e.g. `2023-01-01T10:00:00+0100`.
    pub date: String,
    /// Minutes.
    pub duration: u32,
    /// Kilometres.
    pub total_distance: f64,
    /// kWh/100 km.
    pub avg_electric_consumption: f64,
    /// Ratio in 0..=1.
    pub efficiency_value: f64,
}

/// A vehicle registered to the account.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub vin: String,
    pub name: String,
    pub state: Option<VehicleState>,
}

/// Operations the status flow needs from a vehicle account.
pub trait VehicleAccount {
    fn vehicles(&self) -> &[Vehicle];

    /// Refresh the state of every vehicle, optionally telling the service
    /// where the caller is.
    fn update_vehicle_states(&mut self, observer: Option<Position>) -> Result<()>;

    fn last_trip(&self, vin: &str) -> Result<TripRecord>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct VehicleListing {
    vehicles: Vec<VehicleEntry>,
}

#[derive(Deserialize)]
struct VehicleEntry {
    vin: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    vehicle_status: VehicleState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastTripResponse {
    last_trip: TripRecord,
}

/// Logged-in ConnectedDrive session holding the account's vehicles.
pub struct ConnectedDriveAccount {
    client: Client,
    /// Scheme and host, e.g. `https://b2vapi.bmwgroup.com`.
    root: String,
    token: String,
    vehicles: Vec<Vehicle>,
}

impl ConnectedDriveAccount {
    /// Authenticate and load the vehicle list. `server` overrides the
    /// region's default host; it may carry its own scheme.
    pub fn login(
        username: &str,
        password: &str,
        region: Region,
        server: Option<&str>,
        auth: &ClientAuth,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        let root = server_root(server.unwrap_or(region.server()));

        let url = format!("{}/gcdm/oauth/token", root);
        debug!(%url, ?region, "requesting access token");
        let res = client
            .post(&url)
            .header(AUTHORIZATION, auth.basic_header()?)
            .form(&[
                ("grant_type", "password"),
                ("scope", TOKEN_SCOPE),
                ("username", username),
                ("password", password),
            ])
            .send()
            .context("Failed to send login request")?;
        let res = ensure_success(res, "Login")?;
        let token: TokenResponse = res.json().context("Parsing token response json")?;
        debug!(
            token_type = token.token_type.as_deref().unwrap_or("bearer"),
            expires_in = token.expires_in,
            "logged in"
        );

        let mut account = ConnectedDriveAccount {
            client,
            root,
            token: token.access_token,
            vehicles: Vec::new(),
        };
        account.vehicles = account.fetch_vehicles()?;
        Ok(account)
    }

    fn base_url(&self) -> String {
        format!("{}/webapi/v1/user/vehicles", self.root)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = format!("Bearer {}", self.token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&val).context("Access token is not valid header text")?,
        );
        headers.insert(REFERER, HeaderValue::from_static(WEB_REFERER));
        Ok(headers)
    }

    /// Authenticated GET of an arbitrary API URL, returning the JSON body.
    pub fn send_request(&self, url: &str, params: &[(&str, String)]) -> Result<serde_json::Value> {
        debug!(%url, "GET");
        let res = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(params)
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;
        let res = ensure_success(res, "Request")?;
        res.json().context("Parsing response json")
    }

    fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
        let body = self.send_request(&self.base_url(), &[])?;
        let listing: VehicleListing =
            serde_json::from_value(body).context("Parsing vehicle list")?;
        Ok(listing
            .vehicles
            .into_iter()
            .map(|entry| Vehicle {
                name: entry.model.unwrap_or_else(|| entry.vin.clone()),
                vin: entry.vin,
                state: None,
            })
            .collect())
    }
}

impl VehicleAccount for ConnectedDriveAccount {
    fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    fn update_vehicle_states(&mut self, observer: Option<Position>) -> Result<()> {
        let mut params = vec![(
            "deviceTime",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        )];
        if let Some(observer) = observer {
            params.push(("dlat", observer.lat.to_string()));
            params.push(("dlon", observer.lon.to_string()));
        }

        let mut states = Vec::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            let url = format!("{}/{}/status", self.base_url(), vehicle.vin);
            let body = self.send_request(&url, &params)?;
            let status: StatusResponse = serde_json::from_value(body)
                .with_context(|| format!("Parsing status of {}", vehicle.vin))?;
            states.push(status.vehicle_status);
        }
        for (vehicle, state) in self.vehicles.iter_mut().zip(states) {
            vehicle.state = Some(state);
        }
        Ok(())
    }

    fn last_trip(&self, vin: &str) -> Result<TripRecord> {
        let url = format!("{}/{}/statistics/lastTrip", self.base_url(), vin);
        let body = self.send_request(&url, &[])?;
        let trip: LastTripResponse = serde_json::from_value(body)
            .with_context(|| format!("Parsing last trip of {}", vin))?;
        Ok(trip.last_trip)
    }
}

/// `https://` is assumed for a bare host.
fn server_root(server: &str) -> String {
    let server = server.trim_end_matches('/');
    if server.contains("://") {
        server.to_string()
    } else {
        format!("https://{}", server)
    }
}

/// Turn a non-2xx response into an error carrying the status and body.
pub(crate) fn ensure_success(res: Response, what: &str) -> Result<Response> {
    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().unwrap_or_else(|_| "".into());
        bail!("{} failed: {} - {}", what, status, txt);
    }
    Ok(res)
}
