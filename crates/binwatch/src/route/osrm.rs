use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use crate::config::RoutingConfig;
use crate::model::Coordinate;

/// Anything that can turn a coordinate sequence into an optimized trip.
pub trait TripService {
    fn trip(&self, coordinates: &[Coordinate]) -> Result<TripResponse>;
}

/// Body of an OSRM `/trip` response. Only the fields the planner reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripResponse {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub trips: Vec<Trip>,

    /// One entry per input coordinate. `null` when the service dropped it.
    #[serde(default)]
    pub waypoints: Vec<Option<TripWaypoint>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trip {
    /// Metres.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripWaypoint {
    #[serde(default)]
    pub waypoint_index: Option<usize>,

    #[serde(default)]
    pub trips_index: Option<usize>,

    /// `[lon, lat]` snapped to the road network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
}

/// HTTP client for the OSRM Trip service.
pub struct OsrmClient {
    agent: Agent,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    pub fn new(base_url: &str, profile: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            // OSRM reports NoTrips/InvalidQuery as 400 with a JSON body.
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(
            config.osrm_url(),
            config.profile(),
            Duration::from_secs(config.timeout_secs()),
        )
    }

    /// Request URL without query parameters.
    pub fn trip_url(&self, coordinates: &[Coordinate]) -> String {
        let path = coordinates
            .iter()
            .map(|c| c.to_osrm())
            .collect::<Vec<_>>()
            .join(";");
        format!("{}/trip/v1/{}/{}", self.base_url, self.profile, path)
    }
}

impl TripService for OsrmClient {
    fn trip(&self, coordinates: &[Coordinate]) -> Result<TripResponse> {
        let url = self.trip_url(coordinates);
        debug!(%url, points = coordinates.len(), "requesting trip");

        let mut response = self
            .agent
            .get(&url)
            .query("source", "first")
            .query("destination", "last")
            .query("roundtrip", "false")
            .query("overview", "false")
            .call()
            .with_context(|| format!("Failed to call trip service at {}", self.base_url))?;

        let status = response.status();
        let trip: TripResponse = response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse trip response (HTTP {status})"))?;

        debug!(code = %trip.code, trips = trip.trips.len(), "trip response");
        Ok(trip)
    }
}
