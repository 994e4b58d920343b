pub mod err;
pub mod osrm;

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Coordinate, Stop};
use err::RouteError;
use osrm::{TripResponse, TripService};

/// Result of planning a collection route.
///
/// An empty route means "no route available". It is never a partial order
/// of the selected stops.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub stops: Vec<Stop>,
    /// Metres, depot to depot.
    pub distance: f64,
    /// Seconds, depot to depot.
    pub duration: f64,
}

impl PlannedRoute {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        !self.stops.is_empty()
    }
}

/// Coordinate sequence sent to the trip service: `[depot, s_0, .., s_n-1, depot]`.
pub fn build_trip_coordinates(depot: Coordinate, stops: &[Stop]) -> Vec<Coordinate> {
    let mut coords = Vec::with_capacity(stops.len() + 2);
    coords.push(depot);
    coords.extend(stops.iter().map(|s| s.coordinate));
    coords.push(depot);
    coords
}

/// Map the optimized visiting order from a trip response back onto `stops`.
///
/// The first and last waypoints are the depot and are skipped. Every other
/// `waypoint_index` is re-based by one and used as the stop's output slot,
/// so `output[waypoint_index[i] - 1] = stops[i]`.
///
/// On success the output is a permutation of `stops`. Any inconsistency in
/// the response is an error; no partial order is ever returned.
pub fn reorder_stops<T: Clone>(stops: &[T], response: &TripResponse) -> Result<Vec<T>, RouteError> {
    if response.code != "Ok" {
        return Err(RouteError::Service {
            code: response.code.clone(),
            message: response.message.clone(),
        });
    }
    if response.trips.len() != 1 {
        return Err(RouteError::TripCount(response.trips.len()));
    }

    let n = stops.len();
    if response.waypoints.len() != n + 2 {
        return Err(RouteError::WaypointCount {
            expected: n + 2,
            actual: response.waypoints.len(),
        });
    }

    let mut slots: Vec<Option<T>> = vec![None; n];
    for (i, waypoint) in response.waypoints[1..=n].iter().enumerate() {
        let index = waypoint
            .as_ref()
            .and_then(|w| w.waypoint_index)
            .ok_or(RouteError::MissingIndex { stop: i })?;
        let position = index
            .checked_sub(1)
            .filter(|&p| p < n)
            .ok_or(RouteError::IndexOutOfRange { stop: i, index })?;
        if slots[position].is_some() {
            return Err(RouteError::DuplicateIndex { stop: i, position });
        }
        slots[position] = Some(stops[i].clone());
    }

    // n distinct positions in 0..n fill every slot.
    Ok(slots.into_iter().flatten().collect())
}

/// Ask the trip service for the best visiting order of `stops`, starting and
/// ending at `depot`.
///
/// Never fails: network, decoding and validation errors are logged and
/// collapse to [`PlannedRoute::empty`].
pub fn plan_route<S>(service: &S, depot: Coordinate, stops: &[Stop]) -> PlannedRoute
where
    S: TripService + ?Sized,
{
    if stops.is_empty() {
        debug!("no stops selected, skipping trip request");
        return PlannedRoute::empty();
    }

    match try_plan_route(service, depot, stops) {
        Ok(route) => route,
        Err(e) => {
            let error = format!("{e:#}");
            warn!(%error, stops = stops.len(), "no route available");
            PlannedRoute::empty()
        }
    }
}

fn try_plan_route<S>(service: &S, depot: Coordinate, stops: &[Stop]) -> anyhow::Result<PlannedRoute>
where
    S: TripService + ?Sized,
{
    if !depot.is_valid() {
        anyhow::bail!("Depot coordinate out of range: {depot}");
    }

    let coordinates = build_trip_coordinates(depot, stops);
    let response = service.trip(&coordinates)?;
    let ordered = reorder_stops(stops, &response)?;
    let trip = &response.trips[0];

    debug!(
        stops = ordered.len(),
        distance = trip.distance,
        duration = trip.duration,
        "route planned"
    );

    Ok(PlannedRoute {
        stops: ordered,
        distance: trip.distance,
        duration: trip.duration,
    })
}

/// Holds the route currently on display.
///
/// Every replan replaces the previous route, so a failed request leaves the
/// board empty instead of showing a stale order.
pub struct RouteBoard<S> {
    service: S,
    depot: Coordinate,
    current: PlannedRoute,
}

impl<S: TripService> RouteBoard<S> {
    pub fn new(service: S, depot: Coordinate) -> Self {
        Self {
            service,
            depot,
            current: PlannedRoute::empty(),
        }
    }

    pub fn replan(&mut self, stops: &[Stop]) -> &PlannedRoute {
        self.current = plan_route(&self.service, self.depot, stops);
        &self.current
    }

    pub fn set_depot(&mut self, depot: Coordinate) {
        self.depot = depot;
        self.current = PlannedRoute::empty();
    }

    pub fn current(&self) -> &PlannedRoute {
        &self.current
    }

    pub fn clear(&mut self) {
        self.current = PlannedRoute::empty();
    }
}
