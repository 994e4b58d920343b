
use std::cell::{Cell, RefCell};

use super::osrm::{Trip, TripResponse, TripService, TripWaypoint};
use crate::model::{Coordinate, Stop};

/// Depot used throughout the route tests.
fn depot() -> Coordinate {
    Coordinate::new(52.5200, 13.4050)
}

/// Helper to create a Stop with a distinct coordinate per id.
fn stop(id: &str, offset: f64) -> Stop {
    Stop::new(id, Coordinate::new(52.5 + offset, 13.4 + offset))
}

/// Helper to build a successful single-trip response from raw waypoint
/// indices, depot entries included.
fn response(indices: &[Option<usize>]) -> TripResponse {
    TripResponse {
        code: "Ok".to_string(),
        message: None,
        trips: vec![Trip {
            distance: 4200.0,
            duration: 610.0,
        }],
        waypoints: indices
            .iter()
            .map(|&waypoint_index| {
                Some(TripWaypoint {
                    waypoint_index,
                    trips_index: Some(0),
                    location: None,
                })
            })
            .collect(),
    }
}

/// Ids of stops in order.
fn ids(stops: &[Stop]) -> Vec<&str> {
    stops.iter().map(|s| s.id.as_str()).collect()
}

/// Trip service returning a canned answer and recording what it was asked.
struct FakeTrip {
    answer: Result<TripResponse, String>,
    calls: Cell<usize>,
    last_request: RefCell<Vec<Coordinate>>,
}

impl FakeTrip {
    fn ok(response: TripResponse) -> Self {
        Self {
            answer: Ok(response),
            calls: Cell::new(0),
            last_request: RefCell::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            calls: Cell::new(0),
            last_request: RefCell::new(Vec::new()),
        }
    }
}

impl TripService for FakeTrip {
    fn trip(&self, coordinates: &[Coordinate]) -> anyhow::Result<TripResponse> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = coordinates.to_vec();
        match &self.answer {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

impl TripService for &FakeTrip {
    fn trip(&self, coordinates: &[Coordinate]) -> anyhow::Result<TripResponse> {
        (*self).trip(coordinates)
    }
}
