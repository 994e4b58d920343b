use std::fmt;

/// Reasons a trip response cannot be mapped back onto the selected stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The service answered with a code other than `Ok`.
    Service {
        code: String,
        message: Option<String>,
    },
    /// Exactly one trip is required.
    TripCount(usize),
    /// Waypoint list does not line up with `[depot, stops.., depot]`.
    WaypointCount { expected: usize, actual: usize },
    /// The service dropped a stop.
    MissingIndex { stop: usize },
    /// A waypoint index that does not re-base into the stop list.
    IndexOutOfRange { stop: usize, index: usize },
    /// Two stops were assigned the same position.
    DuplicateIndex { stop: usize, position: usize },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service { code, message } => match message {
                Some(msg) => write!(f, "Trip service returned {code}: {msg}"),
                None => write!(f, "Trip service returned {code}"),
            },
            Self::TripCount(n) => write!(f, "Expected exactly one trip, got {n}"),
            Self::WaypointCount { expected, actual } => {
                write!(f, "Expected {expected} waypoints, got {actual}")
            }
            Self::MissingIndex { stop } => write!(f, "No waypoint index for stop {stop}"),
            Self::IndexOutOfRange { stop, index } => {
                write!(f, "Waypoint index {index} for stop {stop} is out of range")
            }
            Self::DuplicateIndex { stop, position } => {
                write!(f, "Stop {stop} maps to position {position}, which is already taken")
            }
        }
    }
}

impl std::error::Error for RouteError {}
