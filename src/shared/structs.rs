/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Idle => write!(f, "IDLE"),
        }
    }
}

/// Opaque handle for a pending request. Stable across its lifetime on one
/// car; a migrated hall call receives a fresh id on the destination car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Mint a fresh id, unique within this process run.
    pub fn next() -> RequestId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RequestId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Car position in integer substeps of a floor. The scheduler only ever
/// compares `steps` against `floor * scale`, so floor comparisons stay exact
/// while the car is between floors; the fractional reading exists only for
/// status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    steps: i32,
    scale: i32,
}

impl Position {
    pub fn at_floor(floor: i32, scale: i32) -> Position {
        Position {
            steps: floor * scale,
            scale,
        }
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Integer floor the car is currently on (rounded toward the ground).
    pub fn snapped(&self) -> i32 {
        self.steps.div_euclid(self.scale)
    }

    pub fn as_float(&self) -> f64 {
        self.steps as f64 / self.scale as f64
    }

    pub fn is_at(&self, floor: i32) -> bool {
        self.steps == floor * self.scale
    }

    pub fn is_above(&self, floor: i32) -> bool {
        self.steps > floor * self.scale
    }

    pub fn is_below(&self, floor: i32) -> bool {
        self.steps < floor * self.scale
    }

    /// Move one substep in the given direction.
    pub fn advance(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.steps += 1,
            Direction::Down => self.steps -= 1,
            Direction::Idle => {}
        }
    }

    pub fn snap_to(&mut self, floor: i32) {
        self.steps = floor * self.scale;
    }
}

/// One car's externally visible state. Compared (minus timestamp, which it
/// does not carry) by the broadcaster to suppress no-change updates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub car_id: usize,
    pub current_floor: f64,
    pub direction: Direction,
    pub door_open: bool,
    pub external_up_requests: Vec<i32>,
    pub external_down_requests: Vec<i32>,
    pub internal_requests: Vec<i32>,
}

/// Frame pushed to every subscriber on connect and on each accepted change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StateFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub total_floors: i32,
    pub cars: Vec<CarSnapshot>,
    pub timestamp: f64,
}

impl StateFrame {
    pub fn new(total_floors: i32, cars: Vec<CarSnapshot>, timestamp: f64) -> StateFrame {
        StateFrame {
            kind: "state_update".to_string(),
            total_floors,
            cars,
            timestamp,
        }
    }
}
