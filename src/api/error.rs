/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*             Public API              */
/***************************************/
/// Everything the boundary can refuse. Nothing here mutates core state; a
/// rejected request leaves the bank exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("floor {floor} out of range 0..{total_floors}")]
    FloorOutOfRange { floor: i32, total_floors: i32 },

    #[error("car {car_id} out of range, bank has {car_count} cars")]
    CarOutOfRange { car_id: usize, car_count: usize },

    #[error("direction must be 'U' (up) or 'D' (down), got {0:?}")]
    InvalidDirection(String),

    #[error("building must have at least 2 floors and 1 car")]
    InvalidBuilding,

    #[error("elevator service not initialised")]
    NotInitialised,
}

/// Shorthand result type for the boundary surface.
pub type ApiResult<T> = Result<T, ApiError>;
