/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use super::error::ApiError;
use crate::shared::{CarSnapshot, Direction};

/***************************************/
/*       Public data structures        */
/***************************************/
/// Wire spelling of a hall-call direction: `"U"` or `"D"`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HallDirection {
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "D")]
    Down,
}

impl HallDirection {
    pub fn parse(input: &str) -> Result<HallDirection, ApiError> {
        match input.to_ascii_uppercase().as_str() {
            "U" => Ok(HallDirection::Up),
            "D" => Ok(HallDirection::Down),
            _ => Err(ApiError::InvalidDirection(input.to_string())),
        }
    }

    pub fn as_direction(&self) -> Direction {
        match self {
            HallDirection::Up => Direction::Up,
            HallDirection::Down => Direction::Down,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct HallCallRequest {
    pub floor: i32,
    pub direction: HallDirection,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HallCallResponse {
    pub assigned_car_id: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct CarCallRequest {
    pub car_id: usize,
    pub floor: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct BuildingRequest {
    pub total_floors: i32,
    pub car_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub total_floors: i32,
    pub car_count: usize,
    pub cars: Vec<CarSnapshot>,
}
