/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone)]
pub struct Config {
    pub building: BuildingConfig,
    pub car: CarConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Deserialize, Clone)]
pub struct BuildingConfig {
    pub total_floors: i32,
    pub car_count: usize,
}

#[derive(Deserialize, Clone, Copy)]
pub struct CarConfig {
    /// Real milliseconds per simulated tick.
    pub tick_ms: u64,
    /// Motion substeps per floor; one substep is advanced per tick.
    pub substeps_per_floor: i32,
    /// Ticks the door stays open after an arrival.
    pub door_open_ticks: u32,
}

#[derive(Deserialize, Clone, Copy)]
pub struct DispatchConfig {
    pub travel_time_per_floor: f64,
    pub stop_penalty: f64,
    pub turnaround_penalty: f64,
    /// Requests costed at or below this are considered about to be serviced
    /// and are no longer eligible for migration.
    pub near_threshold: f64,
    /// Minimum cost saving before a hall call is migrated to another car.
    pub improvement_threshold: f64,
    pub reoptimize_interval_ms: u64,
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config(path: &Path) -> Result<Config, String> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    toml::from_str(&config_str).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
}

impl Default for CarConfig {
    fn default() -> CarConfig {
        CarConfig {
            tick_ms: 200,
            substeps_per_floor: 5,
            door_open_ticks: 5,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> DispatchConfig {
        DispatchConfig {
            travel_time_per_floor: 5.0,
            stop_penalty: 5.0,
            turnaround_penalty: 15.0,
            near_threshold: 5.0,
            improvement_threshold: 5.0,
            reoptimize_interval_ms: 500,
        }
    }
}
