/**
 * Collective-control dispatch across the car bank.
 *
 * The dispatcher owns every car and decides which one answers a hall call.
 * Each candidate car is priced with an expected-service-time estimate:
 * travel time per floor, a penalty per intermediate stop already scheduled,
 * and a penalty for any sweep reversal the pickup would depend on. The
 * cheapest car wins; ties go to the lowest car id so assignment is
 * deterministic.
 *
 * Accepted hall calls are recorded in a registry keyed by `(floor,
 * direction)` with the id the request carries inside its car's scheduler.
 * The registry makes re-submission idempotent and gives the re-optimizer
 * (see `reoptimizer.rs`) the handle it needs to move a still-waiting call to
 * a car that has since become a better choice.
 *
 * Car calls bypass all of this: they belong to their car by definition and
 * are handed straight to its scheduler.
 *
 * Lock order is registry before car, and both car mutexes are held while a
 * call migrates, so no snapshot can catch a hall call in neither car.
 */

/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::car::{CarCore, HallCallOutcome};
use crate::config::{BuildingConfig, CarConfig, DispatchConfig};
use crate::shared::{CarSnapshot, Direction, RequestId};

/***************************************/
/*       Public data structures        */
/***************************************/
/// Where a tracked hall call currently lives.
#[derive(Debug, Clone, Copy)]
pub struct Assignment {
    pub car_id: usize,
    pub request_id: RequestId,
}

pub struct Dispatcher {
    total_floors: i32,
    cars: Vec<Arc<Mutex<CarCore>>>,
    registry: Mutex<HashMap<(i32, Direction), Assignment>>,
    tuning: DispatchConfig,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Dispatcher {
    pub fn new(building: &BuildingConfig, car: &CarConfig, tuning: DispatchConfig) -> Dispatcher {
        let cars = (0..building.car_count)
            .map(|id| Arc::new(Mutex::new(CarCore::new(id, car))))
            .collect();
        Dispatcher {
            total_floors: building.total_floors,
            cars,
            registry: Mutex::new(HashMap::new()),
            tuning,
        }
    }

    pub fn total_floors(&self) -> i32 {
        self.total_floors
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn cars(&self) -> &[Arc<Mutex<CarCore>>] {
        &self.cars
    }

    pub fn tuning(&self) -> &DispatchConfig {
        &self.tuning
    }

    /// Assign a hall call to the best-suited car and return its id.
    /// Re-submitting a pending `(floor, direction)` is idempotent.
    pub fn submit_hall_call(&self, floor: i32, wants: Direction) -> usize {
        let mut registry = self.registry.lock();

        // A registry hit only proves the call was once assigned; the entry
        // survives physical service (cars do not report completion back).
        // Trust it only while the tracked request is still live on its car,
        // otherwise this press is a new request.
        if let Some(assignment) = registry.get(&(floor, wants)).copied() {
            let still_pending = self.cars[assignment.car_id]
                .lock()
                .hall_call_active(floor, wants)
                == Some(assignment.request_id);
            if still_pending {
                debug!(
                    "hall call {}{} already assigned to car {}",
                    floor, wants, assignment.car_id
                );
                return assignment.car_id;
            }
            registry.remove(&(floor, wants));
        }

        // The call may be live on a car without a registry entry (the
        // re-optimizer stops tracking near-service requests); re-adopt it.
        for (car_id, car) in self.cars.iter().enumerate() {
            let core = car.lock();
            if let Some(request_id) = core.hall_call_active(floor, wants) {
                registry.insert((floor, wants), Assignment { car_id, request_id });
                return car_id;
            }
        }

        let mut best_id = 0;
        let mut best_cost = f64::INFINITY;
        for (car_id, car) in self.cars.iter().enumerate() {
            let core = car.lock();
            let cost = cost(&core, floor, wants, &self.tuning);
            debug!("hall call {}{}: car {} costs {}", floor, wants, car_id, cost);
            if cost < best_cost {
                best_cost = cost;
                best_id = car_id;
            }
        }

        let mut core = self.cars[best_id].lock();
        match core.submit_hall_call(floor, wants) {
            HallCallOutcome::Queued(request_id) => {
                registry.insert(
                    (floor, wants),
                    Assignment {
                        car_id: best_id,
                        request_id,
                    },
                );
                info!(
                    "hall call {}{} assigned to car {} (cost {})",
                    floor, wants, best_id, best_cost
                );
            }
            HallCallOutcome::DoorOpened => {
                // Serviced on the spot; nothing left to track.
                info!("hall call {}{} serviced immediately by car {}", floor, wants, best_id);
            }
        }
        best_id
    }

    /// Car calls go straight to their car; the registry never sees them.
    pub fn submit_car_call(&self, car_id: usize, floor: i32) {
        if let Some(car) = self.cars.get(car_id) {
            car.lock().submit_car_call(floor);
        }
    }

    pub fn status(&self) -> Vec<CarSnapshot> {
        self.cars.iter().map(|car| car.lock().snapshot()).collect()
    }

    /// One re-optimization sweep over every tracked hall call. Called
    /// periodically by the `Reoptimizer` thread; synchronous so tests can
    /// invoke it directly.
    pub fn reoptimize_pass(&self) {
        let mut registry = self.registry.lock();
        let entries: Vec<((i32, Direction), Assignment)> =
            registry.iter().map(|(key, a)| (*key, *a)).collect();

        for ((floor, wants), assignment) in entries {
            let current_cost = {
                let core = self.cars[assignment.car_id].lock();
                cost(&core, floor, wants, &self.tuning)
            };

            // About to be serviced: stop tracking so the call cannot be
            // yanked away at the last moment.
            if current_cost <= self.tuning.near_threshold {
                registry.remove(&(floor, wants));
                continue;
            }

            let mut best_id = 0;
            let mut best_cost = f64::INFINITY;
            for (car_id, car) in self.cars.iter().enumerate() {
                let core = car.lock();
                let candidate = cost(&core, floor, wants, &self.tuning);
                if candidate < best_cost {
                    best_cost = candidate;
                    best_id = car_id;
                }
            }

            if best_id == assignment.car_id
                || current_cost - best_cost <= self.tuning.improvement_threshold
            {
                continue;
            }

            // Both car locks are held across the move so the call is always
            // observable in exactly one scheduler.
            let mut source = self.cars[assignment.car_id].lock();
            match source.remove_hall_call(assignment.request_id) {
                None => {
                    // Consumed between scoring and removal; it is being
                    // serviced, forget it.
                    registry.remove(&(floor, wants));
                }
                Some(_) => {
                    let mut dest = self.cars[best_id].lock();
                    match dest.submit_hall_call(floor, wants) {
                        HallCallOutcome::Queued(request_id) => {
                            registry.insert(
                                (floor, wants),
                                Assignment {
                                    car_id: best_id,
                                    request_id,
                                },
                            );
                            info!(
                                "migrated hall call {}{} from car {} to car {} (cost {} -> {})",
                                floor, wants, assignment.car_id, best_id, current_cost, best_cost
                            );
                        }
                        HallCallOutcome::DoorOpened => {
                            registry.remove(&(floor, wants));
                        }
                    }
                }
            }
        }
    }
}

/***************************************/
/*           Cost function             */
/***************************************/
/// Expected-service-time estimate for `car` answering `(floor, wants)`.
///
/// `T` per floor of travel, `S` per already-scheduled stop the pickup waits
/// behind, `P` per sweep reversal it depends on. A moving car exactly at the
/// requested floor cannot stop for it and is priced through the turnaround
/// branch.
pub fn cost(core: &CarCore, floor: i32, wants: Direction, tuning: &DispatchConfig) -> f64 {
    let travel = tuning.travel_time_per_floor;
    let stop = tuning.stop_penalty;
    let reversal = tuning.turnaround_penalty;

    let current = core.position().snapped();
    let effective = core.effective_direction();
    let scheduler = core.scheduler();

    if effective == Direction::Idle {
        return travel * (floor - current).abs() as f64;
    }

    let moving_at_floor = current == floor;
    let lowest = scheduler.lowest_stop().unwrap_or(current);
    let highest = scheduler.highest_stop().unwrap_or(current);

    match wants {
        Direction::Up => {
            if effective == Direction::Up {
                if current <= floor && !moving_at_floor {
                    // Straight pickup on the current sweep.
                    let stops_between = scheduler.count_up_serving_in(current, floor - 1);
                    travel * (floor - current) as f64 + stop * stops_between as f64
                } else {
                    // Already past it: top of sweep, down to the bottom,
                    // back up to the floor.
                    let top = highest.max(current);
                    let distance = (top - current) + (top - lowest) + (floor - lowest).abs();
                    travel * distance as f64
                        + stop * scheduler.total_stops() as f64
                        + reversal
                }
            } else {
                // Car heading down: ride to the turn point, then up.
                let turn = lowest.min(floor);
                let distance = (current - turn) + (floor - turn);
                let down_leg = scheduler.count_down_serving_in(turn, current);
                let up_leg = scheduler.count_up_serving_in(turn, floor - 1);
                travel * distance as f64 + stop * (down_leg + up_leg) as f64 + reversal
            }
        }
        Direction::Down => {
            if effective == Direction::Down {
                if current >= floor && !moving_at_floor {
                    let stops_between = scheduler.count_down_serving_in(floor + 1, current);
                    travel * (current - floor) as f64 + stop * stops_between as f64
                } else {
                    let bottom = lowest.min(current);
                    let distance = (current - bottom) + (highest - bottom) + (floor - highest).abs();
                    travel * distance as f64
                        + stop * scheduler.total_stops() as f64
                        + reversal
                }
            } else {
                let turn = highest.max(floor);
                let distance = (turn - current) + (turn - floor);
                let up_leg = scheduler.count_up_serving_in(current, turn);
                let down_leg = scheduler.count_down_serving_in(floor + 1, turn);
                travel * distance as f64 + stop * (up_leg + down_leg) as f64 + reversal
            }
        }
        Direction::Idle => f64::INFINITY,
    }
}

/***************************************/
/*              Test API               */
/***************************************/
#[cfg(test)]
pub mod testing {
    use super::{Assignment, Dispatcher};
    use crate::shared::Direction;

    impl Dispatcher {
        // Publicly expose the registry for testing
        pub fn test_assignment(&self, floor: i32, wants: Direction) -> Option<Assignment> {
            self.registry.lock().get(&(floor, wants)).copied()
        }

        pub fn test_registry_len(&self) -> usize {
            self.registry.lock().len()
        }
    }
}
