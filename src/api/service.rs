/**
 * Transport-neutral boundary onto the dispatcher.
 *
 * `ElevatorService` is what an HTTP router or a test harness talks to: it
 * validates inputs, owns the lifecycle of the running building (cars,
 * re-optimizer, broadcaster and their threads) and maps operations onto the
 * dispatcher. The service starts uninitialised; `reconfigure_building`
 * builds the first bank and is also the blunt reset — it tears every thread
 * down, waits for them, and constructs a fresh world. No request survives a
 * reconfiguration.
 *
 * # Threads per building
 * - one `CarFsm` per car, named `car-<id>`
 * - `reoptimizer`, re-scoring tracked hall calls periodically
 * - `broadcaster`, fanning diff-gated state frames out to subscribers
 */

/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use super::error::{ApiError, ApiResult};
use super::models::{
    BuildingRequest, CarCallRequest, HallCallRequest, HallCallResponse, StatusResponse,
};
use crate::broadcaster::{BroadcastHandle, Broadcaster};
use crate::car::CarFsm;
use crate::config::{BuildingConfig, CarConfig, DispatchConfig};
use crate::dispatcher::{Dispatcher, Reoptimizer};
use crate::shared::{CarSnapshot, StateFrame};

/***************************************/
/*             Public API              */
/***************************************/
pub struct ElevatorService {
    car_config: CarConfig,
    dispatch_config: DispatchConfig,
    building: Mutex<Option<Building>>,
}

/// One running bank and the plumbing to tear it down.
struct Building {
    dispatcher: Arc<Dispatcher>,
    broadcast: BroadcastHandle,
    terminate_txs: Vec<cbc::Sender<()>>,
    threads: Vec<JoinHandle<()>>,
}

impl ElevatorService {
    pub fn new(car_config: CarConfig, dispatch_config: DispatchConfig) -> ElevatorService {
        ElevatorService {
            car_config,
            dispatch_config,
            building: Mutex::new(None),
        }
    }

    /// Tear down the current bank (if any) and start a new one.
    pub fn reconfigure_building(&self, request: &BuildingRequest) -> ApiResult<()> {
        if request.total_floors < 2 || request.car_count < 1 {
            return Err(ApiError::InvalidBuilding);
        }

        let mut slot = self.building.lock();
        if let Some(old) = slot.take() {
            info!("shutting down old building");
            teardown(old);
        }

        info!(
            "initialising building with {} floors and {} cars",
            request.total_floors, request.car_count
        );
        *slot = Some(self.build(request));
        Ok(())
    }

    pub fn submit_hall_call(&self, request: &HallCallRequest) -> ApiResult<HallCallResponse> {
        let slot = self.building.lock();
        let building = slot.as_ref().ok_or(ApiError::NotInitialised)?;
        let total_floors = building.dispatcher.total_floors();
        if request.floor < 0 || request.floor >= total_floors {
            return Err(ApiError::FloorOutOfRange {
                floor: request.floor,
                total_floors,
            });
        }

        let assigned_car_id = building
            .dispatcher
            .submit_hall_call(request.floor, request.direction.as_direction());
        Ok(HallCallResponse { assigned_car_id })
    }

    pub fn submit_car_call(&self, request: &CarCallRequest) -> ApiResult<()> {
        let slot = self.building.lock();
        let building = slot.as_ref().ok_or(ApiError::NotInitialised)?;
        let total_floors = building.dispatcher.total_floors();
        let car_count = building.dispatcher.car_count();
        if request.car_id >= car_count {
            return Err(ApiError::CarOutOfRange {
                car_id: request.car_id,
                car_count,
            });
        }
        if request.floor < 0 || request.floor >= total_floors {
            return Err(ApiError::FloorOutOfRange {
                floor: request.floor,
                total_floors,
            });
        }

        building.dispatcher.submit_car_call(request.car_id, request.floor);
        Ok(())
    }

    pub fn get_status(&self) -> ApiResult<StatusResponse> {
        let slot = self.building.lock();
        let building = slot.as_ref().ok_or(ApiError::NotInitialised)?;
        Ok(StatusResponse {
            total_floors: building.dispatcher.total_floors(),
            car_count: building.dispatcher.car_count(),
            cars: building.dispatcher.status(),
        })
    }

    /// Attach an observer to the push channel.
    pub fn subscribe(&self) -> ApiResult<cbc::Receiver<StateFrame>> {
        let slot = self.building.lock();
        let building = slot.as_ref().ok_or(ApiError::NotInitialised)?;
        Ok(building.broadcast.subscribe())
    }

    /// Stop the bank for good (process shutdown).
    pub fn shutdown(&self) {
        if let Some(building) = self.building.lock().take() {
            teardown(building);
        }
    }

    /***************************************/
    /*          Local functions            */
    /***************************************/

    fn build(&self, request: &BuildingRequest) -> Building {
        let building_config = BuildingConfig {
            total_floors: request.total_floors,
            car_count: request.car_count,
        };
        let dispatcher = Arc::new(Dispatcher::new(
            &building_config,
            &self.car_config,
            self.dispatch_config,
        ));

        let (state_tx, state_rx) = cbc::unbounded::<CarSnapshot>();
        let mut terminate_txs = Vec::new();
        let mut threads = Vec::new();

        for (car_id, car) in dispatcher.cars().iter().enumerate() {
            let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
            let fsm = CarFsm::new(
                Arc::clone(car),
                self.car_config.tick_ms,
                state_tx.clone(),
                terminate_rx,
            );
            let handle = Builder::new()
                .name(format!("car-{}", car_id))
                .spawn(move || fsm.run())
                .unwrap();
            terminate_txs.push(terminate_tx);
            threads.push(handle);
        }

        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
        let reoptimizer = Reoptimizer::new(Arc::clone(&dispatcher), terminate_rx);
        let handle = Builder::new()
            .name("reoptimizer".into())
            .spawn(move || reoptimizer.run())
            .unwrap();
        terminate_txs.push(terminate_tx);
        threads.push(handle);

        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
        let (broadcaster, broadcast) =
            Broadcaster::new(request.total_floors, state_rx, terminate_rx);
        let handle = Builder::new()
            .name("broadcaster".into())
            .spawn(move || broadcaster.run())
            .unwrap();
        terminate_txs.push(terminate_tx);
        threads.push(handle);

        Building {
            dispatcher,
            broadcast,
            terminate_txs,
            threads,
        }
    }
}

impl Drop for ElevatorService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn teardown(building: Building) {
    for terminate_tx in &building.terminate_txs {
        let _ = terminate_tx.send(());
    }
    for thread in building.threads {
        if thread.join().is_err() {
            error!("building thread panicked during teardown");
        }
    }
    drop(building.dispatcher);
}
