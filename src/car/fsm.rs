/**
 * Per-car state machine and its driving thread.
 *
 * `CarCore` holds everything one car owns: physical state (position in
 * substeps, travel direction, door), its stop scheduler, its button panel and
 * the stop it is currently flying toward. All behaviour is packed into the
 * synchronous `tick` function so tests can drive simulated time directly;
 * `CarFsm` is the thin thread wrapper that calls `tick` once per tick period
 * and publishes a state snapshot, until told to terminate.
 *
 * One tick performs, in order:
 * 1. Indicator reconciliation (serviced buttons go dark within one tick).
 * 2. Door handling: count down the dwell, then close. The car never moves
 *    with the door open.
 * 3. Target selection when the car has none: pop the next stop, or go idle.
 *    A stop at the resting floor becomes an immediate arrival.
 * 4. Motion: if a newly queued stop now lies strictly between the car and
 *    its target in the direction of travel, the car consumes it and re-files
 *    the old target under whatever buttons still want it. Then one substep
 *    of movement, and the arrival handling (door, indicators, the
 *    double-stop guard for a floor requested through two buttons at once).
 *
 * The dispatcher talks to the same `CarCore` through its mutex; every
 * mutation either side makes is therefore serialised, and a tick observes a
 * consistent snapshot.
 *
 * # Fields
 * - `position`:          Car position in integer substeps of a floor.
 * - `direction`:         Commanded travel direction; `Idle` when parked.
 * - `moving_direction`:  Last non-idle direction, reported while the door is
 *                        open so arrivals keep their sweep direction.
 * - `door_open` / `door_ticks_left`: door state and remaining dwell.
 * - `scheduler`:         Six-queue LOOK stop scheduler.
 * - `ui`:                Button indicator sets published with each snapshot.
 * - `active`:            The stop the car is currently travelling toward.
 */

/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use super::ui_panel::UiPanel;
use crate::config::CarConfig;
use crate::scheduler::{Classified, Stop, StopClass, StopScheduler};
use crate::shared::{CarSnapshot, Direction, Position, RequestId};

/***************************************/
/*               Enums                 */
/***************************************/
/// What happened to a submitted hall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HallCallOutcome {
    /// Filed into a queue under this id.
    Queued(RequestId),
    /// The car was resting at the requested floor; the door opened instead.
    DoorOpened,
}

/***************************************/
/*             Public API              */
/***************************************/
pub struct CarCore {
    id: usize,
    position: Position,
    direction: Direction,
    moving_direction: Direction,
    door_open: bool,
    door_ticks_left: u32,
    door_open_ticks: u32,
    scheduler: StopScheduler,
    ui: UiPanel,
    active: Option<Stop>,
}

impl CarCore {
    pub fn new(id: usize, config: &CarConfig) -> CarCore {
        CarCore {
            id,
            position: Position::at_floor(0, config.substeps_per_floor),
            direction: Direction::Idle,
            moving_direction: Direction::Idle,
            door_open: false,
            door_ticks_left: 0,
            door_open_ticks: config.door_open_ticks,
            scheduler: StopScheduler::new(),
            ui: UiPanel::new(),
            active: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn door_open(&self) -> bool {
        self.door_open
    }

    pub fn scheduler(&self) -> &StopScheduler {
        &self.scheduler
    }

    pub fn ui(&self) -> &UiPanel {
        &self.ui
    }

    pub fn active_target(&self) -> Option<Stop> {
        self.active
    }

    /// Travel direction, or the arrival direction while the door is open.
    pub fn effective_direction(&self) -> Direction {
        if self.direction != Direction::Idle {
            return self.direction;
        }
        if self.door_open {
            return self.moving_direction;
        }
        Direction::Idle
    }

    /***************************************/
    /*        Dispatcher interface         */
    /***************************************/

    /// File a hall call with this car. The indicator lights immediately; the
    /// call is serviced on the spot if the car is resting at the floor.
    pub fn submit_hall_call(&mut self, floor: i32, wants: Direction) -> HallCallOutcome {
        self.ui.note_hall_call(floor, wants);
        let id = RequestId::next();
        match self
            .scheduler
            .add_hall_call(self.position, self.effective_direction(), floor, wants, id)
        {
            Classified::Queued(id) => HallCallOutcome::Queued(id),
            Classified::AtFloor => {
                self.open_door();
                HallCallOutcome::DoorOpened
            }
        }
    }

    pub fn submit_car_call(&mut self, floor: i32) {
        self.ui.note_car_call(floor);
        if let Classified::AtFloor = self.scheduler.add_car_call(self.position, floor, RequestId::next()) {
            self.open_door();
        }
    }

    /// Id of the pending hall call for `(floor, wants)` on this car, whether
    /// queued or currently being flown to.
    pub fn hall_call_active(&self, floor: i32, wants: Direction) -> Option<RequestId> {
        if let Some(id) = self.scheduler.hall_id_at(floor, wants) {
            return Some(id);
        }
        match self.active {
            Some(stop) if stop.floor == floor && stop.class == class_for(wants) => Some(stop.id),
            _ => None,
        }
    }

    /// Take a hall call away from this car (re-optimizer migration). Fails
    /// when the call was consumed in the meantime.
    pub fn remove_hall_call(&mut self, id: RequestId) -> Option<(i32, Direction)> {
        let (floor, direction) = self.scheduler.remove_by_id(id)?;
        self.ui.clear_hall_call(floor, direction);
        Some((floor, direction))
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            car_id: self.id,
            current_floor: self.position.as_float(),
            direction: self.effective_direction(),
            door_open: self.door_open,
            external_up_requests: self.ui.external_up_floors(),
            external_down_requests: self.ui.external_down_floors(),
            internal_requests: self.ui.internal_floors(),
        }
    }

    /// Quiescent: parked with nothing pending.
    pub fn is_settled(&self) -> bool {
        self.direction == Direction::Idle
            && !self.door_open
            && self.active.is_none()
            && self.scheduler.is_empty()
    }

    /***************************************/
    /*           Tick behaviour            */
    /***************************************/

    /// Advance the car by one unit of simulated time.
    pub fn tick(&mut self) {
        self.reconcile_ui();

        if self.door_open {
            if self.door_ticks_left > 0 {
                self.door_ticks_left -= 1;
                return;
            }
            self.door_open = false;
            debug!("car {}: door closed at floor {}", self.id, self.position.snapped());
            return;
        }

        if self.active.is_none() {
            let stop = match self.scheduler.pop_next(self.position, &mut self.direction) {
                Some(stop) => stop,
                None => {
                    self.direction = Direction::Idle;
                    return;
                }
            };
            if self.position.is_at(stop.floor) {
                // A request gathered at the resting floor during the last
                // door cycle.
                self.arrive(stop.floor);
                return;
            }
            self.direction = if self.position.is_below(stop.floor) {
                Direction::Up
            } else {
                Direction::Down
            };
            self.active = Some(stop);
            debug!(
                "car {}: heading {} to floor {} ({:?})",
                self.id, self.direction, stop.floor, stop.class
            );
        }

        self.step_toward_target();
    }

    /***************************************/
    /*          Local functions            */
    /***************************************/

    fn step_toward_target(&mut self) {
        let Some(mut target) = self.active else {
            return;
        };

        // A stop that appeared strictly between the car and its target is
        // taken first; the old target is re-filed under its buttons.
        if let Some((peeked, _)) = self.scheduler.peek_next(self.position, self.direction) {
            let intercepts = match self.direction {
                Direction::Up => self.position.is_below(peeked) && peeked < target.floor,
                Direction::Down => self.position.is_above(peeked) && peeked > target.floor,
                Direction::Idle => false,
            };
            if intercepts {
                if let Some(new_stop) = self.scheduler.pop_next(self.position, &mut self.direction) {
                    debug!(
                        "car {}: interrupting flight to {} for closer stop {}",
                        self.id, target.floor, new_stop.floor
                    );
                    self.requeue(target);
                    target = new_stop;
                    self.active = Some(new_stop);
                }
            }
        }

        self.position.advance(self.direction);
        if self.position.is_at(target.floor) {
            self.arrive(target.floor);
        }
    }

    fn arrive(&mut self, floor: i32) {
        self.position.snap_to(floor);
        if self.direction != Direction::Idle {
            self.moving_direction = self.direction;
        }
        self.active = None;
        self.door_open = true;
        self.door_ticks_left = self.door_open_ticks;
        info!("car {}: arrived at floor {}", self.id, floor);

        // Double-stop guard: the same floor requested through a second
        // button is serviced by this door cycle, not another one.
        if let Some((next, _)) = self.scheduler.peek_next(self.position, self.direction) {
            if next == floor {
                let _ = self.scheduler.pop_next(self.position, &mut self.direction);
            }
        }

        self.reconcile_ui();
    }

    fn open_door(&mut self) {
        if !self.door_open {
            self.door_open = true;
            self.door_ticks_left = self.door_open_ticks;
        }
    }

    /// Put an interrupted target back into the queue(s) its lit buttons call
    /// for. The class the stop was popped from keeps its id so the
    /// dispatcher's registry entry stays valid; floors already queued by a
    /// sibling button are left alone.
    fn requeue(&mut self, stop: Stop) {
        let effective = self.effective_direction();
        let mut queued = false;

        if self.ui.has_internal(stop.floor) {
            if !self.scheduler.internal_contains(stop.floor) {
                let id = keep_or_fresh(stop, StopClass::Internal);
                self.scheduler.add_car_call(self.position, stop.floor, id);
            }
            queued = true;
        }
        if self.ui.has_external(stop.floor, Direction::Up) {
            if self.scheduler.hall_id_at(stop.floor, Direction::Up).is_none() {
                let id = keep_or_fresh(stop, StopClass::HallUp);
                self.scheduler
                    .add_hall_call(self.position, effective, stop.floor, Direction::Up, id);
            }
            queued = true;
        }
        if self.ui.has_external(stop.floor, Direction::Down) {
            if self.scheduler.hall_id_at(stop.floor, Direction::Down).is_none() {
                let id = keep_or_fresh(stop, StopClass::HallDown);
                self.scheduler
                    .add_hall_call(self.position, effective, stop.floor, Direction::Down, id);
            }
            queued = true;
        }
        if !queued {
            let id = keep_or_fresh(stop, StopClass::Internal);
            self.scheduler.add_car_call(self.position, stop.floor, id);
        }
    }

    fn reconcile_ui(&mut self) {
        self.ui
            .reconcile(self.position.snapped(), &self.scheduler, self.active);
    }
}

fn class_for(wants: Direction) -> StopClass {
    match wants {
        Direction::Down => StopClass::HallDown,
        _ => StopClass::HallUp,
    }
}

fn keep_or_fresh(stop: Stop, class: StopClass) -> RequestId {
    if stop.class == class {
        stop.id
    } else {
        RequestId::next()
    }
}

/***************************************/
/*            Car thread               */
/***************************************/
/// Thread wrapper driving one `CarCore`: one tick per period, one snapshot
/// published per tick, until terminated.
pub struct CarFsm {
    core: Arc<Mutex<CarCore>>,
    tick_period: Duration,
    state_tx: cbc::Sender<CarSnapshot>,
    terminate_rx: cbc::Receiver<()>,
}

impl CarFsm {
    pub fn new(
        core: Arc<Mutex<CarCore>>,
        tick_ms: u64,
        state_tx: cbc::Sender<CarSnapshot>,
        terminate_rx: cbc::Receiver<()>,
    ) -> CarFsm {
        CarFsm {
            core,
            tick_period: Duration::from_millis(tick_ms),
            state_tx,
            terminate_rx,
        }
    }

    pub fn run(self) {
        loop {
            cbc::select! {
                recv(self.terminate_rx) -> _ => {
                    break;
                }
                default(self.tick_period) => {
                    let snapshot = {
                        let mut core = self.core.lock();
                        core.tick();
                        core.snapshot()
                    };
                    if self.state_tx.send(snapshot).is_err() {
                        error!("car state channel closed, stopping car thread");
                        break;
                    }
                }
            }
        }
    }
}

/***************************************/
/*              Test API               */
/***************************************/
#[cfg(test)]
pub mod testing {
    use super::CarCore;
    use crate::shared::{Direction, Position};

    impl CarCore {
        // Publicly expose the private fields for testing
        pub fn test_set_position(&mut self, floor: i32) {
            self.position = Position::at_floor(floor, self.position.scale());
        }

        pub fn test_set_direction(&mut self, direction: Direction) {
            self.direction = direction;
        }

        pub fn test_direction(&self) -> Direction {
            self.direction
        }

        pub fn test_moving_direction(&self) -> Direction {
            self.moving_direction
        }

        pub fn test_door_ticks_left(&self) -> u32 {
            self.door_ticks_left
        }
    }
}
