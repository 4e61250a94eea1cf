/**
 * Diff-gated fan-out of car state to observers.
 *
 * Every car publishes a snapshot once per tick, unconditionally; this thread
 * is the one place that decides whether anything actually changed. A
 * snapshot identical to the previous one from the same car is dropped.
 * An accepted change produces a full `state_update` frame (all cars, plus a
 * monotonic timestamp) delivered to every subscriber. Subscribers are plain
 * channel receivers: one that has gone away fails its send and is removed,
 * nothing else notices.
 *
 * `BroadcastHandle` is the subscription side, shared with the boundary
 * adapter: `subscribe` registers a new receiver and immediately hands it the
 * current frame so a fresh observer never starts blind.
 */

/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{CarSnapshot, StateFrame};

/***************************************/
/*             Public API              */
/***************************************/
#[derive(Clone)]
pub struct BroadcastHandle {
    subscribers: Arc<Mutex<Vec<cbc::Sender<StateFrame>>>>,
    latest: Arc<Mutex<HashMap<usize, CarSnapshot>>>,
    total_floors: i32,
    started: Instant,
}

impl BroadcastHandle {
    /// Register an observer. The current frame is delivered immediately;
    /// further frames arrive on every state change.
    pub fn subscribe(&self) -> cbc::Receiver<StateFrame> {
        let (tx, rx) = cbc::unbounded::<StateFrame>();
        // Registration and delivery are serialised with the broadcast loop
        // so the connect frame is never newer than the next update.
        let mut subscribers = self.subscribers.lock();
        let _ = tx.send(self.current_frame());
        subscribers.push(tx);
        rx
    }

    pub fn current_frame(&self) -> StateFrame {
        let latest = self.latest.lock();
        let mut cars: Vec<CarSnapshot> = latest.values().cloned().collect();
        cars.sort_by_key(|car| car.car_id);
        StateFrame::new(
            self.total_floors,
            cars,
            self.started.elapsed().as_secs_f64(),
        )
    }
}

pub struct Broadcaster {
    handle: BroadcastHandle,
    state_rx: cbc::Receiver<CarSnapshot>,
    terminate_rx: cbc::Receiver<()>,
}

impl Broadcaster {
    pub fn new(
        total_floors: i32,
        state_rx: cbc::Receiver<CarSnapshot>,
        terminate_rx: cbc::Receiver<()>,
    ) -> (Broadcaster, BroadcastHandle) {
        let handle = BroadcastHandle {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            latest: Arc::new(Mutex::new(HashMap::new())),
            total_floors,
            started: Instant::now(),
        };
        (
            Broadcaster {
                handle: handle.clone(),
                state_rx,
                terminate_rx,
            },
            handle,
        )
    }

    pub fn run(self) {
        loop {
            cbc::select! {
                recv(self.state_rx) -> msg => {
                    match msg {
                        Ok(snapshot) => self.handle_snapshot(snapshot),
                        // Every car thread is gone; nothing further can arrive.
                        Err(_) => break,
                    }
                }
                recv(self.terminate_rx) -> _ => {
                    break;
                }
            }
        }
    }

    /***************************************/
    /*          Local functions            */
    /***************************************/

    fn handle_snapshot(&self, snapshot: CarSnapshot) {
        let changed = {
            let mut latest = self.handle.latest.lock();
            let unchanged = latest
                .get(&snapshot.car_id)
                .map_or(false, |previous| *previous == snapshot);
            if !unchanged {
                latest.insert(snapshot.car_id, snapshot);
            }
            !unchanged
        };
        if !changed {
            return;
        }

        let frame = self.handle.current_frame();
        let mut subscribers = self.handle.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(frame.clone()).is_ok());
        if subscribers.len() < before {
            debug!("dropped {} dead subscriber(s)", before - subscribers.len());
        }
    }
}
