/**
 * Periodic re-scoring of outstanding hall calls.
 *
 * The dispatcher's initial assignment is made against a snapshot of the bank
 * that is stale the moment cars move on. This thread wakes on a fixed
 * interval and runs `Dispatcher::reoptimize_pass`, which re-prices every
 * tracked call and migrates it when another car has become enough cheaper to
 * be worth the switch. Calls close to service are dropped from tracking
 * instead, and a call consumed between scoring and removal is simply
 * forgotten — both are normal outcomes, not errors.
 */

/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use std::sync::Arc;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use super::dispatcher::Dispatcher;

/***************************************/
/*             Public API              */
/***************************************/
pub struct Reoptimizer {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    terminate_rx: cbc::Receiver<()>,
}

impl Reoptimizer {
    pub fn new(dispatcher: Arc<Dispatcher>, terminate_rx: cbc::Receiver<()>) -> Reoptimizer {
        let interval = Duration::from_millis(dispatcher.tuning().reoptimize_interval_ms);
        Reoptimizer {
            dispatcher,
            interval,
            terminate_rx,
        }
    }

    pub fn run(self) {
        loop {
            cbc::select! {
                recv(self.terminate_rx) -> _ => {
                    break;
                }
                default(self.interval) => {
                    self.dispatcher.reoptimize_pass();
                }
            }
        }
    }
}
