/**
 * Per-car stop scheduling under LOOK with directional hall-call discipline.
 *
 * Pending stops are partitioned into six queues by "direction of travel when
 * the stop becomes serviceable" crossed with "direction the passenger asked
 * for":
 *
 * - `internal_up` / `internal_down`:  car calls above / below the car.
 * - `up_up`:    hall calls at or above the car, passenger going UP.
 * - `up_down`:  hall calls picked up at the apex of an UP sweep, passenger
 *               going DOWN. Also receives calls a DOWN-moving car has left
 *               above itself.
 * - `down_down` / `down_up`: the mirror images.
 *
 * Selection walks the current sweep to its extremum before reversing:
 * while travelling UP the nearest floor among `internal_up`, `up_up` and any
 * still-reachable missed `down_up` entry is served first; when the UP side is
 * exhausted the highest `up_down` entry is popped and serviced as a DOWN
 * request; only then does the sweep flip. Ties on the same floor are resolved
 * internal before external before missed.
 *
 * The scheduler holds no reference to its owning car: callers pass the car's
 * position and a direction handle. `pop_next` commits sweep flips to that
 * handle; `peek_next` evaluates flips locally so an in-flight car can probe
 * for interruptions without being reversed.
 */

/***************************************/
/*           Local modules             */
/***************************************/
use super::floor_index::FloorIndex;
use crate::shared::{Direction, Position, RequestId};

/***************************************/
/*               Enums                 */
/***************************************/
/// Which kind of button a stop answers to. Drives indicator reconciliation
/// and re-queueing of an interrupted target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopClass {
    Internal,
    HallUp,
    HallDown,
}

/// Outcome of inserting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// Entered a queue under the given id.
    Queued(RequestId),
    /// The request is for the car's exact current position; the caller
    /// should open the door instead of queueing anything.
    AtFloor,
}

/// A stop handed to the car: where to go, which direction the service
/// counts as, and the identity it carried in its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub floor: i32,
    pub direction: Direction,
    pub class: StopClass,
    pub id: RequestId,
}

/// Internal name for a queue a selected candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queue {
    InternalUp,
    InternalDown,
    UpUp,
    UpDown,
    DownDown,
    DownUp,
}

const PRIO_INTERNAL: u8 = 0;
const PRIO_EXTERNAL: u8 = 1;
const PRIO_MISSED: u8 = 2;

/***************************************/
/*             Public API              */
/***************************************/
#[derive(Debug, Default, Clone)]
pub struct StopScheduler {
    internal_up: FloorIndex,
    internal_down: FloorIndex,
    up_up: FloorIndex,
    up_down: FloorIndex,
    down_down: FloorIndex,
    down_up: FloorIndex,
}

impl StopScheduler {
    pub fn new() -> StopScheduler {
        StopScheduler::default()
    }

    /// Classify a hall call against the car's effective direction and file it
    /// into the matching queue.
    pub fn add_hall_call(
        &mut self,
        position: Position,
        effective: Direction,
        floor: i32,
        wants: Direction,
        id: RequestId,
    ) -> Classified {
        match effective {
            Direction::Idle => {
                if position.is_below(floor) {
                    if wants == Direction::Up {
                        self.up_up.insert(floor, id);
                    } else {
                        self.up_down.insert(floor, id);
                    }
                } else if position.is_above(floor) {
                    if wants == Direction::Down {
                        self.down_down.insert(floor, id);
                    } else {
                        self.down_up.insert(floor, id);
                    }
                } else {
                    return Classified::AtFloor;
                }
            }
            Direction::Up => {
                // Floors at or above the car ride this sweep; anything below
                // was missed and waits for the return.
                if !position.is_above(floor) {
                    if wants == Direction::Up {
                        self.up_up.insert(floor, id);
                    } else {
                        self.up_down.insert(floor, id);
                    }
                } else {
                    self.down_up.insert(floor, id);
                }
            }
            Direction::Down => {
                if !position.is_below(floor) {
                    if wants == Direction::Down {
                        self.down_down.insert(floor, id);
                    } else {
                        self.down_up.insert(floor, id);
                    }
                } else {
                    self.up_down.insert(floor, id);
                }
            }
        }
        Classified::Queued(id)
    }

    /// File a car call. A call for the exact current position never queues.
    pub fn add_car_call(&mut self, position: Position, floor: i32, id: RequestId) -> Classified {
        if position.is_below(floor) {
            self.internal_up.insert(floor, id);
        } else if position.is_above(floor) {
            self.internal_down.insert(floor, id);
        } else {
            return Classified::AtFloor;
        }
        Classified::Queued(id)
    }

    /// Consume the next stop. Commits any sweep flip to `direction`.
    pub fn pop_next(&mut self, position: Position, direction: &mut Direction) -> Option<Stop> {
        loop {
            match *direction {
                Direction::Up => {
                    if let Some((floor, _, queue)) = self.best_up(position) {
                        let (_, id) = self.pop_queue(queue)?;
                        return Some(Stop {
                            floor,
                            direction: Direction::Up,
                            class: class_of(queue),
                            id,
                        });
                    }
                    // Sweep apex: highest waiting DOWN passenger.
                    if let Some((floor, id)) = self.up_down.pop_max() {
                        return Some(Stop {
                            floor,
                            direction: Direction::Down,
                            class: StopClass::HallDown,
                            id,
                        });
                    }
                    if self.down_side_pending() {
                        *direction = Direction::Down;
                        continue;
                    }
                    return None;
                }
                Direction::Down => {
                    if let Some((floor, _, queue)) = self.best_down(position) {
                        let (_, id) = self.pop_queue(queue)?;
                        return Some(Stop {
                            floor,
                            direction: Direction::Down,
                            class: class_of(queue),
                            id,
                        });
                    }
                    if let Some((floor, id)) = self.down_up.pop_min() {
                        return Some(Stop {
                            floor,
                            direction: Direction::Up,
                            class: StopClass::HallUp,
                            id,
                        });
                    }
                    if self.up_side_pending() {
                        *direction = Direction::Up;
                        continue;
                    }
                    return None;
                }
                Direction::Idle => {
                    if let Some(dir) = self.idle_start_direction() {
                        *direction = dir;
                        continue;
                    }
                    return None;
                }
            }
        }
    }

    /// Inspect the next stop without consuming it or committing a flip.
    pub fn peek_next(&self, position: Position, direction: Direction) -> Option<(i32, Direction)> {
        let mut dir = direction;
        loop {
            match dir {
                Direction::Up => {
                    if let Some((floor, _, _)) = self.best_up(position) {
                        return Some((floor, Direction::Up));
                    }
                    if let Some((floor, _)) = self.up_down.peek_max() {
                        return Some((floor, Direction::Down));
                    }
                    if self.down_side_pending() {
                        dir = Direction::Down;
                        continue;
                    }
                    return None;
                }
                Direction::Down => {
                    if let Some((floor, _, _)) = self.best_down(position) {
                        return Some((floor, Direction::Down));
                    }
                    if let Some((floor, _)) = self.down_up.peek_min() {
                        return Some((floor, Direction::Up));
                    }
                    if self.up_side_pending() {
                        dir = Direction::Up;
                        continue;
                    }
                    return None;
                }
                Direction::Idle => match self.idle_start_direction() {
                    Some(d) => {
                        dir = d;
                        continue;
                    }
                    None => return None,
                },
            }
        }
    }

    /// Remove a hall call by identity, searching the four external queues.
    /// Returns the floor and the request's nominal direction so the caller
    /// can clear the matching indicator. Car-call queues are never searched;
    /// car calls do not migrate.
    pub fn remove_by_id(&mut self, id: RequestId) -> Option<(i32, Direction)> {
        if let Some(floor) = self.up_up.remove_by_id(id) {
            return Some((floor, Direction::Up));
        }
        if let Some(floor) = self.down_down.remove_by_id(id) {
            return Some((floor, Direction::Down));
        }
        // The request itself is DOWN even while the car travels UP to reach
        // it, and vice versa.
        if let Some(floor) = self.up_down.remove_by_id(id) {
            return Some((floor, Direction::Down));
        }
        if let Some(floor) = self.down_up.remove_by_id(id) {
            return Some((floor, Direction::Up));
        }
        None
    }

    /***************************************/
    /*        Queries for callers          */
    /***************************************/

    pub fn lowest_stop(&self) -> Option<i32> {
        self.all_queues().filter_map(|q| q.min_floor()).min()
    }

    pub fn highest_stop(&self) -> Option<i32> {
        self.all_queues().filter_map(|q| q.max_floor()).max()
    }

    pub fn total_stops(&self) -> usize {
        self.all_queues().map(|q| q.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.all_queues().all(|q| q.is_empty())
    }

    /// Scheduled stops in `[lo, hi]` that an UP-travelling car would service.
    pub fn count_up_serving_in(&self, lo: i32, hi: i32) -> usize {
        self.internal_up.count_in_range(lo, hi) + self.up_up.count_in_range(lo, hi)
    }

    pub fn count_down_serving_in(&self, lo: i32, hi: i32) -> usize {
        self.internal_down.count_in_range(lo, hi) + self.down_down.count_in_range(lo, hi)
    }

    /// Id of a pending hall call for `(floor, wants)`, wherever it is queued.
    pub fn hall_id_at(&self, floor: i32, wants: Direction) -> Option<RequestId> {
        match wants {
            Direction::Up => self.up_up.id_at(floor).or_else(|| self.down_up.id_at(floor)),
            Direction::Down => self
                .down_down
                .id_at(floor)
                .or_else(|| self.up_down.id_at(floor)),
            Direction::Idle => None,
        }
    }

    pub fn up_hall_contains(&self, floor: i32) -> bool {
        self.up_up.contains(floor) || self.down_up.contains(floor)
    }

    pub fn down_hall_contains(&self, floor: i32) -> bool {
        self.down_down.contains(floor) || self.up_down.contains(floor)
    }

    pub fn internal_contains(&self, floor: i32) -> bool {
        self.internal_up.contains(floor) || self.internal_down.contains(floor)
    }

    pub fn internal_floors(&self) -> impl Iterator<Item = i32> + '_ {
        self.internal_up.floors().chain(self.internal_down.floors())
    }

    /***************************************/
    /*          Local functions            */
    /***************************************/

    /// Nearest serviceable stop above (or at) the car: smallest floor among
    /// `internal_up`, `up_up` and any missed `down_up` entry still strictly
    /// above the car. Ties prefer internal, then external, then missed.
    fn best_up(&self, position: Position) -> Option<(i32, u8, Queue)> {
        let mut best: Option<(i32, u8, Queue)> = None;
        let mut consider = |cand: (i32, u8, Queue), best: &mut Option<(i32, u8, Queue)>| {
            let replace = match best {
                None => true,
                Some((bf, bp, _)) => cand.0 < *bf || (cand.0 == *bf && cand.1 < *bp),
            };
            if replace {
                *best = Some(cand);
            }
        };

        if let Some((f, _)) = self.internal_up.peek_min() {
            consider((f, PRIO_INTERNAL, Queue::InternalUp), &mut best);
        }
        if let Some((f, _)) = self.up_up.peek_min() {
            consider((f, PRIO_EXTERNAL, Queue::UpUp), &mut best);
        }
        if let Some((f, _)) = self.down_up.peek_min() {
            if position.is_below(f) {
                consider((f, PRIO_MISSED, Queue::DownUp), &mut best);
            }
        }
        best
    }

    /// Mirror of `best_up`: largest floor wins, ties by priority class.
    fn best_down(&self, position: Position) -> Option<(i32, u8, Queue)> {
        let mut best: Option<(i32, u8, Queue)> = None;
        let mut consider = |cand: (i32, u8, Queue), best: &mut Option<(i32, u8, Queue)>| {
            let replace = match best {
                None => true,
                Some((bf, bp, _)) => cand.0 > *bf || (cand.0 == *bf && cand.1 < *bp),
            };
            if replace {
                *best = Some(cand);
            }
        };

        if let Some((f, _)) = self.internal_down.peek_max() {
            consider((f, PRIO_INTERNAL, Queue::InternalDown), &mut best);
        }
        if let Some((f, _)) = self.down_down.peek_max() {
            consider((f, PRIO_EXTERNAL, Queue::DownDown), &mut best);
        }
        if let Some((f, _)) = self.up_down.peek_max() {
            if position.is_above(f) {
                consider((f, PRIO_MISSED, Queue::UpDown), &mut best);
            }
        }
        best
    }

    /// Starting direction for an idle car, external classes first, then car
    /// calls so a lone internal stop can never strand the car.
    fn idle_start_direction(&self) -> Option<Direction> {
        if !self.up_up.is_empty() {
            return Some(Direction::Up);
        }
        if !self.down_down.is_empty() {
            return Some(Direction::Down);
        }
        if !self.up_down.is_empty() {
            return Some(Direction::Up);
        }
        if !self.down_up.is_empty() {
            return Some(Direction::Down);
        }
        if !self.internal_up.is_empty() {
            return Some(Direction::Up);
        }
        if !self.internal_down.is_empty() {
            return Some(Direction::Down);
        }
        None
    }

    fn down_side_pending(&self) -> bool {
        !self.down_down.is_empty() || !self.down_up.is_empty() || !self.internal_down.is_empty()
    }

    fn up_side_pending(&self) -> bool {
        !self.up_up.is_empty() || !self.up_down.is_empty() || !self.internal_up.is_empty()
    }

    fn pop_queue(&mut self, queue: Queue) -> Option<(i32, RequestId)> {
        match queue {
            Queue::InternalUp => self.internal_up.pop_min(),
            Queue::UpUp => self.up_up.pop_min(),
            Queue::DownUp => self.down_up.pop_min(),
            Queue::InternalDown => self.internal_down.pop_max(),
            Queue::DownDown => self.down_down.pop_max(),
            Queue::UpDown => self.up_down.pop_max(),
        }
    }

    fn all_queues(&self) -> impl Iterator<Item = &FloorIndex> {
        [
            &self.internal_up,
            &self.internal_down,
            &self.up_up,
            &self.up_down,
            &self.down_down,
            &self.down_up,
        ]
        .into_iter()
    }
}

fn class_of(queue: Queue) -> StopClass {
    match queue {
        Queue::InternalUp | Queue::InternalDown => StopClass::Internal,
        Queue::UpUp | Queue::DownUp => StopClass::HallUp,
        Queue::DownDown | Queue::UpDown => StopClass::HallDown,
    }
}

/***************************************/
/*              Test API               */
/***************************************/
#[cfg(test)]
pub mod testing {
    use super::StopScheduler;
    use crate::scheduler::floor_index::FloorIndex;

    impl StopScheduler {
        // Publicly expose the queues for testing
        pub fn test_internal_up(&self) -> &FloorIndex {
            &self.internal_up
        }

        pub fn test_internal_down(&self) -> &FloorIndex {
            &self.internal_down
        }

        pub fn test_up_up(&self) -> &FloorIndex {
            &self.up_up
        }

        pub fn test_up_down(&self) -> &FloorIndex {
            &self.up_down
        }

        pub fn test_down_down(&self) -> &FloorIndex {
            &self.down_down
        }

        pub fn test_down_up(&self) -> &FloorIndex {
            &self.down_up
        }
    }
}
