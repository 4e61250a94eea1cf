/**
 * Button indicator state for one car.
 *
 * Three sets mirror the three button kinds: destinations selected inside the
 * car, and up/down hall buttons assigned to this car. The dispatcher lights
 * indicators when it files a request and moves them on migration; the car
 * clears them through `reconcile` as requests are serviced.
 *
 * Reconciliation is deliberately asymmetric. The internal set is synced
 * against the internal queues in full (a car call exists nowhere else). The
 * external sets are only reconciled at the car's current floor: a hall call
 * can legitimately sit in a queue whose nominal direction differs from the
 * button that raised it, so clearing away from the car would extinguish
 * buttons that are still owed service. In both cases the active target keeps
 * its own indicator lit while the car is in flight.
 */

/***************************************/
/*           Local modules             */
/***************************************/
use crate::scheduler::{Stop, StopClass, StopScheduler};
use crate::shared::Direction;
use std::collections::BTreeSet;

/***************************************/
/*             Public API              */
/***************************************/
#[derive(Debug, Default, Clone)]
pub struct UiPanel {
    internal: BTreeSet<i32>,
    external_up: BTreeSet<i32>,
    external_down: BTreeSet<i32>,
}

impl UiPanel {
    pub fn new() -> UiPanel {
        UiPanel::default()
    }

    pub fn note_car_call(&mut self, floor: i32) {
        self.internal.insert(floor);
    }

    pub fn note_hall_call(&mut self, floor: i32, wants: Direction) {
        match wants {
            Direction::Up => {
                self.external_up.insert(floor);
            }
            Direction::Down => {
                self.external_down.insert(floor);
            }
            Direction::Idle => {}
        }
    }

    /// Migration took the request away from this car.
    pub fn clear_hall_call(&mut self, floor: i32, wants: Direction) {
        match wants {
            Direction::Up => {
                self.external_up.remove(&floor);
            }
            Direction::Down => {
                self.external_down.remove(&floor);
            }
            Direction::Idle => {}
        }
    }

    pub fn has_internal(&self, floor: i32) -> bool {
        self.internal.contains(&floor)
    }

    pub fn has_external(&self, floor: i32, wants: Direction) -> bool {
        match wants {
            Direction::Up => self.external_up.contains(&floor),
            Direction::Down => self.external_down.contains(&floor),
            Direction::Idle => false,
        }
    }

    /// Drop indicators that no live request backs any more.
    pub fn reconcile(&mut self, current_floor: i32, scheduler: &StopScheduler, active: Option<Stop>) {
        let active_internal = match active {
            Some(stop) if stop.class == StopClass::Internal => Some(stop.floor),
            _ => None,
        };
        self.internal
            .retain(|f| scheduler.internal_contains(*f) || Some(*f) == active_internal);

        let up_active = matches!(
            active,
            Some(stop) if stop.floor == current_floor && stop.class == StopClass::HallUp
        );
        if !scheduler.up_hall_contains(current_floor) && !up_active {
            self.external_up.remove(&current_floor);
        }

        let down_active = matches!(
            active,
            Some(stop) if stop.floor == current_floor && stop.class == StopClass::HallDown
        );
        if !scheduler.down_hall_contains(current_floor) && !down_active {
            self.external_down.remove(&current_floor);
        }
    }

    pub fn internal_floors(&self) -> Vec<i32> {
        self.internal.iter().copied().collect()
    }

    pub fn external_up_floors(&self) -> Vec<i32> {
        self.external_up.iter().copied().collect()
    }

    pub fn external_down_floors(&self) -> Vec<i32> {
        self.external_down.iter().copied().collect()
    }

    pub fn is_all_clear(&self) -> bool {
        self.internal.is_empty() && self.external_up.is_empty() && self.external_down.is_empty()
    }
}
