/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::RequestId;
use std::collections::BTreeMap;

/***************************************/
/*             Public API              */
/***************************************/
/// Ordered set of pending floors, each tagged with the id of the request that
/// put it there. Duplicate floors are not stored; re-inserting a floor
/// replaces its id so the newest request wins. Backs each of the six
/// scheduler queues.
#[derive(Debug, Default, Clone)]
pub struct FloorIndex {
    by_floor: BTreeMap<i32, RequestId>,
}

impl FloorIndex {
    pub fn new() -> FloorIndex {
        FloorIndex {
            by_floor: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, floor: i32, id: RequestId) {
        self.by_floor.insert(floor, id);
    }

    pub fn contains(&self, floor: i32) -> bool {
        self.by_floor.contains_key(&floor)
    }

    pub fn id_at(&self, floor: i32) -> Option<RequestId> {
        self.by_floor.get(&floor).copied()
    }

    /// Linear scan; only the re-optimizer removes by id, at low frequency.
    pub fn remove_by_id(&mut self, id: RequestId) -> Option<i32> {
        let floor = self
            .by_floor
            .iter()
            .find(|(_, stored)| **stored == id)
            .map(|(floor, _)| *floor)?;
        self.by_floor.remove(&floor);
        Some(floor)
    }

    pub fn peek_min(&self) -> Option<(i32, RequestId)> {
        self.by_floor.first_key_value().map(|(f, id)| (*f, *id))
    }

    pub fn peek_max(&self) -> Option<(i32, RequestId)> {
        self.by_floor.last_key_value().map(|(f, id)| (*f, *id))
    }

    pub fn pop_min(&mut self) -> Option<(i32, RequestId)> {
        self.by_floor.pop_first()
    }

    pub fn pop_max(&mut self) -> Option<(i32, RequestId)> {
        self.by_floor.pop_last()
    }

    pub fn min_floor(&self) -> Option<i32> {
        self.peek_min().map(|(f, _)| f)
    }

    pub fn max_floor(&self) -> Option<i32> {
        self.peek_max().map(|(f, _)| f)
    }

    /// Number of stored floors in `[lo, hi]` inclusive; zero when `lo > hi`.
    pub fn count_in_range(&self, lo: i32, hi: i32) -> usize {
        if lo > hi {
            return 0;
        }
        self.by_floor.range(lo..=hi).count()
    }

    pub fn floors(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_floor.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_floor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_floor.is_empty()
    }
}
