use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::ScheduleSlot;

/// Client-side cache of one doctor's schedule slots, keyed by date. Enforces
/// the at-most-one-slot-per-date invariant locally; membership follows the
/// last server snapshot.
#[derive(Debug, Default)]
pub struct ScheduleRegistry {
    slots: BTreeMap<NaiveDate, ScheduleSlot>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replace: the server list is the source of truth for membership.
    pub fn apply_snapshot(&mut self, snapshot: Vec<ScheduleSlot>) {
        self.slots = snapshot.into_iter().map(|s| (s.tanggal, s)).collect();
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.slots.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ScheduleSlot> {
        self.slots.get(&date)
    }

    /// Apply a server-confirmed create/update.
    pub fn upsert(&mut self, slot: ScheduleSlot) {
        self.slots.insert(slot.tanggal, slot);
    }

    /// Apply a server-confirmed delete.
    pub fn remove(&mut self, date: NaiveDate) -> Option<ScheduleSlot> {
        self.slots.remove(&date)
    }

    /// All slots ordered by date ascending.
    pub fn all(&self) -> Vec<ScheduleSlot> {
        self.slots.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
