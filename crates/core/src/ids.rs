//! Time-based element ids.

use doc_model::ElementId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Issues milliseconds-since-epoch ids, bumped so every id is strictly
/// greater than anything issued or observed before.
#[derive(Debug, Clone)]
pub struct ElementIdGenerator {
    last: u64,
    clock: fn() -> u64,
}

impl Default for ElementIdGenerator {
    fn default() -> Self {
        Self::with_clock(unix_millis)
    }
}

impl ElementIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: fn() -> u64) -> Self {
        Self { last: 0, clock }
    }

    pub fn next_id(&mut self) -> ElementId {
        let id = (self.clock)().max(self.last.saturating_add(1));
        self.last = id;
        ElementId(id)
    }

    /// Account for ids that came from elsewhere (a loaded list).
    pub fn observe(&mut self, id: ElementId) {
        self.last = self.last.max(id.0);
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen() -> u64 {
        1_700_000_000_000
    }

    #[test]
    fn ids_increase_even_when_clock_stalls() {
        let mut ids = ElementIdGenerator::with_clock(frozen);
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();

        assert_eq!(a, ElementId(frozen()));
        assert!(a < b && b < c);
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let mut ids = ElementIdGenerator::with_clock(frozen);
        ids.observe(ElementId(frozen() + 50));

        assert_eq!(ids.next_id(), ElementId(frozen() + 51));
    }

    #[test]
    fn system_clock_ids_are_positive() {
        let mut ids = ElementIdGenerator::new();
        assert!(ids.next_id().0 > 0);
    }
}
