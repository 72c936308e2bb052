//! Marker Cache
//!
//! Heard-but-unseen positions from the last listener pass. The cache is
//! replaced wholesale on every pass, never patched.

use std::collections::BTreeMap;

use sound_events::{Marker, Tripoint};

#[derive(Debug, Default, Clone)]
pub struct MarkerCache {
    markers: BTreeMap<Tripoint, Marker>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker unless its tile already holds one.
    pub fn place(&mut self, marker: Marker) -> bool {
        if self.markers.contains_key(&marker.position) {
            return false;
        }
        self.markers.insert(marker.position, marker);
        true
    }

    /// Swaps in the markers built by a finished pass.
    pub fn replace(&mut self, other: MarkerCache) {
        self.markers = other.markers;
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Markers ordered by position.
    pub fn markers(&self) -> Vec<Marker> {
        self.markers.values().cloned().collect()
    }

    pub fn positions(&self) -> Vec<Tripoint> {
        self.markers.keys().copied().collect()
    }

    /// Description of the marker at `position`, "a sound" if it has none.
    pub fn description_at(&self, position: Tripoint) -> Option<String> {
        self.markers
            .get(&position)
            .map(|marker| marker.label().to_string())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_marker_on_a_tile_wins() {
        let mut cache = MarkerCache::new();
        let p = Tripoint::new(3, 4, 0);

        assert!(cache.place(Marker::new(p, "a scream")));
        assert!(!cache.place(Marker::new(p, "a gunshot")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.description_at(p), Some("a scream".to_string()));
    }

    #[test]
    fn test_description_fallback() {
        let mut cache = MarkerCache::new();
        let p = Tripoint::new(0, 0, 0);
        cache.place(Marker::new(p, ""));

        assert_eq!(cache.description_at(p), Some("a sound".to_string()));
        assert_eq!(cache.description_at(Tripoint::new(1, 0, 0)), None);
    }

    #[test]
    fn test_replace_discards_old_markers() {
        let mut cache = MarkerCache::new();
        cache.place(Marker::new(Tripoint::new(1, 1, 0), "old"));

        let mut next = MarkerCache::new();
        next.place(Marker::new(Tripoint::new(2, 2, 0), "new"));
        cache.replace(next);

        assert_eq!(cache.positions(), vec![Tripoint::new(2, 2, 0)]);
        assert!(cache.description_at(Tripoint::new(1, 1, 0)).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
