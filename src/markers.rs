//! Map markers derived from a locator snapshot
//!
//! The map keeps its markers between snapshots. [`reconcile`] tells it which
//! ones to drop, create or restyle so that unchanged markers are left alone.

use std::collections::HashMap;

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::locator::LocatorState;
use crate::models::{Store, StoreId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub store_id: StoreId,
    pub position: GeoPoint,
    pub label: String,
    pub rentable_umbrellas_count: u32,
    /// Drawn highlighted; true for the selected store only
    pub focused: bool,
}

impl Marker {
    #[must_use]
    pub fn for_store(store: &Store, focused: bool) -> Self {
        Self {
            store_id: store.id,
            position: store.position(),
            label: store.name.clone(),
            rentable_umbrellas_count: store.rentable_umbrellas_count,
            focused,
        }
    }
}

/// Changes needed to turn one marker set into another
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDiff {
    pub removed: Vec<StoreId>,
    pub added: Vec<Marker>,
    pub updated: Vec<Marker>,
}

impl MarkerDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.updated.is_empty()
    }

    /// Apply the diff to `markers`.
    ///
    /// Yields the same set of markers as the `next` list the diff was computed
    /// from, but not its order: kept markers stay where they were and added
    /// ones go to the end. Map markers have no order, so callers that need
    /// list order rebuild it with [`build_markers`].
    #[must_use]
    pub fn apply_to(&self, markers: &[Marker]) -> Vec<Marker> {
        let updated: HashMap<StoreId, &Marker> =
            self.updated.iter().map(|m| (m.store_id, m)).collect();

        markers
            .iter()
            .filter(|m| !self.removed.contains(&m.store_id))
            .map(|m| updated.get(&m.store_id).map_or_else(|| m.clone(), |u| (*u).clone()))
            .chain(self.added.iter().cloned())
            .collect()
    }
}

/// Build markers for `stores`, focusing `selected`
#[must_use]
pub fn build_markers(stores: &[Store], selected: Option<StoreId>) -> Vec<Marker> {
    stores
        .iter()
        .map(|store| Marker::for_store(store, selected == Some(store.id)))
        .collect()
}

/// One marker per store of the snapshot
#[must_use]
pub fn markers_for(state: &LocatorState) -> Vec<Marker> {
    build_markers(state.stores(), state.selected_store_id())
}

/// Compute the minimal set of marker changes from `previous` to `next`
#[must_use]
pub fn reconcile(previous: &[Marker], next: &[Marker]) -> MarkerDiff {
    let before: HashMap<StoreId, &Marker> = previous.iter().map(|m| (m.store_id, m)).collect();
    let after: HashMap<StoreId, &Marker> = next.iter().map(|m| (m.store_id, m)).collect();

    let removed = previous
        .iter()
        .filter(|m| !after.contains_key(&m.store_id))
        .map(|m| m.store_id)
        .collect();

    let mut added = Vec::new();
    let mut updated = Vec::new();
    for marker in next {
        match before.get(&marker.store_id) {
            None => added.push(marker.clone()),
            Some(old) if *old != marker => updated.push(marker.clone()),
            Some(_) => {}
        }
    }

    MarkerDiff {
        removed,
        added,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorEvent;
    use crate::models::Classification;
    use crate::selector::SequenceRandom;

    fn stores() -> Vec<Store> {
        vec![
            Store::new(10, "Sinchon Station", 37.5551, 126.9368).with_umbrellas(3),
            Store::new(11, "Yonsei Gate", 37.5597, 126.9386).with_umbrellas(1),
            Store::new(12, "Ewha Gate", 37.5610, 126.9460),
        ]
    }

    #[test]
    fn test_markers_follow_snapshot() {
        let mut rng = SequenceRandom::new(vec![1]);
        let state = LocatorState::new().apply_all(
            [
                LocatorEvent::ClassificationsLoaded(vec![Classification::new(
                    1, "Sinchon", 37.5559, 126.9368,
                )]),
                LocatorEvent::StoresLoaded {
                    classification_id: 1,
                    stores: stores(),
                },
            ],
            &mut rng,
        );

        let markers = markers_for(&state);
        assert_eq!(markers.len(), 3);
        let focused: Vec<StoreId> = markers.iter().filter(|m| m.focused).map(|m| m.store_id).collect();
        assert_eq!(focused, vec![11]);
        assert_eq!(markers[0].label, "Sinchon Station");
        assert_eq!(markers[0].rentable_umbrellas_count, 3);
    }

    #[test]
    fn test_empty_state_has_no_markers() {
        assert!(markers_for(&LocatorState::new()).is_empty());
    }

    #[test]
    fn test_identical_sets_produce_empty_diff() {
        let markers = build_markers(&stores(), Some(10));
        assert!(reconcile(&markers, &markers).is_empty());
    }

    #[test]
    fn test_focus_change_only_updates_two_markers() {
        let before = build_markers(&stores(), Some(10));
        let after = build_markers(&stores(), Some(12));

        let diff = reconcile(&before, &after);
        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());
        let ids: Vec<StoreId> = diff.updated.iter().map(|m| m.store_id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert!(!diff.updated[0].focused);
        assert!(diff.updated[1].focused);
    }

    #[test]
    fn test_list_replacement() {
        let before = build_markers(&stores(), None);
        let mut next_stores = stores();
        next_stores.remove(0);
        next_stores[0].rentable_umbrellas_count = 5;
        next_stores.push(Store::new(13, "Sinchon Market", 37.5570, 126.9400));
        let after = build_markers(&next_stores, None);

        let diff = reconcile(&before, &after);
        assert_eq!(diff.removed, vec![10]);
        assert_eq!(diff.added.iter().map(|m| m.store_id).collect::<Vec<_>>(), vec![13]);
        assert_eq!(diff.updated.iter().map(|m| m.store_id).collect::<Vec<_>>(), vec![11]);
        assert_eq!(diff.updated[0].rentable_umbrellas_count, 5);

        assert_eq!(diff.apply_to(&before), after);
    }

    #[test]
    fn test_mid_list_insertion_keeps_set_not_order() {
        let before = build_markers(&stores(), None);
        let mut next_stores = stores();
        next_stores.insert(1, Store::new(13, "Sinchon Market", 37.5570, 126.9400));
        let after = build_markers(&next_stores, None);

        let diff = reconcile(&before, &after);
        assert_eq!(diff.added.iter().map(|m| m.store_id).collect::<Vec<_>>(), vec![13]);

        let applied = diff.apply_to(&before);
        let ids: Vec<StoreId> = applied.iter().map(|m| m.store_id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13]);

        let mut sorted = applied;
        sorted.sort_by_key(|m| m.store_id);
        let mut expected = after;
        expected.sort_by_key(|m| m.store_id);
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_clearing_removes_everything() {
        let before = build_markers(&stores(), Some(11));
        let diff = reconcile(&before, &[]);
        assert_eq!(diff.removed, vec![10, 11, 12]);
        assert!(diff.apply_to(&before).is_empty());
    }

    #[test]
    fn test_diff_serializes_camel_case() {
        let diff = reconcile(&[], &build_markers(&stores()[..1], Some(10)));
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["added"][0]["storeId"], 10);
        assert_eq!(json["added"][0]["rentableUmbrellasCount"], 3);
        assert_eq!(json["added"][0]["position"]["lat"], 37.5551);
        assert_eq!(json["added"][0]["focused"], true);
    }
}
