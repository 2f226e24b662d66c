//! Locator view state
//!
//! Every change the map screen reacts to (classifications arriving, the user
//! switching district, a store list arriving, the position resolving, a
//! marker click) is an event. Applying an event to a snapshot yields the next
//! snapshot; snapshots are never modified in place.

use tracing::{debug, warn};

use crate::geo::GeoPoint;
use crate::models::{Classification, ClassificationId, Store, StoreId};
use crate::selector::{RandomSource, select_default_store};

/// How the current store came to be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// Chosen by the nearest/random rule
    Default,
    /// Clicked by the user
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub store_id: StoreId,
    pub origin: SelectionOrigin,
}

/// Stores of one classification
#[derive(Debug, Clone, PartialEq)]
pub struct StoreList {
    pub classification_id: ClassificationId,
    pub stores: Vec<Store>,
}

/// Inputs that drive the locator
#[derive(Debug, Clone, PartialEq)]
pub enum LocatorEvent {
    ClassificationsLoaded(Vec<Classification>),
    ClassificationSelected(ClassificationId),
    StoresLoaded {
        classification_id: ClassificationId,
        stores: Vec<Store>,
    },
    PositionResolved(Option<GeoPoint>),
    StoreClicked(StoreId),
    BottomSheetClosed,
}

/// Immutable snapshot of the locator screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocatorState {
    classifications: Vec<Classification>,
    selected_classification: Option<ClassificationId>,
    store_list: Option<StoreList>,
    position: Option<GeoPoint>,
    selection: Option<Selection>,
    bottom_sheet_open: bool,
    map_center: Option<GeoPoint>,
}

impl LocatorState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    #[must_use]
    pub fn selected_classification(&self) -> Option<&Classification> {
        let id = self.selected_classification?;
        self.classifications.iter().find(|c| c.id == id)
    }

    /// Stores of the selected classification, empty until they arrive
    #[must_use]
    pub fn stores(&self) -> &[Store] {
        self.store_list
            .as_ref()
            .map_or(&[][..], |list| list.stores.as_slice())
    }

    #[must_use]
    pub fn has_stores(&self) -> bool {
        self.store_list.is_some()
    }

    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[must_use]
    pub fn selected_store_id(&self) -> Option<StoreId> {
        self.selection.map(|s| s.store_id)
    }

    #[must_use]
    pub fn selected_store(&self) -> Option<&Store> {
        let id = self.selected_store_id()?;
        self.stores().iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn bottom_sheet_open(&self) -> bool {
        self.bottom_sheet_open
    }

    #[must_use]
    pub fn map_center(&self) -> Option<GeoPoint> {
        self.map_center
    }

    /// Produce the snapshot that follows `event`
    #[must_use]
    pub fn apply<R: RandomSource + ?Sized>(&self, event: LocatorEvent, rng: &mut R) -> Self {
        let mut next = self.clone();

        match event {
            LocatorEvent::ClassificationsLoaded(classifications) => {
                next.classifications = classifications;
                let still_known = next
                    .selected_classification
                    .is_some_and(|id| next.classifications.iter().any(|c| c.id == id));
                if !still_known {
                    next.selected_classification = next.classifications.first().map(|c| c.id);
                    next.store_list = None;
                    next.selection = None;
                    next.bottom_sheet_open = false;
                }
                next.recenter();
            }
            LocatorEvent::ClassificationSelected(id) => {
                if self.selected_classification == Some(id) {
                    return next;
                }
                if !self.classifications.iter().any(|c| c.id == id) {
                    warn!("Ignoring selection of unknown classification {}", id);
                    return next;
                }
                next.selected_classification = Some(id);
                next.store_list = None;
                next.selection = None;
                next.bottom_sheet_open = false;
                next.recenter();
            }
            LocatorEvent::StoresLoaded {
                classification_id,
                stores,
            } => {
                if self.selected_classification != Some(classification_id) {
                    debug!(
                        "Discarding store list for classification {}, {:?} is selected",
                        classification_id, self.selected_classification
                    );
                    return next;
                }
                if self.store_list.as_ref().is_some_and(|list| {
                    list.classification_id == classification_id && list.stores == stores
                }) {
                    debug!("Store list for classification {} unchanged", classification_id);
                    return next;
                }
                next.store_list = Some(StoreList {
                    classification_id,
                    stores,
                });
                next.reselect_default(rng);
            }
            LocatorEvent::PositionResolved(position) => {
                if self.position == position {
                    return next;
                }
                next.position = position;
                if next.store_list.is_some() {
                    next.reselect_default(rng);
                }
            }
            LocatorEvent::StoreClicked(store_id) => {
                if !self.stores().iter().any(|s| s.id == store_id) {
                    warn!("Ignoring click on store {} outside the current list", store_id);
                    return next;
                }
                next.selection = Some(Selection {
                    store_id,
                    origin: SelectionOrigin::User,
                });
                next.bottom_sheet_open = true;
            }
            LocatorEvent::BottomSheetClosed => {
                next.bottom_sheet_open = false;
            }
        }

        next
    }

    /// Apply events in order
    #[must_use]
    pub fn apply_all<R, I>(&self, events: I, rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
        I: IntoIterator<Item = LocatorEvent>,
    {
        events
            .into_iter()
            .fold(self.clone(), |state, event| state.apply(event, rng))
    }

    fn reselect_default<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.selection = select_default_store(self.position, self.stores(), rng).map(|store_id| {
            Selection {
                store_id,
                origin: SelectionOrigin::Default,
            }
        });
    }

    fn recenter(&mut self) {
        if let Some(center) = self.selected_classification().and_then(Classification::center) {
            self.map_center = Some(center);
        }
    }
}
