//! Default store selection
//!
//! Picks the store that is highlighted before the user clicks anything: the
//! nearest one when the user's position is known, otherwise a random one so
//! that users without geolocation still land somewhere in the district.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use crate::geo::{GeoPoint, distance};
use crate::models::{Store, StoreId};

/// Source of randomness for the no-position fallback
pub trait RandomSource {
    /// Return an index in `0..len`. Only called with `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Thread-local generator, used by the service
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Seeded generator for reproducible runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed sequence of picks (wrapped into range), cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    picks: Vec<usize>,
    next: usize,
}

impl SequenceRandom {
    #[must_use]
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, next: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.next % self.picks.len()];
        self.next += 1;
        pick % len
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

/// Nearest store to `position` and its distance in km.
///
/// Ties keep the store that comes first in `stores`. Records whose distance
/// is not a number rank last.
#[must_use]
pub fn nearest_store(position: GeoPoint, stores: &[Store]) -> Option<(&Store, f64)> {
    let mut best: Option<(&Store, f64)> = None;

    for store in stores {
        let d = store_distance(position, store);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((store, d)),
        }
    }

    best
}

/// Stores ordered by distance from `position`; equal distances keep input order
#[must_use]
pub fn stores_by_distance(position: GeoPoint, stores: &[Store]) -> Vec<(&Store, f64)> {
    let mut ranked: Vec<(&Store, f64)> = stores
        .iter()
        .map(|store| (store, store_distance(position, store)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Choose the store to highlight by default.
///
/// Returns `None` only for an empty list. With a position the nearest store
/// wins; without one a store is drawn uniformly from `rng`.
pub fn select_default_store<R: RandomSource + ?Sized>(
    position: Option<GeoPoint>,
    stores: &[Store],
    rng: &mut R,
) -> Option<StoreId> {
    if stores.is_empty() {
        return None;
    }

    match position {
        Some(position) => {
            let (store, km) = nearest_store(position, stores)?;
            debug!(
                "Selected nearest store {} ({}) at {:.3}km from {}",
                store.id, store.name, km, position
            );
            Some(store.id)
        }
        None => {
            let index = rng.pick_index(stores.len()).min(stores.len() - 1);
            let store = &stores[index];
            debug!(
                "No position available, selected random store {} ({})",
                store.id, store.name
            );
            Some(store.id)
        }
    }
}

fn store_distance(position: GeoPoint, store: &Store) -> f64 {
    let d = distance(position, store.position());
    if d.is_nan() { f64::INFINITY } else { d }
}
