//! Placer capability consumed by the selection strategies.
//!
//! A placer owns one bin (plate) and decides where an item goes on it. The
//! selection engine treats it as an expensive black box: it probes with
//! [`Placer::pack`], and commits a successful probe with [`Placer::accept`].

use crate::item::{packed_size, Item, ItemGroup, Shape};

/// Scores at or above this value mean "does not fit".
pub const REJECT_SCORE: f64 = 1e7;

/// Outcome of one placement probe.
#[derive(Debug, Clone)]
pub struct PackResult<S: Shape> {
    placed: Option<Item<S>>,
    score: f64,
}

impl<S: Shape> PackResult<S> {
    /// A successful probe: the item clone carrying its placement, and its score
    /// (lower is better).
    pub fn placed(item: Item<S>, score: f64) -> Self {
        Self {
            placed: Some(item),
            score,
        }
    }

    /// A failed probe.
    pub fn rejected() -> Self {
        Self {
            placed: None,
            score: f64::MAX,
        }
    }

    /// Returns the probe score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the placed item clone, if any.
    pub fn item(&self) -> Option<&Item<S>> {
        self.placed.as_ref()
    }

    /// Returns true if the probe produced a usable placement.
    pub fn is_accepted(&self) -> bool {
        self.placed.is_some() && self.score >= 0.0 && self.score < REJECT_SCORE
    }

    /// Consumes the result, returning the placed item clone.
    pub fn into_item(self) -> Option<Item<S>> {
        self.placed
    }

    pub(crate) fn item_mut(&mut self) -> Option<&mut Item<S>> {
        self.placed.as_mut()
    }
}

/// Trait for placement strategies that fit items onto one bin.
pub trait Placer<S: Shape>: Sized + Send {
    /// Bin descriptor, passed unchanged to every placer of a run.
    type Bin: Clone + Send + Sync;
    /// Placer configuration, passed through untouched by the engine.
    type Config: Clone + Default + Send + Sync;

    /// Creates an empty placer for the bin.
    fn new(bin: &Self::Bin) -> Self;

    /// Applies a configuration.
    fn configure(&mut self, config: &Self::Config);

    /// Seeds the bin with already placed items or obstacles.
    ///
    /// Preloaded items keep their transformation and are never moved.
    fn preload(&mut self, items: &[Item<S>]);

    /// Probes a placement for `item`.
    ///
    /// `remaining` holds the items that will be scheduled after this one, so a
    /// placer can leave room for them. Must not change committed state.
    fn pack(&mut self, item: &Item<S>, remaining: &[Item<S>]) -> PackResult<S>;

    /// Commits a successful probe. Failed results are ignored.
    fn accept(&mut self, result: PackResult<S>);

    /// Removes every committed and preloaded item.
    fn clear_items(&mut self);

    /// Returns the committed items, preloaded ones included.
    fn items(&self) -> ItemGroup<S>;

    /// Sets the plate index this placer works on.
    fn set_plate_id(&mut self, id: usize);

    /// Returns the plate index this placer works on.
    fn plate_id(&self) -> usize;

    /// Quality of the committed layout (lower is better, `0.0` when empty).
    fn score(&self) -> f64;

    /// Total area of the committed items.
    fn filled_area(&self) -> f64 {
        self.items()
            .iter()
            .filter(|item| !item.is_obstacle())
            .map(Item::area)
            .sum()
    }

    /// Number of committed items that the engine scheduled (not fixed, not obstacles).
    fn packed_size(&self) -> usize {
        packed_size(&self.items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sized, unit, CapacityPlacer, UnitShape};

    #[test]
    fn test_rejected_result() {
        let result = PackResult::<UnitShape>::rejected();
        assert!(!result.is_accepted());
        assert!(result.item().is_none());
    }

    #[test]
    fn test_reject_score_range() {
        assert!(PackResult::placed(unit("a"), 0.0).is_accepted());
        assert!(PackResult::placed(unit("a"), REJECT_SCORE - 1.0).is_accepted());
        assert!(!PackResult::placed(unit("a"), REJECT_SCORE).is_accepted());
        assert!(!PackResult::placed(unit("a"), -0.5).is_accepted());
        assert!(!PackResult::placed(unit("a"), f64::NAN).is_accepted());
    }

    #[test]
    fn test_into_item() {
        let result = PackResult::placed(unit("a"), 0.5);
        assert_eq!(result.into_item().map(|i| i.name().to_string()), Some("a".into()));
    }

    #[test]
    fn test_filled_area_skips_obstacles() {
        let mut placer = CapacityPlacer::new(&10.0);
        placer.preload(&[
            sized("wall", 2.0).as_obstacle(),
            sized("pinned", 1.5).fixed_in_bin(0),
        ]);
        assert_eq!(placer.filled_area(), 1.5);

        let result = placer.pack(&sized("a", 3.0), &[]);
        placer.accept(result);
        assert_eq!(placer.filled_area(), 4.5);
        assert_eq!(placer.packed_size(), 1);
    }
}
