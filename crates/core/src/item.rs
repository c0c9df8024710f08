//! Items, bin assignments and result groups.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for shapes that can be carried by an [`Item`].
///
/// The engine never looks at coordinates. It only needs the area (for
/// ordering and degenerate-item filtering) and a way to hand the placed
/// shape back to callers.
pub trait Shape: Clone + Debug + Send + Sync {
    /// Placement transformation produced by a placer (translation, rotation...).
    type Transform: Clone + Debug + Default + PartialEq + Send + Sync;

    /// Returns the area of the untransformed shape.
    fn area(&self) -> f64;

    /// Returns a copy of the shape with the transformation applied.
    fn transformed(&self, transform: &Self::Transform) -> Self;
}

/// Bin assignment state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinId {
    /// Not yet processed.
    #[default]
    Unset,
    /// No bin can hold the item under the given constraints.
    Unfit,
    /// Placed on the bin with this index.
    Bin(usize),
}

impl BinId {
    /// Returns the bin index if the item is placed.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Bin(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Returns true if the item has not been processed.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns true if the item was proven unplaceable.
    pub fn is_unfit(&self) -> bool {
        matches!(self, Self::Unfit)
    }

    /// Returns true if the item sits on a concrete bin.
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Bin(_))
    }
}

/// A placeable part plus its scheduling metadata.
///
/// Cloning is cheap: the shape is shared behind an [`Arc`]. Placers probe
/// clones; only the engine writes `bin_id`/`item_id` back to the caller's
/// items, and only once per run.
#[derive(Debug, Clone)]
pub struct Item<S: Shape> {
    shape: Arc<S>,
    area: f64,
    name: String,
    priority: i32,
    bed_temp: f64,
    height: f64,
    fixed: bool,
    obstacle: bool,
    bin_id: BinId,
    item_id: Option<u32>,
    transform: S::Transform,
    inflation: f64,
}

impl<S: Shape> Item<S> {
    /// Creates a new free item from a shape.
    pub fn new(shape: S) -> Self {
        let area = shape.area();
        Self {
            shape: Arc::new(shape),
            area,
            name: String::new(),
            priority: 0,
            bed_temp: 0.0,
            height: 0.0,
            fixed: false,
            obstacle: false,
            bin_id: BinId::Unset,
            item_id: None,
            transform: S::Transform::default(),
            inflation: 0.0,
        }
    }

    /// Sets the display name (reported by the unfit indicator).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the placement priority (higher = placed first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the bed temperature (secondary ordering key).
    pub fn with_bed_temp(mut self, bed_temp: f64) -> Self {
        self.bed_temp = bed_temp;
        self
    }

    /// Sets the object height (tertiary ordering key).
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Sets the initial placement transformation.
    pub fn with_transform(mut self, transform: S::Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Pins the item to a bin. The engine never reassigns it.
    pub fn fixed_in_bin(mut self, bin: usize) -> Self {
        self.fixed = true;
        self.bin_id = BinId::Bin(bin);
        self
    }

    /// Returns the shared, untransformed shape.
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Returns the shape with the current transformation applied.
    pub fn transformed_shape(&self) -> S {
        self.shape.transformed(&self.transform)
    }

    /// Returns the area of the shape.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the placement priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Sets the placement priority.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Returns the bed temperature.
    pub fn bed_temp(&self) -> f64 {
        self.bed_temp
    }

    /// Returns the object height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if the item is pinned to its bin.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Marks the item as fixed (or free) without touching its bin id.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// Returns true if the item is a preloaded obstacle.
    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    /// Returns the bin assignment.
    pub fn bin_id(&self) -> BinId {
        self.bin_id
    }

    /// Sets the bin assignment.
    pub fn set_bin_id(&mut self, bin_id: BinId) {
        self.bin_id = bin_id;
    }

    /// Returns the commit sequence number, if the item was placed.
    pub fn item_id(&self) -> Option<u32> {
        self.item_id
    }

    /// Sets the commit sequence number.
    pub fn set_item_id(&mut self, item_id: Option<u32>) {
        self.item_id = item_id;
    }

    /// Returns the placement transformation.
    pub fn transform(&self) -> &S::Transform {
        &self.transform
    }

    /// Sets the placement transformation.
    pub fn set_transform(&mut self, transform: S::Transform) {
        self.transform = transform;
    }

    /// Returns the clearance a placer must keep around the shape.
    pub fn inflation(&self) -> f64 {
        self.inflation
    }

    /// Sets the clearance a placer must keep around the shape.
    pub fn set_inflation(&mut self, inflation: f64) {
        self.inflation = inflation;
    }

    pub(crate) fn inflate(&mut self, delta: f64) {
        self.inflation += delta;
    }

    /// Returns true if `other` is a committed copy of this item.
    pub(crate) fn is_source_of(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape)
            && self.bin_id == other.bin_id
            && self.item_id == other.item_id
    }

    pub(crate) fn as_obstacle(mut self) -> Self {
        self.obstacle = true;
        self
    }

    /// Clears a previous run's assignment of a free item.
    pub(crate) fn reset_assignment(&mut self) {
        if !self.fixed {
            self.bin_id = BinId::Unset;
            self.item_id = None;
        }
    }

    /// Records the final placement. Only an unset item can be committed.
    pub(crate) fn commit(&mut self, bin: usize, item_id: u32, transform: S::Transform) {
        debug_assert!(self.bin_id.is_unset(), "item assigned twice");
        self.bin_id = BinId::Bin(bin);
        self.item_id = Some(item_id);
        self.transform = transform;
    }

    /// Marks the item as unplaceable. Only an unset item can be marked.
    pub(crate) fn mark_unfit(&mut self) {
        debug_assert!(self.bin_id.is_unset(), "item assigned twice");
        self.bin_id = BinId::Unfit;
    }
}

/// An ordered sequence of items (input, remaining candidates or one bin).
pub type ItemGroup<S> = Vec<Item<S>>;

/// One item group per bin; the position is the bin index.
pub type PackGroup<S> = Vec<ItemGroup<S>>;

/// Number of scheduled (non-fixed, non-obstacle) items in one bin.
pub fn packed_size<S: Shape>(bin: &[Item<S>]) -> usize {
    bin.iter()
        .filter(|item| !item.is_fixed() && !item.is_obstacle())
        .count()
}

/// Number of scheduled items across all bins.
pub fn total_packed<S: Shape>(group: &PackGroup<S>) -> usize {
    group.iter().map(|bin| packed_size(bin)).sum()
}

/// Default scheduling order.
///
/// Priority descending, then bed temperature descending, then height
/// ascending, then area descending.
pub fn default_order<S: Shape>(a: &Item<S>, b: &Item<S>) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| b.bed_temp().total_cmp(&a.bed_temp()))
        .then_with(|| a.height().total_cmp(&b.height()))
        .then_with(|| b.area().total_cmp(&a.area()))
}

/// Orders items by area only, largest first.
pub fn area_order<S: Shape>(a: &Item<S>, b: &Item<S>) -> Ordering {
    b.area().total_cmp(&a.area())
}
