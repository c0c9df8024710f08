//! Spatial indexing for 2D collision detection using R*-tree.
//!
//! Placed items are stored as their (inflated) bounding boxes so a placer can
//! quickly find the neighbours a candidate position would overlap.

use crate::geometry::{Polygon2D, Transform2D};
use rstar::{RTree, RTreeObject, AABB};

/// Overlap below this depth is treated as touching.
const TOUCH_EPS: f64 = 1e-9;

/// An entry in the 2D spatial index representing a placed item.
#[derive(Debug, Clone)]
pub struct SpatialEntry2D {
    /// Index of the item in the placer's item list
    pub index: usize,
    /// Axis-aligned bounding box (min_x, min_y, max_x, max_y)
    pub aabb: [f64; 4],
}

impl SpatialEntry2D {
    /// Creates a new spatial entry.
    pub fn new(index: usize, aabb: [f64; 4]) -> Self {
        Self { index, aabb }
    }

    /// Creates an entry from a polygon under a transform, grown by `inflation`.
    pub fn from_placed(
        index: usize,
        polygon: &Polygon2D,
        transform: &Transform2D,
        inflation: f64,
    ) -> Self {
        let aabb = compute_transformed_aabb(polygon, transform);
        Self {
            index,
            aabb: grow(aabb, inflation),
        }
    }

    /// Returns true if the boxes share interior area.
    pub fn overlaps(&self, aabb: &[f64; 4]) -> bool {
        boxes_overlap(&self.aabb, aabb)
    }
}

impl RTreeObject for SpatialEntry2D {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.aabb[0], self.aabb[1]], [self.aabb[2], self.aabb[3]])
    }
}

/// 2D spatial index using R*-tree for efficient collision queries.
#[derive(Debug)]
pub struct SpatialIndex2D {
    tree: RTree<SpatialEntry2D>,
}

impl SpatialIndex2D {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Creates a spatial index with the given entries.
    pub fn with_entries(entries: Vec<SpatialEntry2D>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts a new entry into the spatial index.
    pub fn insert(&mut self, entry: SpatialEntry2D) {
        self.tree.insert(entry);
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Clears all entries from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Finds all entries whose boxes overlap the given box.
    ///
    /// Boxes that only touch along an edge or a corner are not reported.
    pub fn query_aabb(&self, min: [f64; 2], max: [f64; 2]) -> Vec<&SpatialEntry2D> {
        let query = [min[0], min[1], max[0], max[1]];
        let envelope = AABB::from_corners(min, max);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.overlaps(&query))
            .collect()
    }

    /// Returns true if any entry overlaps the box `[min_x, min_y, max_x, max_y]`.
    pub fn collides(&self, aabb: &[f64; 4]) -> bool {
        let envelope = AABB::from_corners([aabb[0], aabb[1]], [aabb[2], aabb[3]]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|entry| entry.overlaps(aabb))
    }

    /// Returns an iterator over all entries in the index.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialEntry2D> {
        self.tree.iter()
    }
}

impl Default for SpatialIndex2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the box of a polygon under a transform.
pub fn compute_transformed_aabb(polygon: &Polygon2D, transform: &Transform2D) -> [f64; 4] {
    let (min, max) = polygon.aabb_at_rotation(transform.angle);
    [
        min[0] + transform.tx,
        min[1] + transform.ty,
        max[0] + transform.tx,
        max[1] + transform.ty,
    ]
}

/// Grows a box by `delta` on every side.
pub fn grow(aabb: [f64; 4], delta: f64) -> [f64; 4] {
    [
        aabb[0] - delta,
        aabb[1] - delta,
        aabb[2] + delta,
        aabb[3] + delta,
    ]
}

fn boxes_overlap(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a[0] < b[2] - TOUCH_EPS
        && b[0] < a[2] - TOUCH_EPS
        && a[1] < b[3] - TOUCH_EPS
        && b[1] < a[3] - TOUCH_EPS
}
