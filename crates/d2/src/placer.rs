//! Bottom-left placer over bounding boxes.
//!
//! Each item is reduced to the bounding box of its outline at the candidate
//! rotation, grown by the item's inflation. Candidate positions are the plate
//! corner and every combination of the right and top edges of the boxes
//! already on the plate; the lowest, then leftmost, free position wins.

use crate::bed::Bed2D;
use crate::geometry::{Polygon2D, Transform2D};
use crate::spatial_index::{compute_transformed_aabb, grow, SpatialEntry2D, SpatialIndex2D};
use u_arrange_core::{Item, ItemGroup, PackResult, Placer, Shape};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of [`BottomLeftPlacer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacerConfig2D {
    /// Allowed rotation angles in radians, tried in order.
    pub rotations: Vec<f64>,
}

impl Default for PlacerConfig2D {
    fn default() -> Self {
        Self {
            rotations: vec![0.0],
        }
    }
}

impl PlacerConfig2D {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the allowed rotation angles in radians.
    pub fn with_rotations(mut self, angles: Vec<f64>) -> Self {
        self.rotations = angles;
        self
    }

    /// Sets the allowed rotation angles in degrees.
    pub fn with_rotations_deg(mut self, angles: Vec<f64>) -> Self {
        self.rotations = angles.into_iter().map(f64::to_radians).collect();
        self
    }
}

/// Best position found for one rotation.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    transform: Transform2D,
    aabb: [f64; 4],
    score: f64,
}

/// Places items at the lowest, then leftmost, free spot of one plate.
#[derive(Debug)]
pub struct BottomLeftPlacer {
    bed: Bed2D,
    config: PlacerConfig2D,
    items: Vec<Item<Polygon2D>>,
    index: SpatialIndex2D,
    plate_id: usize,
}

impl BottomLeftPlacer {
    /// Returns the plate descriptor.
    pub fn bed(&self) -> &Bed2D {
        &self.bed
    }

    fn insert(&mut self, item: Item<Polygon2D>) {
        let entry = SpatialEntry2D::from_placed(
            self.items.len(),
            item.shape(),
            item.transform(),
            item.inflation(),
        );
        self.index.insert(entry);
        self.items.push(item);
    }

    /// Bounding box of the committed items, obstacles excluded.
    fn pile_extent(&self) -> Option<[f64; 4]> {
        self.index
            .iter()
            .filter(|entry| !self.items[entry.index].is_obstacle())
            .map(|entry| entry.aabb)
            .reduce(union)
    }

    fn extent_score(&self, extent: Option<[f64; 4]>) -> f64 {
        let area = self.bed.area();
        match extent {
            Some(b) if area > 0.0 => (b[2] - b[0]) * (b[3] - b[1]) / area,
            _ => 0.0,
        }
    }

    /// Finds the bottom-left position for `polygon` at `angle`.
    fn probe_rotation(
        &self,
        polygon: &Polygon2D,
        angle: f64,
        inflation: f64,
        pile: Option<[f64; 4]>,
    ) -> Option<Candidate> {
        let (min, max) = polygon.aabb_at_rotation(angle);
        let width = max[0] - min[0] + 2.0 * inflation;
        let height = max[1] - min[1] + 2.0 * inflation;
        let (origin_x, origin_y) = self.bed.origin();

        // Lower-left corners of the inflated box.
        let mut xs = vec![origin_x - inflation];
        let mut ys = vec![origin_y - inflation];
        for entry in self.index.iter() {
            xs.push(entry.aabb[2]);
            ys.push(entry.aabb[3]);
        }
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        ys.sort_by(f64::total_cmp);
        ys.dedup();

        for &y in &ys {
            for &x in &xs {
                let aabb = [x, y, x + width, y + height];
                if !self.bed.contains_box(grow(aabb, -inflation)) || self.index.collides(&aabb) {
                    continue;
                }

                let transform =
                    Transform2D::new(x + inflation - min[0], y + inflation - min[1], angle);
                let extent = match pile {
                    Some(p) => union(p, aabb),
                    None => aabb,
                };
                return Some(Candidate {
                    transform,
                    aabb,
                    score: self.extent_score(Some(extent)),
                });
            }
        }

        None
    }
}

/// Smallest box holding both boxes.
fn union(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
}

impl Placer<Polygon2D> for BottomLeftPlacer {
    type Bin = Bed2D;
    type Config = PlacerConfig2D;

    fn new(bed: &Bed2D) -> Self {
        Self {
            bed: bed.clone(),
            config: PlacerConfig2D::default(),
            items: Vec::new(),
            index: SpatialIndex2D::new(),
            plate_id: 0,
        }
    }

    fn configure(&mut self, config: &PlacerConfig2D) {
        self.config = config.clone();
    }

    fn preload(&mut self, items: &[Item<Polygon2D>]) {
        for item in items {
            self.insert(item.clone());
        }
    }

    fn pack(
        &mut self,
        item: &Item<Polygon2D>,
        _remaining: &[Item<Polygon2D>],
    ) -> PackResult<Polygon2D> {
        let polygon = item.shape();
        if polygon.area() <= 0.0 || self.bed.area() <= 0.0 {
            return PackResult::rejected();
        }

        let pile = self.pile_extent();
        let best = self
            .config
            .rotations
            .iter()
            .filter_map(|&angle| self.probe_rotation(polygon, angle, item.inflation(), pile))
            .reduce(|best, c| if c.score < best.score { c } else { best });

        match best {
            Some(candidate) => {
                log::trace!(
                    "Plate {}: '{}' fits at ({:.2}, {:.2}) box {:?}",
                    self.plate_id,
                    item.name(),
                    candidate.transform.tx,
                    candidate.transform.ty,
                    candidate.aabb
                );
                let mut placed = item.clone();
                placed.set_transform(candidate.transform);
                PackResult::placed(placed, candidate.score)
            }
            None => PackResult::rejected(),
        }
    }

    fn accept(&mut self, result: PackResult<Polygon2D>) {
        if !result.is_accepted() {
            return;
        }
        if let Some(item) = result.into_item() {
            self.insert(item);
        }
    }

    fn clear_items(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn items(&self) -> ItemGroup<Polygon2D> {
        self.items.clone()
    }

    fn set_plate_id(&mut self, id: usize) {
        self.plate_id = id;
    }

    fn plate_id(&self) -> usize {
        self.plate_id
    }

    fn score(&self) -> f64 {
        self.extent_score(self.pile_extent())
    }
}

/// Returns the box an item occupies on its plate, inflation included.
pub fn placed_aabb(item: &Item<Polygon2D>) -> [f64; 4] {
    grow(
        compute_transformed_aabb(item.shape(), item.transform()),
        item.inflation(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn rect(name: &str, w: f64, h: f64) -> Item<Polygon2D> {
        Item::new(Polygon2D::rectangle(w, h)).with_name(name)
    }

    fn placer(w: f64, h: f64) -> BottomLeftPlacer {
        BottomLeftPlacer::new(&Bed2D::rectangle(w, h))
    }

    fn place(placer: &mut BottomLeftPlacer, item: &Item<Polygon2D>) -> Option<Transform2D> {
        let result = placer.pack(item, &[]);
        let transform = result.item().map(|i| *i.transform());
        placer.accept(result);
        transform
    }

    #[test]
    fn test_first_item_goes_to_origin() {
        let mut p = placer(100.0, 100.0);
        let result = p.pack(&rect("a", 20.0, 10.0), &[]);

        assert!(result.is_accepted());
        assert_relative_eq!(result.score(), 200.0 / 10000.0);
        let t = *result.item().unwrap().transform();
        assert_relative_eq!(t.tx, 0.0);
        assert_relative_eq!(t.ty, 0.0);

        // Probing does not commit.
        assert!(p.items().is_empty());
        assert_relative_eq!(p.score(), 0.0);
    }

    #[test]
    fn test_bottom_row_then_next_row() {
        let mut p = placer(50.0, 50.0);
        let a = place(&mut p, &rect("a", 30.0, 10.0)).unwrap();
        let b = place(&mut p, &rect("b", 20.0, 10.0)).unwrap();
        let c = place(&mut p, &rect("c", 20.0, 10.0)).unwrap();

        assert_relative_eq!(a.tx, 0.0);
        assert_relative_eq!(b.tx, 30.0);
        assert_relative_eq!(b.ty, 0.0);
        assert_relative_eq!(c.tx, 0.0);
        assert_relative_eq!(c.ty, 10.0);
        assert_eq!(p.items().len(), 3);
        assert_relative_eq!(p.score(), 50.0 * 20.0 / 2500.0);
    }

    #[test]
    fn test_rejects_when_full() {
        let mut p = placer(20.0, 20.0);
        assert!(place(&mut p, &rect("a", 20.0, 20.0)).is_some());
        assert!(!p.pack(&rect("b", 1.0, 1.0), &[]).is_accepted());
        assert!(!placer(10.0, 10.0).pack(&rect("big", 11.0, 5.0), &[]).is_accepted());
    }

    #[test]
    fn test_rotation_allows_fit() {
        let mut p = placer(10.0, 30.0);
        assert!(!p.pack(&rect("long", 25.0, 5.0), &[]).is_accepted());

        p.configure(&PlacerConfig2D::new().with_rotations(vec![0.0, FRAC_PI_2]));
        let result = p.pack(&rect("long", 25.0, 5.0), &[]);
        assert!(result.is_accepted());

        let placed = result.item().unwrap();
        let aabb = placed_aabb(placed);
        assert_relative_eq!(aabb[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(aabb[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(aabb[2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(aabb[3], 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inflation_keeps_gap() {
        let mut p = placer(100.0, 100.0);
        let mut a = rect("a", 10.0, 10.0);
        let mut b = rect("b", 10.0, 10.0);
        a.set_inflation(1.0);
        b.set_inflation(1.0);

        let ta = place(&mut p, &a).unwrap();
        let tb = place(&mut p, &b).unwrap();

        // Outlines may touch the plate edge, neighbours stay 2 apart.
        assert_relative_eq!(ta.tx, 0.0);
        assert_relative_eq!(ta.ty, 0.0);
        assert_relative_eq!(tb.tx, 12.0);
        assert_relative_eq!(tb.ty, 0.0);
    }

    #[test]
    fn test_preloaded_items_block() {
        let mut p = placer(100.0, 100.0);
        let mut wall = rect("wall", 10.0, 100.0);
        wall.set_transform(Transform2D::translation(0.0, 0.0));
        p.preload(&[wall]);
        assert_relative_eq!(p.score(), 10.0 * 100.0 / 10000.0);

        let t = place(&mut p, &rect("a", 10.0, 10.0)).unwrap();
        assert_relative_eq!(t.tx, 10.0);
    }

    #[test]
    fn test_clear_items() {
        let mut p = placer(20.0, 20.0);
        place(&mut p, &rect("a", 20.0, 20.0));
        p.clear_items();

        assert!(p.items().is_empty());
        assert!(place(&mut p, &rect("b", 20.0, 20.0)).is_some());
    }

    #[test]
    fn test_bed_origin_offset() {
        let mut p = BottomLeftPlacer::new(&Bed2D::rectangle(50.0, 50.0).with_origin(-25.0, -25.0));
        let t = place(&mut p, &rect("a", 10.0, 10.0)).unwrap();
        assert_relative_eq!(t.tx, -25.0);
        assert_relative_eq!(t.ty, -25.0);
    }

    #[test]
    fn test_degenerate_item_rejected() {
        let mut p = placer(20.0, 20.0);
        let flat = Item::new(Polygon2D::new().with_polygon(vec![(0.0, 0.0), (5.0, 0.0)]));
        assert!(!p.pack(&flat, &[]).is_accepted());
    }
}
