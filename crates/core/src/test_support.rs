//! Shape and placer doubles shared by the unit tests.

use crate::item::{Item, ItemGroup, Shape};
use crate::placer::{PackResult, Placer};

/// A shape that only knows its area.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitShape {
    area: f64,
}

impl UnitShape {
    pub fn new(area: f64) -> Self {
        Self { area }
    }
}

impl Shape for UnitShape {
    /// Slot index on the plate.
    type Transform = usize;

    fn area(&self) -> f64 {
        self.area
    }

    fn transformed(&self, _transform: &usize) -> Self {
        self.clone()
    }
}

/// Unit-area item with a name.
pub fn unit(name: &str) -> Item<UnitShape> {
    Item::new(UnitShape::new(1.0)).with_name(name)
}

/// Item of the given area with a name.
pub fn sized(name: &str, area: f64) -> Item<UnitShape> {
    Item::new(UnitShape::new(area)).with_name(name)
}

fn footprint(item: &Item<UnitShape>) -> f64 {
    item.area() + item.inflation()
}

/// Accepts items while their summed footprint (area plus inflation) stays
/// within the bin capacity.
///
/// Score is the fill ratio the plate would reach, so emptier plates score lower.
#[derive(Debug)]
pub struct CapacityPlacer {
    capacity: f64,
    items: Vec<Item<UnitShape>>,
    plate_id: usize,
}

impl CapacityPlacer {
    fn used(&self) -> f64 {
        self.items.iter().map(footprint).sum()
    }
}

impl Placer<UnitShape> for CapacityPlacer {
    type Bin = f64;
    type Config = ();

    fn new(bin: &f64) -> Self {
        Self {
            capacity: *bin,
            items: Vec::new(),
            plate_id: 0,
        }
    }

    fn configure(&mut self, _config: &()) {}

    fn preload(&mut self, items: &[Item<UnitShape>]) {
        self.items.extend_from_slice(items);
    }

    fn pack(
        &mut self,
        item: &Item<UnitShape>,
        _remaining: &[Item<UnitShape>],
    ) -> PackResult<UnitShape> {
        let filled = self.used() + footprint(item);
        if filled > self.capacity + 1e-9 {
            return PackResult::rejected();
        }
        let mut placed = item.clone();
        placed.set_transform(self.items.len());
        PackResult::placed(placed, filled / self.capacity)
    }

    fn accept(&mut self, result: PackResult<UnitShape>) {
        if result.is_accepted() {
            if let Some(item) = result.into_item() {
                self.items.push(item);
            }
        }
    }

    fn clear_items(&mut self) {
        self.items.clear();
    }

    fn items(&self) -> ItemGroup<UnitShape> {
        self.items.clone()
    }

    fn set_plate_id(&mut self, id: usize) {
        self.plate_id = id;
    }

    fn plate_id(&self) -> usize {
        self.plate_id
    }

    fn score(&self) -> f64 {
        if self.capacity > 0.0 {
            self.used() / self.capacity
        } else {
            0.0
        }
    }
}
