//! # U-Arrange 2D
//!
//! 2D shapes, build plates and a reference placer for the U-Arrange
//! selection engine.
//!
//! ## Features
//!
//! - Polygon shapes with holes, transformed through `geo`
//! - Rectangular build plates with an arbitrary origin
//! - R*-tree spatial index over placed bounding boxes
//! - Bottom-left placer with discrete rotations and minimum object distance
//!
//! ## Quick Start
//!
//! ```rust
//! use u_arrange_d2::{arrange, Bed2D, Config, Item, NestControl, PlacerConfig2D, Polygon2D};
//!
//! let mut items: Vec<Item<Polygon2D>> = (0..6)
//!     .map(|i| Item::new(Polygon2D::rectangle(60.0, 40.0)).with_name(format!("part{}", i)))
//!     .collect();
//!
//! let config = Config::new()
//!     .with_placer(PlacerConfig2D::new().with_rotations_deg(vec![0.0, 90.0]));
//!
//! let packed = arrange(
//!     &mut items,
//!     &Bed2D::rectangle(100.0, 100.0),
//!     2.0,
//!     config,
//!     NestControl::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(packed, 6);
//! assert!(items.iter().all(|item| item.bin_id().is_placed()));
//! ```

pub mod bed;
pub mod geometry;
pub mod placer;
pub mod spatial_index;

use u_arrange_core::nest;

/// Arranges polygon items on copies of `bed` with [`BottomLeftPlacer`].
///
/// Fails with `InvalidBoundary` for an unusable plate and with `InvalidItem`
/// for outlines holding non-finite coordinates. Degenerate outlines (fewer
/// than three vertices or zero area) are not errors; they come back Unfit.
pub fn arrange(
    items: &mut [Item<Polygon2D>],
    bed: &Bed2D,
    min_gap: f64,
    config: Config<Polygon2D, PlacerConfig2D>,
    control: NestControl,
) -> Result<usize> {
    bed.validate()?;
    for item in items.iter() {
        item.shape().check_finite()?;
    }

    log::debug!(
        "Arranging {} items on {}x{} plates, min gap {}",
        items.len(),
        bed.width(),
        bed.height(),
        min_gap
    );

    nest::<Polygon2D, BottomLeftPlacer>(items, bed.clone(), min_gap, config, control)
}

// Re-exports
pub use bed::Bed2D;
pub use geometry::{Polygon2D, Transform2D};
pub use placer::{placed_aabb, BottomLeftPlacer, PlacerConfig2D};
pub use spatial_index::{SpatialEntry2D, SpatialIndex2D};
pub use u_arrange_core::{
    BinId, Config, Error, Item, ItemGroup, NestControl, Nester, PackGroup, PackResult, Placer,
    Result, SelectionStrategy, SelectorConfig, Shape,
};
