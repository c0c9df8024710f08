//! # U-Arrange Core
//!
//! Item-to-plate selection engine for the U-Arrange arrangement library.
//!
//! This crate decides *which* plate each item goes on and in which order items
//! are attempted. *Where* an item lands on a plate is delegated to a
//! [`Placer`], an external capability implemented per geometry (see
//! `u-arrange-d2` for a 2D one).
//!
//! ## Core Components
//!
//! - **Data model**: [`Item`], [`BinId`], [`ItemGroup`], [`PackGroup`], [`Shape`]
//! - **Placer capability**: [`Placer`], [`PackResult`]
//! - **Selection strategies**: [`FirstFitSelection`], [`FillerSelection`]
//! - **Shared plumbing**: [`SelectionBoilerplate`] (result, progress, cancellation)
//! - **Entry points**: [`Nester`], [`nest`]
//!
//! ## Selection Strategies
//!
//! | Strategy | Order | Plate choice |
//! |----------|-------|--------------|
//! | `FirstFit` | priority, bed temperature, height, area | lowest "all plates" score over every open plate |
//! | `Filler` | area | current plate, then a fresh one |
//!
//! ## Configuration
//!
//! ```rust
//! use u_arrange_core::{SelectionStrategy, SelectorConfig};
//!
//! let selector = SelectorConfig::new()
//!     .with_strategy(SelectionStrategy::FirstFit)
//!     .with_max_plates(8)
//!     .with_parallel_probe(true);
//! assert_eq!(selector.max_plates, 8);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of the selector configuration

pub mod config;
pub mod error;
pub mod item;
pub mod nester;
pub mod placer;
pub mod selection;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::{
    Config, ItemComparator, NestControl, ProgressFn, SelectionStrategy, SelectorConfig, StopFn,
    UnfitFn, DEFAULT_MAX_PLATES,
};
pub use error::{Error, Result};
pub use item::{
    area_order, default_order, packed_size, total_packed, BinId, Item, ItemGroup, PackGroup, Shape,
};
pub use nester::{nest, Nester};
pub use placer::{PackResult, Placer, REJECT_SCORE};
pub use selection::{FillerSelection, FirstFitSelection, Selection, SelectionBoilerplate};
