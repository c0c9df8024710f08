//! Selection strategies and run configuration.

use crate::item::{Item, Shape};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Build-plate ceiling used when none is configured.
pub const DEFAULT_MAX_PLATES: usize = 36;

/// Item-to-bin selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectionStrategy {
    /// Multi-plate first fit with "all plates" score tie-break.
    #[default]
    FirstFit,
    /// Single-pass greedy filling of one plate at a time.
    Filler,
}

/// Configuration of the selection engine itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectorConfig {
    /// Selection strategy.
    pub strategy: SelectionStrategy,

    /// Maximum number of plates the engine may open.
    pub max_plates: usize,

    /// Probe the open plates of one scan step in parallel.
    pub parallel_probe: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            max_plates: DEFAULT_MAX_PLATES,
            parallel_probe: false,
        }
    }
}

impl SelectorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selection strategy.
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the plate ceiling.
    pub fn with_max_plates(mut self, max_plates: usize) -> Self {
        self.max_plates = max_plates;
        self
    }

    /// Enables or disables parallel probing.
    pub fn with_parallel_probe(mut self, parallel: bool) -> Self {
        self.parallel_probe = parallel;
        self
    }
}

/// Custom scheduling order.
pub type ItemComparator<S> = Arc<dyn Fn(&Item<S>, &Item<S>) -> Ordering + Send + Sync>;

/// Full configuration of one arrangement run.
///
/// `PC` is the placer configuration; the engine hands it to every placer
/// without looking inside.
pub struct Config<S: Shape, PC> {
    /// Placer configuration.
    pub placer: PC,

    /// Selection engine configuration.
    pub selector: SelectorConfig,

    /// Scheduling order override. `None` uses [`default_order`](crate::item::default_order).
    pub comparator: Option<ItemComparator<S>>,

    /// Obstacles preloaded into every plate (e.g. unprintable regions).
    pub excluded_items: Vec<Item<S>>,
}

impl<S: Shape, PC: Default> Default for Config<S, PC> {
    fn default() -> Self {
        Self {
            placer: PC::default(),
            selector: SelectorConfig::default(),
            comparator: None,
            excluded_items: Vec::new(),
        }
    }
}

impl<S: Shape, PC: Clone> Clone for Config<S, PC> {
    fn clone(&self) -> Self {
        Self {
            placer: self.placer.clone(),
            selector: self.selector.clone(),
            comparator: self.comparator.clone(),
            excluded_items: self.excluded_items.clone(),
        }
    }
}

impl<S: Shape, PC: fmt::Debug> fmt::Debug for Config<S, PC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("placer", &self.placer)
            .field("selector", &self.selector)
            .field("comparator", &self.comparator.as_ref().map(|_| "custom"))
            .field("excluded_items", &self.excluded_items.len())
            .finish()
    }
}

impl<S: Shape, PC: Default> Config<S, PC> {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Shape, PC> Config<S, PC> {
    /// Sets the placer configuration.
    pub fn with_placer(mut self, placer: PC) -> Self {
        self.placer = placer;
        self
    }

    /// Sets the selection engine configuration.
    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    /// Sets the selection strategy.
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selector.strategy = strategy;
        self
    }

    /// Sets the plate ceiling.
    pub fn with_max_plates(mut self, max_plates: usize) -> Self {
        self.selector.max_plates = max_plates;
        self
    }

    /// Sets a custom scheduling order.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Item<S>, &Item<S>) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Adds an obstacle preloaded into every plate.
    pub fn with_excluded_item(mut self, item: Item<S>) -> Self {
        self.excluded_items.push(item);
        self
    }

    /// Returns the obstacles, flagged so they never show up in results.
    pub(crate) fn obstacles(&self) -> Vec<Item<S>> {
        self.excluded_items
            .iter()
            .cloned()
            .map(Item::as_obstacle)
            .collect()
    }
}

/// Progress callback, called with the number of items still to process.
pub type ProgressFn = Box<dyn Fn(u32) + Send + Sync>;

/// Stop predicate, polled between placement attempts.
pub type StopFn = Box<dyn Fn() -> bool + Send + Sync>;

/// Called with the item name whenever an item is marked unfit.
pub type UnfitFn = Box<dyn Fn(&str) + Send + Sync>;

/// Caller-side hooks of one run.
#[derive(Default)]
pub struct NestControl {
    /// Progress callback.
    pub progress_fn: Option<ProgressFn>,
    /// Stop predicate.
    pub stop_fn: Option<StopFn>,
    /// Unfit indicator.
    pub unfit_fn: Option<UnfitFn>,
}

impl NestControl {
    /// Creates an empty control (no callbacks, never stops).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the progress callback.
    pub fn with_progress(mut self, f: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.progress_fn = Some(Box::new(f));
        self
    }

    /// Sets the stop predicate.
    pub fn with_stop(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.stop_fn = Some(Box::new(f));
        self
    }

    /// Sets the unfit indicator.
    pub fn with_unfit(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.unfit_fn = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for NestControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestControl")
            .field("progress_fn", &self.progress_fn.is_some())
            .field("stop_fn", &self.stop_fn.is_some())
            .field("unfit_fn", &self.unfit_fn.is_some())
            .finish()
    }
}
