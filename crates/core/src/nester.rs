//! Arrangement front-end.
//!
//! [`Nester`] owns one selection strategy and the run configuration, applies
//! the minimum object distance around a run and exposes the result. [`nest`]
//! is the one-shot form.

use crate::config::{Config, NestControl, SelectionStrategy};
use crate::item::{Item, PackGroup, Shape};
use crate::placer::Placer;
use crate::selection::{FillerSelection, FirstFitSelection, Selection, SelectionBoilerplate};
use crate::{Error, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

enum Selector<S: Shape> {
    FirstFit(FirstFitSelection<S>),
    Filler(FillerSelection<S>),
}

impl<S: Shape> Selector<S> {
    fn new(strategy: SelectionStrategy) -> Self {
        match strategy {
            SelectionStrategy::FirstFit => Self::FirstFit(FirstFitSelection::new()),
            SelectionStrategy::Filler => Self::Filler(FillerSelection::new()),
        }
    }

    fn boilerplate(&self) -> &SelectionBoilerplate<S> {
        match self {
            Self::FirstFit(s) => s.boilerplate(),
            Self::Filler(s) => s.boilerplate(),
        }
    }

    fn boilerplate_mut(&mut self) -> &mut SelectionBoilerplate<S> {
        match self {
            Self::FirstFit(s) => s.boilerplate_mut(),
            Self::Filler(s) => s.boilerplate_mut(),
        }
    }

    fn pack_items<P: Placer<S>>(
        &mut self,
        items: &mut [Item<S>],
        bin: &P::Bin,
        config: &Config<S, P::Config>,
    ) -> Result<usize> {
        match self {
            Self::FirstFit(s) => s.pack_items::<P>(items, bin, config),
            Self::Filler(s) => s.pack_items::<P>(items, bin, config),
        }
    }
}

/// Arranges items onto plates with placer `P`.
///
/// # Example
///
/// ```rust,ignore
/// let mut nester: Nester<Polygon2D, BottomLeftPlacer> =
///     Nester::new(Bed2D::rectangle(220.0, 220.0), Config::new()).with_min_gap(6.0);
/// let packed = nester.execute(&mut items)?;
/// for (plate, group) in nester.last_result().iter().enumerate() { /* ... */ }
/// ```
pub struct Nester<S: Shape, P: Placer<S>> {
    bin: P::Bin,
    min_gap: f64,
    config: Config<S, P::Config>,
    selector: Selector<S>,
    cancelled: Arc<AtomicBool>,
}

impl<S: Shape, P: Placer<S>> Nester<S, P> {
    /// Creates a nester for plates described by `bin`.
    pub fn new(bin: P::Bin, config: Config<S, P::Config>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut selector = Selector::new(config.selector.strategy);
        {
            let cancelled = Arc::clone(&cancelled);
            selector
                .boilerplate_mut()
                .set_stop_predicate(move || cancelled.load(Ordering::Relaxed));
        }

        Self {
            bin,
            min_gap: 0.0,
            config,
            selector,
            cancelled,
        }
    }

    /// Sets the minimum distance kept between any two items.
    pub fn with_min_gap(mut self, min_gap: f64) -> Self {
        self.min_gap = min_gap;
        self
    }

    /// Installs the caller's callbacks.
    ///
    /// The stop predicate is polled together with [`cancel`](Self::cancel).
    pub fn with_control(mut self, mut control: NestControl) -> Self {
        let cancelled = Arc::clone(&self.cancelled);
        let user_stop = control.stop_fn.take();
        control.stop_fn = Some(Box::new(move || {
            cancelled.load(Ordering::Relaxed) || user_stop.as_ref().is_some_and(|stop| stop())
        }));
        self.selector.boilerplate_mut().set_control(control);
        self
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &Config<S, P::Config> {
        &self.config
    }

    /// Returns the minimum object distance.
    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Requests cancellation. Takes effect at the next poll point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns a handle that cancels this nester from another thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Runs the selection over `items`.
    ///
    /// Returns the number of items committed. Each item's `bin_id`,
    /// `item_id` and transform carry the outcome; the layout is available
    /// from [`last_result`](Self::last_result).
    pub fn execute(&mut self, items: &mut [Item<S>]) -> Result<usize> {
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(Error::ConfigError(format!(
                "min_gap must be a finite non-negative distance, got {}",
                self.min_gap
            )));
        }

        let inflation = self.min_gap / 2.0;
        let preset: Vec<f64> = items.iter().map(|item| item.inflation()).collect();
        if inflation > 0.0 {
            log::debug!("Inflating {} items by {:.3}", items.len(), inflation);
            items.iter_mut().for_each(|item| item.inflate(inflation));
        }

        let outcome = self
            .selector
            .pack_items::<P>(items, &self.bin, &self.config);

        if inflation > 0.0 {
            for (item, &original) in items.iter_mut().zip(&preset) {
                item.set_inflation(original);
            }
            self.selector
                .boilerplate_mut()
                .restore_inflation(items, inflation);
        }

        outcome
    }

    /// Returns the layout of the last run (partial if it was cancelled).
    pub fn last_result(&self) -> &PackGroup<S> {
        self.selector.boilerplate().result()
    }

    /// Returns the plate of the most recent commit.
    pub fn last_packed_bin_id(&self) -> Option<usize> {
        self.selector.boilerplate().last_packed_bin_id()
    }
}

/// Arranges `items` in one call.
///
/// Outcomes are written back to the items; returns the number committed.
pub fn nest<S: Shape, P: Placer<S>>(
    items: &mut [Item<S>],
    bin: P::Bin,
    min_gap: f64,
    config: Config<S, P::Config>,
    control: NestControl,
) -> Result<usize> {
    Nester::<S, P>::new(bin, config)
        .with_min_gap(min_gap)
        .with_control(control)
        .execute(items)
}
