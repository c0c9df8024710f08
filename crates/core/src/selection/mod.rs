//! Item-to-bin selection strategies.
//!
//! A selection strategy decides which plate each item goes on and in which
//! order items are attempted. Geometry is delegated to a [`Placer`]; one
//! placer instance backs each open plate for the duration of a run.
//!
//! | Strategy | Plates compared per item | Revisits closed plates |
//! |----------|--------------------------|------------------------|
//! | [`FirstFitSelection`] | all open plates | yes |
//! | [`FillerSelection`] | current plate only | no |

pub mod filler;
pub mod first_fit;

pub use filler::FillerSelection;
pub use first_fit::FirstFitSelection;

use crate::config::{Config, NestControl, ProgressFn, StopFn, UnfitFn};
use crate::item::{BinId, Item, PackGroup, Shape};
use crate::placer::{PackResult, Placer};
use crate::{Error, Result};

use rayon::prelude::*;
use std::cmp::Ordering;

/// Common interface of the selection strategies.
pub trait Selection<S: Shape> {
    /// Shared state (result, callbacks).
    fn boilerplate(&self) -> &SelectionBoilerplate<S>;

    /// Mutable shared state.
    fn boilerplate_mut(&mut self) -> &mut SelectionBoilerplate<S>;

    /// Assigns `items` to plates described by `bin`.
    ///
    /// Returns the number of items committed during this run. Per-item outcomes
    /// are written to each item's `bin_id`/`item_id`.
    fn pack_items<P: Placer<S>>(
        &mut self,
        items: &mut [Item<S>],
        bin: &P::Bin,
        config: &Config<S, P::Config>,
    ) -> Result<usize>;

    /// Returns the current (possibly partial) layout.
    fn result(&self) -> &PackGroup<S> {
        self.boilerplate().result()
    }

    /// Returns the plate of the most recent commit.
    fn last_packed_bin_id(&self) -> Option<usize> {
        self.boilerplate().last_packed_bin_id()
    }

    /// Discards the previous result.
    fn clear(&mut self) {
        self.boilerplate_mut().clear();
    }
}

/// Result storage, progress and cancellation plumbing shared by all strategies.
pub struct SelectionBoilerplate<S: Shape> {
    packed_bins: PackGroup<S>,
    progress_fn: Option<ProgressFn>,
    stop_fn: Option<StopFn>,
    unfit_fn: Option<UnfitFn>,
    last_packed_bin: Option<usize>,
}

impl<S: Shape> Default for SelectionBoilerplate<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shape> SelectionBoilerplate<S> {
    /// Creates an empty boilerplate without callbacks.
    pub fn new() -> Self {
        Self {
            packed_bins: Vec::new(),
            progress_fn: None,
            stop_fn: None,
            unfit_fn: None,
            last_packed_bin: None,
        }
    }

    /// Returns the current (possibly partial) layout.
    pub fn result(&self) -> &PackGroup<S> {
        &self.packed_bins
    }

    /// Returns the plate of the most recent commit.
    pub fn last_packed_bin_id(&self) -> Option<usize> {
        self.last_packed_bin
    }

    /// Registers the progress callback.
    pub fn set_progress_callback(&mut self, f: impl Fn(u32) + Send + Sync + 'static) {
        self.progress_fn = Some(Box::new(f));
    }

    /// Registers the stop predicate.
    pub fn set_stop_predicate(&mut self, f: impl Fn() -> bool + Send + Sync + 'static) {
        self.stop_fn = Some(Box::new(f));
    }

    /// Registers the unfit indicator.
    pub fn set_unfit_callback(&mut self, f: impl Fn(&str) + Send + Sync + 'static) {
        self.unfit_fn = Some(Box::new(f));
    }

    /// Installs every hook of `control`, replacing the previous ones.
    pub fn set_control(&mut self, control: NestControl) {
        self.progress_fn = control.progress_fn;
        self.stop_fn = control.stop_fn;
        self.unfit_fn = control.unfit_fn;
    }

    /// Polls the stop predicate.
    pub fn is_stopped(&self) -> bool {
        self.stop_fn.as_ref().is_some_and(|stop| stop())
    }

    /// Discards the layout of the previous run.
    pub fn clear(&mut self) {
        self.packed_bins.clear();
        self.last_packed_bin = None;
    }

    /// Marks every item that cannot be placed even alone on an empty plate.
    ///
    /// Each unset item of `store` is probed on a throw-away placer holding only
    /// the configured obstacles. Degenerate items (`area <= 0`) are marked
    /// without a probe. Returns the number of items marked unfit.
    pub(crate) fn remove_unpackable_items<P: Placer<S>>(
        &self,
        store: &mut Store<'_, S>,
        bin: &P::Bin,
        config: &Config<S, P::Config>,
    ) -> usize {
        let obstacles = config.obstacles();
        let mut removed = 0;

        for k in 0..store.len() {
            if self.is_stopped() {
                break;
            }
            let item = store.get(k);
            if !item.bin_id().is_unset() {
                continue;
            }

            let fits = item.area() > 0.0 && {
                let mut placer = P::new(bin);
                placer.configure(&config.placer);
                placer.preload(&obstacles);
                let probe = item.clone();
                placer.pack(&probe, &[]).is_accepted()
            };

            if !fits {
                log::debug!(
                    "Item '{}' (area {:.3}) cannot be placed on an empty plate",
                    item.name(),
                    item.area()
                );
                self.mark_unfit(store, k);
                removed += 1;
            }
        }

        removed
    }

    pub(crate) fn mark_unfit(&self, store: &mut Store<'_, S>, k: usize) {
        store.mark_unfit(k);
        if let Some(unfit) = &self.unfit_fn {
            unfit(store.get(k).name());
        }
    }

    pub(crate) fn report_progress(&self, remaining: usize) {
        if let Some(progress) = &self.progress_fn {
            progress(u32::try_from(remaining).unwrap_or(u32::MAX));
        }
    }

    /// Replaces the snapshot of one plate, growing the layout as needed.
    pub(crate) fn refresh_bin(&mut self, idx: usize, items: Vec<Item<S>>) {
        if self.packed_bins.len() <= idx {
            self.packed_bins.resize_with(idx + 1, Vec::new);
        }
        self.packed_bins[idx] = items.into_iter().filter(|i| !i.is_obstacle()).collect();
    }

    pub(crate) fn set_last_packed(&mut self, idx: usize) {
        self.last_packed_bin = Some(idx);
    }

    /// Shifts the inflation of every item held in the layout.
    /// Copies each snapshot's clearance back from the input item it was
    /// cloned from. Snapshots without a source are deflated by `delta`.
    pub(crate) fn restore_inflation(&mut self, sources: &[Item<S>], delta: f64) {
        for item in self.packed_bins.iter_mut().flatten() {
            match sources.iter().find(|source| source.is_source_of(item)) {
                Some(source) => item.set_inflation(source.inflation()),
                None => item.inflate(-delta),
            }
        }
    }
}

/// Groups fixed items by their plate, rejecting pins the run cannot honor.
pub(crate) fn collect_fixed<S: Shape>(
    items: &[Item<S>],
    max_plates: usize,
) -> Result<Vec<Vec<Item<S>>>> {
    let mut fixed_bins: Vec<Vec<Item<S>>> = Vec::new();

    for item in items.iter().filter(|item| item.is_fixed()) {
        let idx = match item.bin_id() {
            BinId::Bin(idx) => idx,
            other => {
                return Err(Error::ConfigError(format!(
                    "Fixed item '{}' must reference a plate, found {:?}",
                    item.name(),
                    other
                )))
            }
        };
        if idx >= max_plates {
            return Err(Error::ConfigError(format!(
                "Fixed item '{}' references plate {} but only {} plates are allowed",
                item.name(),
                idx,
                max_plates
            )));
        }
        if fixed_bins.len() <= idx {
            fixed_bins.resize_with(idx + 1, Vec::new);
        }
        fixed_bins[idx].push(item.clone());
    }

    Ok(fixed_bins)
}

/// Rejects configurations that cannot start a run.
pub(crate) fn validate_config<S: Shape, PC>(config: &Config<S, PC>) -> Result<()> {
    if config.selector.max_plates == 0 {
        return Err(Error::ConfigError(
            "max_plates must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Creates the placer backing plate `idx`, seeded with the fixed items
/// destined for it and the obstacles.
pub(crate) fn open_bin<S: Shape, P: Placer<S>>(
    idx: usize,
    bin: &P::Bin,
    config: &Config<S, P::Config>,
    fixed: Option<&[Item<S>]>,
    obstacles: &[Item<S>],
) -> P {
    let mut placer = P::new(bin);
    placer.set_plate_id(idx);
    placer.configure(&config.placer);
    if let Some(fixed) = fixed.filter(|f| !f.is_empty()) {
        placer.preload(fixed);
    }
    if !obstacles.is_empty() {
        placer.preload(obstacles);
    }
    placer
}

/// Sorted working copy of the items a strategy schedules.
///
/// Placers see clones from the queue (so `remaining` is one contiguous
/// slice); every outcome is mirrored onto the caller's item immediately.
pub(crate) struct Store<'a, S: Shape> {
    items: &'a mut [Item<S>],
    queue: Vec<Item<S>>,
    origin: Vec<usize>,
}

impl<'a, S: Shape> Store<'a, S> {
    /// Collects the items accepted by `select`, stably sorted by `order`.
    pub(crate) fn new<F, O>(items: &'a mut [Item<S>], select: F, order: O) -> Self
    where
        F: Fn(&Item<S>) -> bool,
        O: Fn(&Item<S>, &Item<S>) -> Ordering,
    {
        let mut origin: Vec<usize> = (0..items.len()).filter(|&i| select(&items[i])).collect();
        origin.sort_by(|&a, &b| order(&items[a], &items[b]));
        let queue = origin.iter().map(|&i| items[i].clone()).collect();

        Self {
            items,
            queue,
            origin,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn get(&self, k: usize) -> &Item<S> {
        &self.queue[k]
    }

    /// Items scheduled after position `k`.
    pub(crate) fn remaining(&self, k: usize) -> &[Item<S>] {
        &self.queue[k + 1..]
    }

    pub(crate) fn mark_unfit(&mut self, k: usize) {
        self.queue[k].mark_unfit();
        self.items[self.origin[k]].mark_unfit();
    }

    /// Records a placement on the queue copy, the caller's item and the
    /// placer's clone inside `result`.
    pub(crate) fn commit(&mut self, k: usize, bin: usize, item_id: u32, result: &mut PackResult<S>) {
        let transform = result
            .item()
            .map(|placed| placed.transform().clone())
            .unwrap_or_default();

        if let Some(placed) = result.item_mut() {
            placed.set_bin_id(BinId::Bin(bin));
            placed.set_item_id(Some(item_id));
        }
        self.queue[k].commit(bin, item_id, transform.clone());
        self.items[self.origin[k]].commit(bin, item_id, transform);
    }
}

/// Probes `item` on every placer, in parallel when asked to.
///
/// Results come back in placer order either way.
pub(crate) fn probe_all<S, P>(
    placers: &mut [P],
    item: &Item<S>,
    remaining: &[Item<S>],
    parallel: bool,
) -> Vec<PackResult<S>>
where
    S: Shape,
    P: Placer<S>,
{
    if parallel && placers.len() > 1 {
        placers
            .par_iter_mut()
            .map(|placer| placer.pack(item, remaining))
            .collect()
    } else {
        placers
            .iter_mut()
            .map(|placer| placer.pack(item, remaining))
            .collect()
    }
}
