//! Multi-plate first-fit selection.
//!
//! Items are attempted one at a time in scheduling order. Every open plate is
//! probed; among the plates that accept the item, the one with the lowest
//! "all plates" score wins. That score is the sum of the committed scores of
//! all earlier plates plus the probe score on the plate itself, which keeps
//! earlier plates filling up before later ones. A new plate is opened only
//! when no open plate accepts the item and the plate ceiling allows it.

use super::{
    collect_fixed, open_bin, probe_all, validate_config, Selection, SelectionBoilerplate, Store,
};
use crate::config::Config;
use crate::item::{default_order, Item, Shape};
use crate::placer::{PackResult, Placer};
use crate::Result;

/// First-fit selection with the "all plates" score tie-break.
pub struct FirstFitSelection<S: Shape> {
    base: SelectionBoilerplate<S>,
}

impl<S: Shape> Default for FirstFitSelection<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shape> FirstFitSelection<S> {
    /// Creates a selection without callbacks.
    pub fn new() -> Self {
        Self {
            base: SelectionBoilerplate::new(),
        }
    }
}

impl<S: Shape> Selection<S> for FirstFitSelection<S> {
    fn boilerplate(&self) -> &SelectionBoilerplate<S> {
        &self.base
    }

    fn boilerplate_mut(&mut self) -> &mut SelectionBoilerplate<S> {
        &mut self.base
    }

    fn pack_items<P: Placer<S>>(
        &mut self,
        items: &mut [Item<S>],
        bin: &P::Bin,
        config: &Config<S, P::Config>,
    ) -> Result<usize> {
        validate_config(config)?;
        let max_plates = config.selector.max_plates;
        let parallel = config.selector.parallel_probe;

        let fixed_bins = collect_fixed(items, max_plates)?;
        let obstacles = config.obstacles();

        self.base.clear();
        items.iter_mut().for_each(Item::reset_assignment);

        // Plates referenced by fixed items exist before anything is scheduled.
        let mut placers: Vec<P> = Vec::with_capacity(fixed_bins.len().max(1));
        for idx in 0..fixed_bins.len() {
            let placer: P = open_bin(
                idx,
                bin,
                config,
                fixed_bins.get(idx).map(Vec::as_slice),
                &obstacles,
            );
            self.base.refresh_bin(idx, placer.items());
            placers.push(placer);
        }

        let mut store = match &config.comparator {
            Some(order) => Store::new(items, |item| !item.is_fixed(), |a, b| order(a, b)),
            None => Store::new(items, |item| !item.is_fixed(), default_order),
        };
        let total = store.len();

        log::debug!(
            "First-fit: {} free items, {} fixed plates, plate ceiling {}",
            total,
            fixed_bins.len(),
            max_plates
        );

        let removed = self.base.remove_unpackable_items::<P>(&mut store, bin, config);
        if removed > 0 {
            log::debug!("First-fit: {} items cannot fit on an empty plate", removed);
        }

        let mut next_item_id: u32 = 0;
        let mut packed = 0;
        let mut cancelled = false;

        'items: for k in 0..total {
            if self.base.is_stopped() {
                cancelled = true;
                break;
            }
            if !store.get(k).bin_id().is_unset() {
                continue;
            }

            let mut first_fit: Option<(usize, PackResult<S>)> = None;
            let mut best: Option<(usize, PackResult<S>)> = None;
            let mut best_all_plates = f64::MAX;
            let mut scanned = 0;

            let choice = loop {
                if self.base.is_stopped() {
                    cancelled = true;
                    break 'items;
                }

                let results = probe_all(
                    &mut placers[scanned..],
                    store.get(k),
                    store.remaining(k),
                    parallel,
                );

                for (offset, result) in results.into_iter().enumerate() {
                    let idx = scanned + offset;
                    if !result.is_accepted() {
                        continue;
                    }
                    let all_plates = placers[..idx].iter().map(|p| p.score()).sum::<f64>()
                        + result.score();

                    if first_fit.is_none() {
                        first_fit = Some((idx, result.clone()));
                    }
                    if all_plates < best_all_plates {
                        best_all_plates = all_plates;
                        best = Some((idx, result));
                    }
                }
                scanned = placers.len();

                if best.is_some() {
                    break best.take();
                }

                if placers.len() < max_plates {
                    let idx = placers.len();
                    log::debug!("Opening plate {} for item '{}'", idx, store.get(k).name());
                    placers.push(open_bin(
                        idx,
                        bin,
                        config,
                        fixed_bins.get(idx).map(Vec::as_slice),
                        &obstacles,
                    ));
                    continue;
                }

                // Plate ceiling reached.
                break first_fit.take();
            };

            match choice {
                Some((idx, mut result)) => {
                    store.commit(k, idx, next_item_id, &mut result);
                    next_item_id += 1;
                    placers[idx].accept(result);
                    self.base.refresh_bin(idx, placers[idx].items());
                    self.base.set_last_packed(idx);
                    packed += 1;
                    self.base.report_progress(total - k - 1);
                }
                None => {
                    log::warn!(
                        "Item '{}' does not fit on any of {} plates",
                        store.get(k).name(),
                        placers.len()
                    );
                    self.base.mark_unfit(&mut store, k);
                }
            }
        }

        if cancelled {
            log::warn!("First-fit cancelled after {} of {} items", packed, total);
        }
        log::info!(
            "First-fit placed {} of {} items on {} plates, filled area {:.3}",
            packed,
            total,
            placers.len(),
            placers.iter().map(|p| p.filled_area()).sum::<f64>()
        );

        Ok(packed)
    }
}
