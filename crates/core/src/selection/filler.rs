//! Single-pass greedy filling.
//!
//! Items are attempted largest first against the current plate only. When the
//! current plate rejects an item it is closed for good and a fresh plate takes
//! its place; closed plates are never revisited.

use super::{collect_fixed, open_bin, validate_config, Selection, SelectionBoilerplate, Store};
use crate::config::Config;
use crate::item::{area_order, Item, Shape};
use crate::placer::Placer;
use crate::Result;

/// Greedy one-plate-at-a-time selection.
pub struct FillerSelection<S: Shape> {
    base: SelectionBoilerplate<S>,
}

impl<S: Shape> Default for FillerSelection<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shape> FillerSelection<S> {
    /// Creates a selection without callbacks.
    pub fn new() -> Self {
        Self {
            base: SelectionBoilerplate::new(),
        }
    }
}

impl<S: Shape> Selection<S> for FillerSelection<S> {
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
        let fixed: usize = collect_fixed(items, max_plates)?.iter().map(Vec::len).sum();

        self.base.clear();
        items.iter_mut().for_each(Item::reset_assignment);

        if fixed > 0 {
            log::warn!("Filler does not schedule fixed items, leaving {} untouched", fixed);
        }

        let obstacles = config.obstacles();
        let mut store = Store::new(items, |item| !item.is_fixed(), area_order);
        let total = store.len();

        log::debug!("Filler: {} items, plate ceiling {}", total, max_plates);

        let removed = self.base.remove_unpackable_items::<P>(&mut store, bin, config);
        if removed > 0 {
            log::debug!("Filler: {} items cannot fit on an empty plate", removed);
        }

        let mut plate = 0;
        let mut placer: P = open_bin(plate, bin, config, None, &obstacles);
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

            loop {
                if self.base.is_stopped() {
                    cancelled = true;
                    break 'items;
                }

                let mut result = placer.pack(store.get(k), store.remaining(k));
                if result.is_accepted() {
                    store.commit(k, plate, next_item_id, &mut result);
                    next_item_id += 1;
                    placer.accept(result);
                    self.base.refresh_bin(plate, placer.items());
                    self.base.set_last_packed(plate);
                    packed += 1;
                    self.base.report_progress(total - k - 1);
                    break;
                }

                if placer.packed_size() == 0 || plate + 1 >= max_plates {
                    log::warn!(
                        "Item '{}' does not fit on plate {}",
                        store.get(k).name(),
                        plate
                    );
                    self.base.mark_unfit(&mut store, k);
                    break;
                }

                // Close the current plate and retry on a fresh one.
                plate += 1;
                log::debug!("Opening plate {} for item '{}'", plate, store.get(k).name());
                placer.clear_items();
                placer.set_plate_id(plate);
                if !obstacles.is_empty() {
                    placer.preload(&obstacles);
                }
            }
        }

        if cancelled {
            log::warn!("Filler cancelled after {} of {} items", packed, total);
        }
        log::info!(
            "Filler placed {} of {} items on {} plates",
            packed,
            total,
            self.base.result().len()
        );

        Ok(packed)
    }
}
