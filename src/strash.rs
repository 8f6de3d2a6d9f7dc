//! Structural hashing.
//!
//! Two AND gates computing the same function for the trivially detectable
//! reason that they have identical fanin edges are merged, keeping the one
//! seen first in DFS order. Fanin order does not matter, so the key is
//! computed over the sorted pair of fanin literals.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::aig::{Aig, GateKind, Lit, Result};

/// Order-insensitive key over a pair of fanin literals.
///
/// The sorted raw encodings are combined through the triangular pairing
/// `b * (b + 1) / 2 + a` (for `a <= b`), which is injective over the pair, so
/// two AND gates collide iff they have the same fanins with the same
/// polarities.
fn strash_key(f0: Lit, f1: Lit) -> u64 {
    let (a, b) = if f0.raw() <= f1.raw() {
        (f0.raw(), f1.raw())
    } else {
        (f1.raw(), f0.raw())
    };
    b * (b + 1) / 2 + a
}

impl Aig {
    /// Merge structurally identical AND gates and rebuild the DFS order.
    ///
    /// Gates are visited in the current DFS order and keyed on their *current*
    /// fanin edges, so a merge early in the order is seen by the keys of the
    /// gates downstream and cascades of duplicates collapse in a single call.
    /// Returns the number of gates merged away.
    pub fn strash(&mut self) -> Result<usize> {
        let mut table: HashMap<u64, u64> = HashMap::new();
        let mut merged = 0;

        for id in self.dfs.clone() {
            let gate = match self.gate(id) {
                Some(gate) => gate,
                None => continue,
            };
            let (fanin0, fanin1) = match gate.kind() {
                GateKind::And { fanin0, fanin1 } => (fanin0.lit(), fanin1.lit()),
                _ => continue,
            };
            match table.entry(strash_key(fanin0, fanin1)) {
                Entry::Occupied(entry) => {
                    let keep = *entry.get();
                    log::debug!("strash: {} merging {}", keep, id);
                    self.replace(id, keep, false)?;
                    merged += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }

        self.rebuild_order();
        log::info!("strash merged {} gate(s)", merged);
        Ok(merged)
    }
}
