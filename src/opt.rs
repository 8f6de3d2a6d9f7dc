//! Local rewrites and dead gate removal.
//!
//! The optimizer only exploits what a single gate shows on its own fanins:
//! constant inputs and duplicated (or complemented) inputs. Everything deeper
//! is the business of structural hashing and SAT sweeping.

use crate::aig::{Aig, GateId, GateKind, Lit, Result};

impl Aig {
    /// Collapse AND gates made trivial by their fanins, to fixpoint. Returns
    /// the number of gates removed.
    ///
    /// Rewrites applied, in order of priority:
    /// - a constant-false fanin makes the gate constant false
    /// - a constant-true fanin makes the gate its other fanin
    /// - `x & x` is `x`, `x & !x` is constant false
    ///
    /// Each collapse rewires the gate's consumers, which can expose new
    /// trivial gates downstream; gates are visited fanins-first, so most
    /// cascades finish within one pass and the fixpoint loop rarely runs
    /// twice.
    pub fn optimize(&mut self) -> Result<usize> {
        let mut total = 0;
        loop {
            let mut changed = 0;
            for id in self.dfs.clone() {
                let gate = match self.gate(id) {
                    Some(gate) => gate,
                    None => continue,
                };
                let (e0, e1) = match *gate.kind() {
                    GateKind::And { fanin0, fanin1 } => (fanin0, fanin1),
                    _ => continue,
                };
                let collapse = if e0.is_const_false() || e1.is_const_false() {
                    Some((0, false))
                } else if e0.is_const_true() {
                    Some((e1.target(), e1.complement()))
                } else if e1.is_const_true() {
                    Some((e0.target(), e0.complement()))
                } else if e0.target() == e1.target() {
                    if e0.complement() == e1.complement() {
                        Some((e0.target(), e0.complement()))
                    } else {
                        Some((0, false))
                    }
                } else {
                    None
                };
                if let Some((new, inv)) = collapse {
                    log::debug!("optimize: {} absorbing {}", new, Lit::new(id, inv));
                    self.replace(id, new, inv)?;
                    changed += 1;
                }
            }
            if changed == 0 {
                break;
            }
            total += changed;
            self.rebuild_order();
        }
        log::info!("optimize removed {} gate(s)", total);
        Ok(total)
    }

    /// Remove every AND gate and undefined placeholder no output depends on.
    /// Inputs are kept even when unused. Returns the number of gates removed.
    pub fn sweep(&mut self) -> Result<usize> {
        self.rebuild_order();
        let generation = self.generation;
        let dead: Vec<GateId> = self
            .gate_ids()
            .filter(|&id| {
                self.gate(id)
                    .is_some_and(|g| (g.is_and() || g.is_undef()) && g.mark != generation)
            })
            .collect();
        for &id in &dead {
            self.remove_dead(id)?;
        }
        self.refresh_indexes();
        log::info!("sweep removed {} gate(s)", dead.len());
        Ok(dead.len())
    }
}
