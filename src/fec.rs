//! Functional equivalence classes.
//!
//! A class groups signed gate references whose simulation signatures have
//! never disagreed. Classes only ever shrink or split ("refinement"); the SAT
//! prover later turns the surviving conjectures into merges.

use std::collections::HashMap;

use crate::aig::{Aig, Lit};

impl Aig {
    /// Conjectured equivalence classes, members rendered with their polarity
    /// relative to the class (e.g. `!12` for a complemented member).
    pub fn fec_classes(&self) -> &[Vec<Lit>] {
        &self.fecs
    }

    /// The classes as fixed-width signed-literal lists, one string per class,
    /// for reporting. Every literal is right-aligned to the widest one, so
    /// columns line up across classes.
    pub fn render_fec_classes(&self) -> Vec<String> {
        let width = self
            .fecs
            .iter()
            .flatten()
            .map(|lit| lit.to_string().len())
            .max()
            .unwrap_or(0);
        self.fecs
            .iter()
            .map(|class| {
                class
                    .iter()
                    .map(|lit| format!("{:>width$}", lit.to_string()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Seed the initial conjecture if no classes exist yet: one class holding
    /// the constant and every reachable AND gate, all in positive polarity.
    ///
    /// The constant comes first so that gates proven constant merge into gate
    /// 0 rather than into an arbitrary class member.
    pub(crate) fn ensure_fec_seed(&mut self) {
        if !self.fecs.is_empty() {
            return;
        }
        let mut class = vec![Lit::constant(false)];
        for &id in &self.dfs {
            if self.gate(id).is_some_and(|g| g.is_and()) {
                class.push(Lit::new(id, false));
            }
        }
        if class.len() >= 2 {
            self.fecs.push(class);
        }
    }

    /// Split every class by the current simulation signatures.
    ///
    /// Members whose signature is the bitwise complement of an existing
    /// bucket's fold into that bucket with flipped polarity, so `x` and `!y`
    /// stay conjoined when `x == !y` holds under every pattern so far.
    /// Buckets reduced to a single member are dropped, as are members whose
    /// gate no longer exists.
    pub(crate) fn refine_fecs(&mut self) {
        let classes = std::mem::take(&mut self.fecs);
        for class in classes {
            let mut buckets: Vec<Vec<Lit>> = Vec::new();
            let mut index: HashMap<u16, usize> = HashMap::new();
            for lit in class {
                let sig = match self.signature(lit) {
                    Some(sig) => sig,
                    None => continue,
                };
                if let Some(&k) = index.get(&sig) {
                    buckets[k].push(lit);
                } else if let Some(&k) = index.get(&!sig) {
                    buckets[k].push(!lit);
                } else {
                    index.insert(sig, buckets.len());
                    buckets.push(vec![lit]);
                }
            }
            for members in buckets {
                if members.len() >= 2 {
                    self.fecs.push(members);
                }
            }
        }
    }

    /// The member's signature under the latest batch, with its polarity
    /// applied. `None` if the gate was merged away.
    fn signature(&self, lit: Lit) -> Option<u16> {
        let value = self.gate(lit.id())?.sim_value();
        Some(if lit.is_inverted() { !value } else { value })
    }
}
