//! Integrity checking utils for [`Aig`].
//!
//! Used a lot by tests after each transformation; the checks mirror the
//! structural invariants the mutation primitives are supposed to maintain.

use std::collections::HashMap;

use super::{Aig, AigError, GateId, Result};

impl Aig {
    /// Check the whole graph for structural consistency.
    ///
    /// Verified invariants:
    /// - the arena key of every gate matches its id, and gate 0 is the constant
    /// - the registered inputs/outputs have the matching kind
    /// - every fanin edge targets an existing gate
    /// - fanin/fanout symmetry with multiplicity: gate `t` lists consumer `c`
    ///   in its fanouts exactly as many times as `c` has fanin slots targeting
    ///   `t`
    /// - the cached DFS order is duplicate-free and postordered
    pub fn check_integrity(&self) -> Result<()> {
        let fail = |msg: String| Err(AigError::InvalidState(msg));

        match self.gates.get(&0) {
            Some(g) if g.is_const() => (),
            Some(_) => return fail("gate 0 is not the constant gate".to_string()),
            None => return fail("constant gate 0 is missing".to_string()),
        }

        for (&key, gate) in &self.gates {
            if key != gate.id {
                return fail(format!("gate {} stored under key {}", gate.id, key));
            }
            if gate.is_const() && key != 0 {
                return fail(format!("constant gate with id {} != 0", key));
            }
        }
        for &id in &self.inputs {
            if !self.gate_ok(id)?.is_input() {
                return fail(format!("registered input {} is not an input gate", id));
            }
        }
        for &id in &self.outputs {
            if !self.gate_ok(id)?.is_output() {
                return fail(format!("registered output {} is not an output gate", id));
            }
        }

        // Fanin side: count (target, consumer) references.
        let mut expected: HashMap<(GateId, GateId), usize> = HashMap::new();
        for gate in self.gates.values() {
            for edge in gate.fanins() {
                if !self.gates.contains_key(&edge.target) {
                    return fail(format!(
                        "gate {} consumes nonexistent gate {}",
                        gate.id, edge.target
                    ));
                }
                *expected.entry((edge.target, gate.id)).or_default() += 1;
            }
        }
        // Fanout side must match with multiplicity.
        let mut found: HashMap<(GateId, GateId), usize> = HashMap::new();
        for gate in self.gates.values() {
            for &consumer in &gate.fanouts {
                *found.entry((gate.id, consumer)).or_default() += 1;
            }
        }
        if expected != found {
            for (&(target, consumer), &n) in &expected {
                let m = found.get(&(target, consumer)).copied().unwrap_or(0);
                if n != m {
                    return fail(format!(
                        "gate {} consumes gate {} through {} slot(s) but appears {} time(s) in its fanouts",
                        consumer, target, n, m
                    ));
                }
            }
            for (&(target, consumer), &m) in &found {
                if !expected.contains_key(&(target, consumer)) {
                    return fail(format!(
                        "gate {} lists fanout {} ({} time(s)) without a matching fanin",
                        target, consumer, m
                    ));
                }
            }
        }

        // DFS order: existing, duplicate-free, postordered.
        let mut position: HashMap<GateId, usize> = HashMap::new();
        for (k, &id) in self.dfs.iter().enumerate() {
            if !self.gates.contains_key(&id) {
                return fail(format!("DFS order contains removed gate {}", id));
            }
            if position.insert(id, k).is_some() {
                return fail(format!("DFS order contains gate {} twice", id));
            }
        }
        for (&id, &k) in &position {
            for edge in self.gate_ok(id)?.fanins() {
                match position.get(&edge.target) {
                    Some(&j) if j < k => (),
                    Some(_) => {
                        return fail(format!(
                            "DFS order places gate {} before its fanin {}",
                            id, edge.target
                        ));
                    }
                    None => {
                        return fail(format!(
                            "DFS order contains gate {} but not its fanin {}",
                            id, edge.target
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
