//! Module defining the [`Aig`] struct, as well as [`Gate`], [`GateEdge`] and the other
//! graph-level types.
//!
//! The graph is an arena of gates addressed by stable integer id; all
//! cross-references (fanins, fanouts, orders, classes) are id lists. Every
//! structural mutation goes through [`Aig::connect`], [`Aig::disconnect`] or
//! [`Aig::replace`] so the fanin/fanout symmetry invariant is enforced in one
//! place.

pub mod dfs;
pub mod edge;
pub mod error;
mod integrity;
pub mod node;

use std::collections::{HashMap, HashSet, VecDeque};

pub use edge::{GateEdge, Lit};
pub use error::{AigError, Result};
pub use node::{FaninSlot, Gate, GateId, GateKind};

/// The value-level ingestion/emission interface of the engine.
///
/// An external reader produces a `Netlist` once (fixed counts, fanin literals,
/// optional ordinal-keyed symbols); an external writer consumes the one
/// produced by [`Aig::to_netlist`]. Ids are stable identifiers, never
/// serialization positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    /// Maximum variable index declared by the source description; input and
    /// AND ids must not exceed it. Output gates get ids above it.
    pub max_var: u64,
    /// Primary input ids, in declaration order.
    pub inputs: Vec<GateId>,
    /// One fanin literal per primary output, in declaration order.
    pub outputs: Vec<Lit>,
    /// AND gate rows: gate id and its two fanin literals.
    pub ands: Vec<(GateId, Lit, Lit)>,
    /// Optional symbolic names for inputs, keyed by ordinal position.
    pub input_names: Vec<(usize, String)>,
    /// Optional symbolic names for outputs, keyed by ordinal position.
    pub output_names: Vec<(usize, String)>,
}

/// Gate counts of the current graph, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub inputs: usize,
    pub outputs: usize,
    pub ands: usize,
}

/// A whole AIG plus the engine state layered on top of it: the DFS order, the
/// floating/unused indexes, the functional equivalence classes and the queue
/// of SAT counterexample vectors awaiting simulation.
///
/// Gates are created during ingestion only; the engine never synthesizes new
/// AND gates, it only merges and deletes. A gate dies when a merge or sweep
/// proves it redundant or unreachable: its fanouts are rewired to its
/// replacement (or dropped when dead), then it is removed from every index.
#[derive(Debug, Clone)]
pub struct Aig {
    pub(crate) gates: HashMap<GateId, Gate>,
    pub(crate) inputs: Vec<GateId>,
    pub(crate) outputs: Vec<GateId>,
    max_var: u64,
    names: HashMap<GateId, String>,
    /// Output-reachable gates, postorder. Rebuilt by [`Aig::rebuild_order`];
    /// each public transformation ends by rebuilding it.
    pub(crate) dfs: Vec<GateId>,
    pub(crate) floating: Vec<GateId>,
    pub(crate) unused: Vec<GateId>,
    /// Traversal generation counter. Incremented exactly once per traversal,
    /// before the traversal starts; never advanced by two logical passes at
    /// once.
    pub(crate) generation: u64,
    /// Functional equivalence classes: sets of signed gate references. A gate
    /// belongs to at most one class; singletons are pruned.
    pub(crate) fecs: Vec<Vec<Lit>>,
    /// Counterexample input vectors queued by the SAT prover, consumed by the
    /// simulator before any random generation.
    pub(crate) cex_queue: VecDeque<Vec<bool>>,
}

impl Aig {
    /// Create a brand new AIG (constant-0 gate included).
    pub fn new() -> Self {
        let gates = HashMap::from([(0, Gate::new(0, GateKind::Const))]);
        Aig {
            gates,
            inputs: Vec::new(),
            outputs: Vec::new(),
            max_var: 0,
            names: HashMap::new(),
            dfs: Vec::new(),
            floating: Vec::new(),
            unused: Vec::new(),
            generation: 0,
            fecs: Vec::new(),
            cex_queue: VecDeque::new(),
        }
    }

    /// Build the graph from a netlist description.
    ///
    /// Fanin literals whose target id was never declared materialize an
    /// [`GateKind::Undef`] placeholder gate rather than failing: the reference
    /// is "floating", not erroneous. Output gates are assigned ids
    /// `max_var + 1 + k` in declaration order.
    pub fn from_netlist(netlist: &Netlist) -> Result<Self> {
        let mut aig = Aig::new();
        aig.max_var = netlist.max_var;

        for &id in &netlist.inputs {
            aig.insert_declared(Gate::new(id, GateKind::Input))?;
            aig.inputs.push(id);
        }
        for &(id, l0, l1) in &netlist.ands {
            for lit in [l0, l1] {
                if lit.id() > netlist.max_var {
                    return Err(AigError::IdAboveMax {
                        id: lit.id(),
                        max_var: netlist.max_var,
                    });
                }
            }
            aig.insert_declared(Gate::new(
                id,
                GateKind::And {
                    fanin0: l0.into(),
                    fanin1: l1.into(),
                },
            ))?;
        }
        for (k, &lit) in netlist.outputs.iter().enumerate() {
            if lit.id() > netlist.max_var {
                return Err(AigError::IdAboveMax {
                    id: lit.id(),
                    max_var: netlist.max_var,
                });
            }
            let id = netlist.max_var + 1 + k as u64;
            aig.gates
                .insert(id, Gate::new(id, GateKind::Output { fanin: lit.into() }));
            aig.outputs.push(id);
        }

        // Wire the fanout side, materializing Undef placeholders on the way.
        let consumers: Vec<GateId> = netlist
            .ands
            .iter()
            .map(|&(id, _, _)| id)
            .chain(aig.outputs.iter().copied())
            .collect();
        for id in consumers {
            aig.link(id)?;
        }

        for (ordinal, name) in &netlist.input_names {
            let &gid = aig
                .inputs
                .get(*ordinal)
                .ok_or(AigError::SymbolOrdinal(*ordinal))?;
            aig.names.insert(gid, name.clone());
        }
        for (ordinal, name) in &netlist.output_names {
            let &gid = aig
                .outputs
                .get(*ordinal)
                .ok_or(AigError::SymbolOrdinal(*ordinal))?;
            aig.names.insert(gid, name.clone());
        }

        aig.rebuild_order();
        Ok(aig)
    }

    /// Serialize the DFS-reachable subgraph back into netlist form.
    ///
    /// Ids are emitted as-is; no fresh dense id space is computed.
    pub fn to_netlist(&self) -> Netlist {
        let mut ands = Vec::new();
        for &id in &self.dfs {
            if let Some(GateKind::And { fanin0, fanin1 }) = self.gates.get(&id).map(Gate::kind) {
                ands.push((id, fanin0.lit(), fanin1.lit()));
            }
        }
        let outputs = self
            .outputs
            .iter()
            .filter_map(|&id| Some(self.gates.get(&id)?.fanin(FaninSlot::Fanin0)?.lit()))
            .collect();
        let collect_names = |ids: &[GateId]| {
            ids.iter()
                .enumerate()
                .filter_map(|(k, id)| Some((k, self.names.get(id)?.clone())))
                .collect()
        };
        Netlist {
            max_var: self.max_var,
            inputs: self.inputs.clone(),
            outputs,
            ands,
            input_names: collect_names(&self.inputs),
            output_names: collect_names(&self.outputs),
        }
    }

    /// Retrieves a gate from its id.
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(&id)
    }

    pub fn contains(&self, id: GateId) -> bool {
        self.gates.contains_key(&id)
    }

    pub fn inputs(&self) -> &[GateId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[GateId] {
        &self.outputs
    }

    pub fn max_var(&self) -> u64 {
        self.max_var
    }

    /// The symbolic name of an input or output gate, if one was declared.
    pub fn name(&self, id: GateId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Gates with a floating (undefined) fanin, sorted.
    pub fn floating(&self) -> &[GateId] {
        &self.floating
    }

    /// Non-output gates no other gate consumes, sorted.
    pub fn unused(&self) -> &[GateId] {
        &self.unused
    }

    pub fn summary(&self) -> Summary {
        Summary {
            inputs: self.inputs.len(),
            outputs: self.outputs.len(),
            ands: self.gates.values().filter(|g| g.is_and()).count(),
        }
    }

    pub(crate) fn gate_ok(&self, id: GateId) -> Result<&Gate> {
        self.gates.get(&id).ok_or(AigError::GateDoesNotExist(id))
    }

    pub(crate) fn gate_mut_ok(&mut self, id: GateId) -> Result<&mut Gate> {
        self.gates
            .get_mut(&id)
            .ok_or(AigError::GateDoesNotExist(id))
    }

    pub(crate) fn gate_ids(&self) -> impl Iterator<Item = GateId> + '_ {
        self.gates.keys().copied()
    }

    fn insert_declared(&mut self, gate: Gate) -> Result<()> {
        let id = gate.id;
        if id == 0 {
            return Err(AigError::IdZeroReserved);
        }
        if id > self.max_var {
            return Err(AigError::IdAboveMax {
                id,
                max_var: self.max_var,
            });
        }
        if self.gates.contains_key(&id) {
            return Err(AigError::DuplicateId(id));
        }
        self.gates.insert(id, gate);
        Ok(())
    }

    /// Register `consumer` in the fanout list of each of its fanin targets,
    /// creating Undef placeholders for targets that were never declared.
    fn link(&mut self, consumer: GateId) -> Result<()> {
        let fanins = self.gate_ok(consumer)?.fanins();
        for e in fanins {
            if e.target == consumer {
                return Err(AigError::InvalidState(format!(
                    "gate {} references itself",
                    consumer
                )));
            }
            self.gates
                .entry(e.target)
                .or_insert_with(|| Gate::new(e.target, GateKind::Undef));
            self.gate_mut_ok(e.target)?.fanouts.push(consumer);
        }
        Ok(())
    }

    fn remove_fanout_entry(&mut self, target: GateId, consumer: GateId) -> Result<()> {
        let fanouts = &mut self.gate_mut_ok(target)?.fanouts;
        match fanouts.iter().position(|&id| id == consumer) {
            Some(pos) => {
                fanouts.remove(pos);
                Ok(())
            }
            None => Err(AigError::InvalidState(format!(
                "failed to remove fanout {} (not found) from gate {}",
                consumer, target
            ))),
        }
    }

    /// Point the given fanin slot of `consumer` at `target`, updating both
    /// adjacency sides: the slot's previous edge is detached from its target's
    /// fanout list and the new one attached.
    ///
    /// Nothing is mutated until every check has passed, so an error leaves the
    /// graph exactly as it was.
    pub fn connect(
        &mut self,
        consumer: GateId,
        slot: FaninSlot,
        target: GateId,
        complement: bool,
    ) -> Result<()> {
        if consumer == target {
            return Err(AigError::InvalidState(format!(
                "gate {} cannot consume itself",
                consumer
            )));
        }
        if !self.gates.contains_key(&target) {
            return Err(AigError::GateDoesNotExist(target));
        }
        let old = self
            .gate_ok(consumer)?
            .fanin(slot)
            .ok_or(AigError::NoFanin)?;
        self.remove_fanout_entry(old.target, consumer)?;
        if let Some(edge) = self.gate_mut_ok(consumer)?.fanin_mut(slot) {
            *edge = GateEdge::new(target, complement);
        }
        self.gate_mut_ok(target)?.fanouts.push(consumer);
        Ok(())
    }

    /// Detach one fanin edge of `consumer` and return it.
    ///
    /// The slot is re-pointed at the constant-0 gate, with both adjacency
    /// sides updated, so fanin/fanout symmetry holds between a disconnect and
    /// the [`Aig::connect`] that usually follows it on the same slot.
    pub fn disconnect(&mut self, consumer: GateId, slot: FaninSlot) -> Result<GateEdge> {
        let old = self
            .gate_ok(consumer)?
            .fanin(slot)
            .ok_or(AigError::NoFanin)?;
        self.remove_fanout_entry(old.target, consumer)?;
        if let Some(edge) = self.gate_mut_ok(consumer)?.fanin_mut(slot) {
            *edge = GateEdge::new(0, false);
        }
        self.gate_mut_ok(0)?.fanouts.push(consumer);
        Ok(old)
    }

    /// Rewire every fanout of `old` to consume `new` instead, composing
    /// `complement` into each rewired edge, then delete `old`.
    ///
    /// This is the sole primitive used by merge, sweep and optimize. `old`
    /// must be an AND gate (inputs, outputs and the constant are never
    /// merged away); violating this is a caller bug.
    pub fn replace(&mut self, old: GateId, new: GateId, complement: bool) -> Result<()> {
        if old == new {
            return Err(AigError::InvalidState(format!(
                "cannot replace gate {} by itself",
                old
            )));
        }
        if !self.gates.contains_key(&new) {
            return Err(AigError::GateDoesNotExist(new));
        }
        let fanins = {
            let gate = self.gate_ok(old)?;
            debug_assert!(gate.is_and(), "replace target must be an AND gate");
            gate.fanins()
        };
        for e in fanins {
            self.remove_fanout_entry(e.target, old)?;
        }

        let consumers = std::mem::take(&mut self.gate_mut_ok(old)?.fanouts);
        let mut seen = HashSet::new();
        for c in consumers {
            // The list carries one entry per referencing slot; rewiring scans
            // both slots at once, so handle each consumer a single time.
            if !seen.insert(c) {
                continue;
            }
            let mut rewired = 0;
            {
                let gate = self.gate_mut_ok(c)?;
                for slot in [FaninSlot::Fanin0, FaninSlot::Fanin1] {
                    if let Some(edge) = gate.fanin_mut(slot) {
                        if edge.target == old {
                            edge.target = new;
                            edge.complement ^= complement;
                            rewired += 1;
                        }
                    }
                }
            }
            let target = self.gate_mut_ok(new)?;
            for _ in 0..rewired {
                target.fanouts.push(c);
            }
        }

        self.gates.remove(&old);
        self.floating.retain(|&id| id != old);
        self.unused.retain(|&id| id != old);
        Ok(())
    }

    /// Delete a gate no output depends on. Its fanout entries (if any) point
    /// at gates that are themselves dead and queued for removal.
    pub(crate) fn remove_dead(&mut self, id: GateId) -> Result<()> {
        let fanins = self.gate_ok(id)?.fanins();
        for e in fanins {
            if self.gates.contains_key(&e.target) {
                self.remove_fanout_entry(e.target, id)?;
            }
        }
        self.gates.remove(&id);
        Ok(())
    }
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// inputs {1, 2}, g3 = 1 & 2, g4 = !1 & 2, outputs: g3, !g4
    pub(crate) fn small_netlist() -> Netlist {
        Netlist {
            max_var: 4,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(3, false), Lit::new(4, true)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(1, true), Lit::new(2, false)),
            ],
            input_names: vec![(0, "a".to_string()), (1, "b".to_string())],
            output_names: vec![],
        }
    }

    #[test]
    fn from_netlist_builds_symmetric_graph() {
        let aig = Aig::from_netlist(&small_netlist()).unwrap();
        aig.check_integrity().unwrap();

        assert_eq!(aig.inputs(), &[1, 2]);
        assert_eq!(aig.outputs(), &[5, 6]);
        assert_eq!(aig.summary().ands, 2);
        assert_eq!(aig.name(1), Some("a"));
        assert_eq!(aig.name(3), None);

        // input 2 feeds both AND gates
        let mut fanouts = aig.gate(2).unwrap().fanouts().to_vec();
        fanouts.sort_unstable();
        assert_eq!(fanouts, vec![3, 4]);
    }

    #[test]
    fn ingestion_errors() {
        let mut n = small_netlist();
        n.ands.push((3, Lit::new(1, false), Lit::new(1, false)));
        assert!(matches!(
            Aig::from_netlist(&n),
            Err(AigError::DuplicateId(3))
        ));

        let mut n = small_netlist();
        n.inputs.push(9);
        assert!(matches!(
            Aig::from_netlist(&n),
            Err(AigError::IdAboveMax { id: 9, .. })
        ));

        let mut n = small_netlist();
        n.inputs[0] = 0;
        assert!(matches!(
            Aig::from_netlist(&n),
            Err(AigError::IdZeroReserved)
        ));

        let mut n = small_netlist();
        n.input_names.push((5, "x".to_string()));
        assert!(matches!(
            Aig::from_netlist(&n),
            Err(AigError::SymbolOrdinal(5))
        ));
    }

    #[test]
    fn floating_fanin_materializes_undef() {
        // g3 = 1 & 4 where 4 was never declared
        let n = Netlist {
            max_var: 4,
            inputs: vec![1],
            outputs: vec![Lit::new(3, false)],
            ands: vec![(3, Lit::new(1, false), Lit::new(4, false))],
            ..Default::default()
        };
        let aig = Aig::from_netlist(&n).unwrap();
        aig.check_integrity().unwrap();

        let undef = aig.gate(4).unwrap();
        assert!(undef.is_undef());
        assert_eq!(undef.fanouts(), &[3]);
        assert_eq!(aig.floating(), &[3]);
    }

    #[test]
    fn connect_swaps_both_sides() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        // repoint g3's fanin1 from input 2 to the constant
        aig.connect(3, FaninSlot::Fanin1, 0, true).unwrap();
        aig.rebuild_order();
        aig.check_integrity().unwrap();
        assert_eq!(
            aig.gate(3).unwrap().fanin(FaninSlot::Fanin1),
            Some(GateEdge::new(0, true))
        );
        assert_eq!(aig.gate(2).unwrap().fanouts(), &[4]);
        assert_eq!(aig.gate(0).unwrap().fanouts(), &[3]);

        assert!(aig.connect(3, FaninSlot::Fanin1, 3, false).is_err());
        assert!(aig.connect(1, FaninSlot::Fanin0, 0, false).is_err()); // inputs have no fanin
        assert!(matches!(
            aig.connect(3, FaninSlot::Fanin0, 42, false),
            Err(AigError::GateDoesNotExist(42))
        ));
    }

    #[test]
    fn disconnect_then_connect_keeps_symmetry() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        let old = aig.disconnect(3, FaninSlot::Fanin1).unwrap();
        assert_eq!(old, GateEdge::new(2, false));
        // the slot is tied to the constant while detached
        assert_eq!(
            aig.gate(3).unwrap().fanin(FaninSlot::Fanin1),
            Some(GateEdge::new(0, false))
        );
        assert_eq!(aig.gate(0).unwrap().fanouts(), &[3]);
        aig.rebuild_order();
        aig.check_integrity().unwrap();

        // reattaching the same slot works and restores the fanout side
        aig.connect(3, FaninSlot::Fanin1, 2, true).unwrap();
        aig.rebuild_order();
        aig.check_integrity().unwrap();
        assert_eq!(
            aig.gate(3).unwrap().fanin(FaninSlot::Fanin1),
            Some(GateEdge::new(2, true))
        );
        assert!(aig.gate(0).unwrap().fanouts().is_empty());
        let mut fanouts = aig.gate(2).unwrap().fanouts().to_vec();
        fanouts.sort_unstable();
        assert_eq!(fanouts, vec![3, 4]);
    }

    #[test]
    fn disconnect_one_slot_of_a_double_reference() {
        // g4 = 3 & !3: detaching one slot must leave the other attached
        let n = Netlist {
            max_var: 4,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(4, false)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(3, false), Lit::new(3, true)),
            ],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        assert_eq!(aig.gate(3).unwrap().fanouts(), &[4, 4]);

        aig.disconnect(4, FaninSlot::Fanin1).unwrap();
        aig.connect(4, FaninSlot::Fanin1, 2, false).unwrap();
        aig.rebuild_order();
        aig.check_integrity().unwrap();

        // the untouched slot and its single fanout entry survived
        assert_eq!(
            aig.gate(4).unwrap().fanin(FaninSlot::Fanin0),
            Some(GateEdge::new(3, false))
        );
        assert_eq!(aig.gate(3).unwrap().fanouts(), &[4]);
        assert_eq!(aig.gate(2).unwrap().fanouts(), &[3, 4]);
    }

    #[test]
    fn failed_connect_leaves_the_graph_unchanged() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        assert!(matches!(
            aig.connect(3, FaninSlot::Fanin0, 42, false),
            Err(AigError::GateDoesNotExist(42))
        ));
        // no half-applied swap: slot and fanout side are untouched
        assert_eq!(
            aig.gate(3).unwrap().fanin(FaninSlot::Fanin0),
            Some(GateEdge::new(1, false))
        );
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_rewires_fanouts_with_polarity() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        // merge g4 into g3 recording an inversion
        aig.replace(4, 3, true).unwrap();
        aig.rebuild_order();
        aig.check_integrity().unwrap();

        assert!(aig.gate(4).is_none());
        // output 6 consumed !4, now consumes 3 with composed polarity
        assert_eq!(
            aig.gate(6).unwrap().fanin(FaninSlot::Fanin0),
            Some(GateEdge::new(3, false))
        );
        let fanouts = aig.gate(3).unwrap().fanouts();
        assert!(fanouts.contains(&5) && fanouts.contains(&6));
    }

    #[test]
    fn replace_handles_double_reference() {
        // g4 = 3 & !3 (both slots reference g3), output on g4
        let n = Netlist {
            max_var: 4,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(4, false)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(3, false), Lit::new(3, true)),
            ],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(aig.gate(3).unwrap().fanouts(), &[4, 4]);

        // merge g3 into input 1: both of g4's edges must follow
        aig.replace(3, 1, false).unwrap();
        aig.rebuild_order();
        aig.check_integrity().unwrap();
        assert_eq!(
            aig.gate(4).unwrap().fanin(FaninSlot::Fanin0),
            Some(GateEdge::new(1, false))
        );
        assert_eq!(
            aig.gate(4).unwrap().fanin(FaninSlot::Fanin1),
            Some(GateEdge::new(1, true))
        );
    }

    #[test]
    fn netlist_roundtrip_keeps_ids_stable() {
        let n = small_netlist();
        let aig = Aig::from_netlist(&n).unwrap();
        let out = aig.to_netlist();
        assert_eq!(out.max_var, n.max_var);
        assert_eq!(out.inputs, n.inputs);
        assert_eq!(out.outputs, n.outputs);
        let mut ands = out.ands.clone();
        ands.sort_unstable();
        assert_eq!(ands, n.ands);
        assert_eq!(out.input_names, n.input_names);
    }
}
