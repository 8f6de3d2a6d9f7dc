//! DFS utils for [`Aig`].
//!
//! The engine keeps a cached postorder of the output-reachable subgraph. Every
//! public transformation ends by rebuilding it, so "reachable" and "ordered
//! before its consumers" can be assumed by simulation, hashing and proving.

use super::{Aig, GateId};

impl Aig {
    /// Recompute the DFS postorder from the outputs and refresh the
    /// floating/unused reports.
    ///
    /// Advances the generation counter exactly once; a gate was reached iff
    /// its mark equals the new generation. `Undef` placeholders reachable
    /// through a floating fanin are stamped and ordered like any other gate,
    /// so the sweep never deletes a placeholder something still consumes.
    pub fn rebuild_order(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let mut order = Vec::with_capacity(self.dfs.len());
        for out in self.outputs.clone() {
            self.visit(out, generation, &mut order);
        }
        self.dfs = order;
        self.refresh_indexes();
    }

    /// Iterative postorder from `root`, appending newly reached gates.
    fn visit(&mut self, root: GateId, generation: u64, order: &mut Vec<GateId>) {
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            let gate = match self.gates.get_mut(&id) {
                Some(gate) => gate,
                None => continue,
            };
            if gate.mark == generation {
                continue;
            }
            gate.mark = generation;
            stack.push((id, true));
            for edge in self.gates[&id].fanins() {
                let reached = self
                    .gates
                    .get(&edge.target)
                    .is_some_and(|g| g.mark == generation);
                if !reached {
                    stack.push((edge.target, false));
                }
            }
        }
    }

    /// Output-reachable gates, fanins before consumers.
    pub fn dfs_order(&self) -> &[GateId] {
        &self.dfs
    }

    /// Position of a gate in the current order, `None` if it is unreachable.
    pub fn order_position(&self, id: GateId) -> Option<usize> {
        self.dfs.iter().position(|&x| x == id)
    }

    /// Recompute the floating and unused gate reports (both sorted).
    pub(crate) fn refresh_indexes(&mut self) {
        let mut floating: Vec<GateId> = self
            .gates
            .values()
            .filter(|g| {
                g.fanins()
                    .iter()
                    .any(|e| self.gates.get(&e.target).is_none_or(|t| t.is_undef()))
            })
            .map(|g| g.id)
            .collect();
        floating.sort_unstable();
        self.floating = floating;

        let mut unused: Vec<GateId> = self
            .gates
            .values()
            .filter(|g| (g.is_input() || g.is_and()) && g.fanouts.is_empty())
            .map(|g| g.id)
            .collect();
        unused.sort_unstable();
        self.unused = unused;
    }
}
