use std::collections::VecDeque;

use super::{GateEdge, Lit};

/// A gate id.
///
/// The constant-0 gate has id 0 by convention. Ids are unique and stable: they
/// survive every transformation and are never re-densified on emission.
pub type GateId = u64;

/// How many recent 16-bit simulation signatures each gate retains.
pub(crate) const HISTORY_LEN: usize = 4;

/// Unambiguous fanin slot selector.
///
/// AND gates have both slots, output gates only [`FaninSlot::Fanin0`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaninSlot {
    Fanin0,
    Fanin1,
}

impl From<usize> for FaninSlot {
    fn from(value: usize) -> Self {
        match value {
            0 => FaninSlot::Fanin0,
            1 => FaninSlot::Fanin1,
            _ => panic!("could not create FaninSlot from value={}", value),
        }
    }
}

/// The closed set of gate variants.
///
/// `Undef` gates are placeholders materialized for fanin literals whose target
/// was never declared ("floating fanins"); they behave as free Boolean
/// variables in simulation and SAT proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// The constant low/false signal, always gate 0.
    Const,
    /// A primary input.
    Input,
    /// A primary output with a single fanin.
    Output { fanin: GateEdge },
    /// An AND gate with two fanins.
    And { fanin0: GateEdge, fanin1: GateEdge },
    /// A referenced but never-declared gate.
    Undef,
}

/// A gate node owned by the [`Aig`] arena.
///
/// Besides its variant, a gate carries its fanout adjacency (with
/// multiplicity: a consumer referencing this gate from both slots appears
/// twice), the traversal stamp compared against the graph-wide generation
/// counter, and its simulation state.
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone)]
pub struct Gate {
    pub(crate) id: GateId,
    pub(crate) kind: GateKind,
    pub(crate) fanouts: Vec<GateId>,
    /// Traversal stamp; equal to the owning graph's generation counter iff the
    /// gate was reached by the last order rebuild.
    pub(crate) mark: u64,
    /// Packed signatures of the current 16-pattern simulation batch (bit k is
    /// this gate's output under pattern k).
    pub(crate) value: u16,
    /// Rolling window of recent batch signatures, for diagnostic replay.
    pub(crate) history: VecDeque<u16>,
}

impl Gate {
    pub(crate) fn new(id: GateId, kind: GateKind) -> Self {
        Gate {
            id,
            kind,
            fanouts: Vec::new(),
            mark: 0,
            value: 0,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn id(&self) -> GateId {
        self.id
    }

    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, GateKind::Const)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, GateKind::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.kind, GateKind::Output { .. })
    }

    pub fn is_and(&self) -> bool {
        matches!(self.kind, GateKind::And { .. })
    }

    pub fn is_undef(&self) -> bool {
        matches!(self.kind, GateKind::Undef)
    }

    /// Fanin edges of this gate: two for AND gates, one for outputs, none
    /// otherwise.
    pub fn fanins(&self) -> Vec<GateEdge> {
        match self.kind {
            GateKind::Output { fanin } => vec![fanin],
            GateKind::And { fanin0, fanin1 } => vec![fanin0, fanin1],
            _ => vec![],
        }
    }

    pub fn fanin(&self, slot: FaninSlot) -> Option<GateEdge> {
        match (&self.kind, slot) {
            (GateKind::And { fanin0, .. }, FaninSlot::Fanin0) => Some(*fanin0),
            (GateKind::And { fanin1, .. }, FaninSlot::Fanin1) => Some(*fanin1),
            (GateKind::Output { fanin }, FaninSlot::Fanin0) => Some(*fanin),
            _ => None,
        }
    }

    pub(crate) fn fanin_mut(&mut self, slot: FaninSlot) -> Option<&mut GateEdge> {
        match (&mut self.kind, slot) {
            (GateKind::And { fanin0, .. }, FaninSlot::Fanin0) => Some(fanin0),
            (GateKind::And { fanin1, .. }, FaninSlot::Fanin1) => Some(fanin1),
            (GateKind::Output { fanin }, FaninSlot::Fanin0) => Some(fanin),
            _ => None,
        }
    }

    /// Ids of the gates consuming this gate as a fanin, with multiplicity.
    pub fn fanouts(&self) -> &[GateId] {
        &self.fanouts
    }

    /// This gate's literal with the given polarity.
    pub fn lit(&self, inverted: bool) -> Lit {
        Lit::new(self.id, inverted)
    }

    /// The signature of the most recent simulation batch.
    pub fn sim_value(&self) -> u16 {
        self.value
    }

    /// Recent batch signatures, oldest first.
    pub fn sim_history(&self) -> impl Iterator<Item = u16> + '_ {
        self.history.iter().copied()
    }

    pub(crate) fn push_history(&mut self, value: u16) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(value);
    }
}
