//! A [`GateEdge`] points at a [`Gate`] and can be complemented (indicates the presence of an inverter).
//! A [`Lit`] is the packed form used by netlists and equivalence classes.
//!
//! [`Gate`]: crate::Gate

use std::fmt;
use std::ops::Not;

use super::GateId;

/// A signed gate reference, encoded as `id * 2 + inversion bit`.
///
/// This is the addressing unit of netlist fanins and of equivalence-class
/// members. The constant-0 gate yields the literals `0` (false) and `1`
/// (true).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lit(u64);

impl Lit {
    pub fn new(id: GateId, inverted: bool) -> Self {
        Lit(id * 2 + inverted as u64)
    }

    /// Build a literal from its packed netlist encoding.
    pub fn from_raw(raw: u64) -> Self {
        Lit(raw)
    }

    /// The literal of the constant gate: `0` for false, `1` for true.
    pub fn constant(value: bool) -> Self {
        Lit(value as u64)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn id(self) -> GateId {
        self.0 / 2
    }

    pub fn is_inverted(self) -> bool {
        self.0 % 2 == 1
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    /// Signed rendering used by equivalence-class reports: `12` or `!12`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inverted() {
            write!(f, "!{}", self.id())
        } else {
            write!(f, "{}", self.id())
        }
    }
}

/// A directed fanin edge: the consumed gate plus an optional inverter.
///
/// Edges are plain values; the graph they belong to resolves the target id.
///
/// ```rust
/// use fraig::{GateEdge, Lit};
/// let fanin_false = GateEdge::new(0, false);
/// let fanin_true = GateEdge::new(0, true);
/// assert_eq!(fanin_false, !fanin_true);
/// assert_eq!(fanin_true.lit(), Lit::constant(true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateEdge {
    pub(crate) target: GateId,
    pub(crate) complement: bool,
}

impl Not for GateEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl From<Lit> for GateEdge {
    fn from(lit: Lit) -> Self {
        GateEdge {
            target: lit.id(),
            complement: lit.is_inverted(),
        }
    }
}

impl GateEdge {
    pub fn new(target: GateId, complement: bool) -> Self {
        GateEdge { target, complement }
    }

    pub fn target(&self) -> GateId {
        self.target
    }

    pub fn complement(&self) -> bool {
        self.complement
    }

    pub fn lit(&self) -> Lit {
        Lit::new(self.target, self.complement)
    }

    pub fn is_const_false(&self) -> bool {
        self.target == 0 && !self.complement
    }

    pub fn is_const_true(&self) -> bool {
        self.target == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &GateEdge) -> bool {
        self.target == other.target && self.complement ^ other.complement
    }
}
