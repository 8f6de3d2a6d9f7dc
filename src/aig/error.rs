use thiserror::Error;

use super::GateId;

/// The result of a graph operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when a graph operation failed.
///
/// Pattern errors are ordinary recoverable failures: the offending call aborts
/// and the graph is left unchanged. [`AigError::InvalidState`] is reserved for
/// broken internal invariants and indicates a bug in this crate or a violated
/// caller contract.
#[derive(Debug, Error)]
pub enum AigError {
    /// A different gate with the given id already exists.
    #[error("a different gate with id={0} already exists")]
    DuplicateId(GateId),

    /// The id 0 is reserved for the constant-0 gate only.
    #[error("id=0 is reserved for the constant gate")]
    IdZeroReserved,

    /// A declared gate id exceeds the netlist's maximum variable index.
    #[error("gate id={id} exceeds the declared maximum variable index {max_var}")]
    IdAboveMax { id: GateId, max_var: u64 },

    /// The gate with the given id does not exist.
    #[error("gate with id={0} does not exist")]
    GateDoesNotExist(GateId),

    /// Invalid operation on a gate which does not have the requested fanin
    /// slot. Output gates only have [`FaninSlot::Fanin0`].
    ///
    /// [`FaninSlot::Fanin0`]: super::FaninSlot::Fanin0
    #[error("the gate has no such fanin slot")]
    NoFanin,

    /// A symbolic name refers to an input/output ordinal that does not exist.
    #[error("symbol ordinal {0} is out of range")]
    SymbolOrdinal(usize),

    /// A simulation pattern has the wrong width.
    #[error(
        "pattern ({pattern}) length ({width}) does not match the number of inputs ({expected}) in the circuit"
    )]
    PatternWidth {
        pattern: String,
        width: usize,
        expected: usize,
    },

    /// A simulation pattern contains a character outside `{0, 1}`.
    #[error("pattern ({pattern}) contains a non-0/1 character ('{found}')")]
    PatternAlphabet { pattern: String, found: char },

    /// The external SAT service failed.
    #[error("solver error: {0}")]
    Solver(String),

    /// The graph has reached an invalid state. This should never happen.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),
}
