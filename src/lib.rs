//! Functionally reduced and-inverter graphs.
//!
//! An AIG represents combinational logic with two-input AND gates and
//! inverters carried on the edges. This crate ingests a netlist-level
//! description into an [`Aig`] and reduces it by merging gates proven to
//! compute the same function:
//!
//! - [`Aig::strash`] merges structurally identical gates,
//! - [`Aig::sim_patterns`] / [`Aig::sim_random`] build conjectured
//!   equivalence classes from bit-parallel simulation,
//! - [`Aig::fraig`] settles the conjectures with a SAT solver and merges the
//!   proven ones,
//! - [`Aig::optimize`] and [`Aig::sweep`] clean up trivial and unreachable
//!   gates.
//!
//! ```rust
//! use fraig::{Aig, Lit, Netlist};
//!
//! // f = a & b computed twice, once directly and once through a
//! // redundant second gate
//! let netlist = Netlist {
//!     max_var: 5,
//!     inputs: vec![1, 2],
//!     outputs: vec![Lit::new(3, false), Lit::new(5, false)],
//!     ands: vec![
//!         (3, Lit::new(1, false), Lit::new(2, false)),
//!         (5, Lit::new(1, false), Lit::new(3, false)),
//!     ],
//!     ..Default::default()
//! };
//! let mut aig = Aig::from_netlist(&netlist)?;
//!
//! aig.strash()?;
//! aig.sim_patterns(&["00", "01", "10", "11"])?;
//! aig.fraig()?;
//! aig.sweep()?;
//!
//! assert_eq!(aig.summary().ands, 1);
//! # Ok::<(), fraig::AigError>(())
//! ```

pub mod aig;
pub mod sat;

mod fec;
mod fraig;
mod opt;
mod sim;
mod strash;

pub use aig::{
    Aig, AigError, FaninSlot, Gate, GateEdge, GateId, GateKind, Lit, Netlist, Result, Summary,
};
pub use sat::{CnfSolver, SatService, SolveResult, SolverVar};
