//! SAT backend abstraction.
//!
//! The prover talks to a solver through the [`SatService`] trait: fresh
//! variables, AND-gate and XOR consistency constraints, one-literal
//! assumptions and model queries. [`CnfSolver`] is the bundled implementation
//! on top of an incremental CNF solver; tests substitute their own service to
//! script verdicts.

use varisat::{ExtendFormula, Solver};

use crate::aig::{AigError, Result};

/// An opaque solver variable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolverVar(pub(crate) usize);

/// Verdict of a [`SatService::solve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat,
    Unsat,
}

/// The solving interface the prover depends on.
///
/// Constraints accumulate monotonically; assumptions only scope the next
/// [`SatService::solve`] call, which is what lets one solver instance serve
/// every proof of a sweeping pass.
pub trait SatService {
    /// Allocate a fresh variable.
    fn new_variable(&mut self) -> SolverVar;

    /// Constrain `out` to equal the conjunction of the two (optionally
    /// inverted) inputs.
    fn assert_and_gate(
        &mut self,
        out: SolverVar,
        in0: SolverVar,
        inv0: bool,
        in1: SolverVar,
        inv1: bool,
    );

    /// Constrain `result` to equal the XOR of the two (optionally inverted)
    /// inputs.
    fn assert_xor_is_var(
        &mut self,
        result: SolverVar,
        a: SolverVar,
        inv_a: bool,
        b: SolverVar,
        inv_b: bool,
    );

    /// Assume a single literal for the next [`SatService::solve`] call,
    /// replacing any previous assumption.
    fn assume(&mut self, var: SolverVar, value: bool);

    /// Solve under the current constraints and assumption.
    fn solve(&mut self) -> Result<SolveResult>;

    /// Value of `var` in the model of the last satisfiable solve.
    fn value_of(&self, var: SolverVar) -> bool;
}

/// [`SatService`] implementation backed by an incremental CNF solver.
pub struct CnfSolver<'a> {
    solver: Solver<'a>,
    vars: Vec<varisat::Lit>,
    model: Vec<varisat::Lit>,
}

impl CnfSolver<'_> {
    pub fn new() -> Self {
        CnfSolver {
            solver: Solver::new(),
            vars: Vec::new(),
            model: Vec::new(),
        }
    }

    fn lit(&self, var: SolverVar, inverted: bool) -> varisat::Lit {
        let lit = self.vars[var.0];
        if inverted { !lit } else { lit }
    }
}

impl Default for CnfSolver<'_> {
    fn default() -> Self {
        CnfSolver::new()
    }
}

impl SatService for CnfSolver<'_> {
    fn new_variable(&mut self) -> SolverVar {
        let lit = self.solver.new_lit();
        self.vars.push(lit);
        SolverVar(self.vars.len() - 1)
    }

    fn assert_and_gate(
        &mut self,
        out: SolverVar,
        in0: SolverVar,
        inv0: bool,
        in1: SolverVar,
        inv1: bool,
    ) {
        let o = self.lit(out, false);
        let a = self.lit(in0, inv0);
        let b = self.lit(in1, inv1);
        self.solver.add_clause(&[!o, a]);
        self.solver.add_clause(&[!o, b]);
        self.solver.add_clause(&[o, !a, !b]);
    }

    fn assert_xor_is_var(
        &mut self,
        result: SolverVar,
        a: SolverVar,
        inv_a: bool,
        b: SolverVar,
        inv_b: bool,
    ) {
        let x = self.lit(result, false);
        let la = self.lit(a, inv_a);
        let lb = self.lit(b, inv_b);
        self.solver.add_clause(&[!la, !lb, !x]);
        self.solver.add_clause(&[la, lb, !x]);
        self.solver.add_clause(&[la, !lb, x]);
        self.solver.add_clause(&[!la, lb, x]);
    }

    fn assume(&mut self, var: SolverVar, value: bool) {
        self.solver.assume(&[self.lit(var, !value)]);
    }

    fn solve(&mut self) -> Result<SolveResult> {
        match self.solver.solve() {
            Ok(true) => {
                let model = self
                    .solver
                    .model()
                    .ok_or_else(|| AigError::Solver("satisfiable but no model".to_string()))?;
                self.model = model;
                Ok(SolveResult::Sat)
            }
            Ok(false) => Ok(SolveResult::Unsat),
            Err(e) => Err(AigError::Solver(e.to_string())),
        }
    }

    fn value_of(&self, var: SolverVar) -> bool {
        self.model.contains(&self.vars[var.0])
    }
}
