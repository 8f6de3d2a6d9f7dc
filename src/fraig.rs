//! SAT sweeping.
//!
//! The prover turns the conjectured equivalence classes into merges: each
//! class member is checked against the class leading gate with an XOR miter;
//! an unsatisfiable miter proves the pair equal and merges the member away,
//! while a satisfiable one yields a distinguishing input vector that is queued
//! for the simulator to refine the remaining conjectures with.

use std::collections::HashMap;

use crate::aig::{Aig, AigError, GateId, GateKind, Lit, Result};
use crate::sat::{CnfSolver, SatService, SolveResult, SolverVar};

impl Aig {
    /// Prove or refute every surviving equivalence conjecture, merging the
    /// proven ones. Returns the number of gates merged away.
    ///
    /// Counterexamples from refuted conjectures are queued for
    /// [`Aig::sim_random`]; the classes themselves are dismissed at the end of
    /// the pass, so the usual cycle is simulate, fraig, simulate again.
    pub fn fraig(&mut self) -> Result<usize> {
        let mut solver = CnfSolver::new();
        self.fraig_with(&mut solver)
    }

    /// [`Aig::fraig`] against a caller-provided solving service.
    pub fn fraig_with<S: SatService>(&mut self, solver: &mut S) -> Result<usize> {
        let vars = self.encode(solver)?;

        let mut membership: HashMap<GateId, (usize, bool)> = HashMap::new();
        for (k, class) in self.fecs.iter().enumerate() {
            for &lit in class {
                membership.insert(lit.id(), (k, lit.is_inverted()));
            }
        }
        // A class containing the constant is led by it, whatever the DFS
        // order says, so proven-constant gates merge into gate 0.
        let mut leading: Vec<Option<Lit>> = self
            .fecs
            .iter()
            .map(|class| {
                class
                    .iter()
                    .find(|l| l.id() == 0)
                    .map(|l| Lit::constant(l.is_inverted()))
            })
            .collect();

        let mut merged = 0;
        let mut refuted = 0;
        for id in self.dfs.clone() {
            if id == 0 || !self.contains(id) {
                continue;
            }
            let Some(&(class, inverted)) = membership.get(&id) else {
                continue;
            };
            let lead = match leading[class] {
                None => {
                    leading[class] = Some(Lit::new(id, inverted));
                    continue;
                }
                Some(lead) => lead,
            };

            // The conjecture: this gate equals the leading gate up to the
            // relative polarity of their class memberships.
            let inv = inverted ^ lead.is_inverted();
            let miter = solver.new_variable();
            let lead_var = self.var_of(&vars, lead.id())?;
            let gate_var = self.var_of(&vars, id)?;
            solver.assert_xor_is_var(miter, lead_var, false, gate_var, inv);
            solver.assume(miter, true);
            match solver.solve()? {
                SolveResult::Unsat => {
                    log::debug!(
                        "fraig: {} merging {}",
                        lead.id(),
                        Lit::new(id, inv)
                    );
                    self.replace(id, lead.id(), inv)?;
                    merged += 1;
                }
                SolveResult::Sat => {
                    let row = self
                        .inputs()
                        .iter()
                        .map(|i| Ok(solver.value_of(self.var_of(&vars, *i)?)))
                        .collect::<Result<Vec<bool>>>()?;
                    self.cex_queue.push_back(row);
                    refuted += 1;
                }
            }
        }

        self.rebuild_order();
        self.fecs.clear();
        log::info!(
            "fraig merged {} gate(s), refuted {} conjecture(s)",
            merged,
            refuted
        );
        Ok(merged)
    }

    /// Encode the reachable subgraph into the solver: one variable per gate,
    /// the constant pinned to 0, AND consistency constraints in DFS order.
    /// Inputs and undefined placeholders stay unconstrained.
    fn encode<S: SatService>(&self, solver: &mut S) -> Result<HashMap<GateId, SolverVar>> {
        let mut vars = HashMap::new();

        let constant = solver.new_variable();
        solver.assert_and_gate(constant, constant, true, constant, false);
        vars.insert(0, constant);

        // Counterexample extraction reads every registered input, reachable
        // or not.
        for &input in self.inputs() {
            vars.insert(input, solver.new_variable());
        }

        for &id in &self.dfs {
            match *self.gate_ok(id)?.kind() {
                GateKind::Const | GateKind::Input | GateKind::Output { .. } => continue,
                GateKind::Undef => {
                    vars.insert(id, solver.new_variable());
                }
                GateKind::And { fanin0, fanin1 } => {
                    let out = solver.new_variable();
                    solver.assert_and_gate(
                        out,
                        self.var_of(&vars, fanin0.target)?,
                        fanin0.complement,
                        self.var_of(&vars, fanin1.target)?,
                        fanin1.complement,
                    );
                    vars.insert(id, out);
                }
            }
        }
        Ok(vars)
    }

    fn var_of(&self, vars: &HashMap<GateId, SolverVar>, id: GateId) -> Result<SolverVar> {
        vars.get(&id).copied().ok_or_else(|| {
            AigError::InvalidState(format!("gate {} was never encoded for the solver", id))
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, FaninSlot, Lit, Netlist};

    /// g3 = a & b and g5 = a & g3 are functionally equal but structurally
    /// different, so structural hashing cannot merge them.
    fn redundant_cone() -> Netlist {
        Netlist {
            max_var: 5,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(3, false), Lit::new(5, false)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (5, Lit::new(1, false), Lit::new(3, false)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn proves_and_merges_equivalent_gates() {
        let mut aig = Aig::from_netlist(&redundant_cone()).unwrap();
        aig.sim_patterns(&["00", "01", "10", "11"]).unwrap();
        assert_eq!(aig.fec_classes().len(), 1);

        let merged = aig.fraig().unwrap();
        aig.check_integrity().unwrap();

        assert_eq!(merged, 1);
        assert!(!aig.contains(5));
        assert_eq!(aig.summary().ands, 1);
        assert!(aig.fec_classes().is_empty());
        // the second output now reads the survivor directly
        let out = aig.outputs()[1];
        let edge = aig.gate(out).unwrap().fanin(FaninSlot::Fanin0).unwrap();
        assert_eq!(edge.target(), 3);
        assert!(!edge.complement());
    }

    #[test]
    fn merges_complement_members_with_inversion() {
        // g4 = !g3 & !g3 is !g3
        let n = Netlist {
            max_var: 4,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(4, false)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(3, true), Lit::new(3, true)),
            ],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.sim_patterns(&["00", "01", "10", "11"]).unwrap();

        let merged = aig.fraig().unwrap();
        aig.check_integrity().unwrap();

        assert_eq!(merged, 1);
        assert!(!aig.contains(4));
        // the output consumed g4 = !g3, so it now reads !g3
        let out = aig.outputs()[0];
        let edge = aig.gate(out).unwrap().fanin(FaninSlot::Fanin0).unwrap();
        assert_eq!(edge.target(), 3);
        assert!(edge.complement());
    }

    #[test]
    fn proven_constants_merge_into_gate_zero() {
        // g3 = a & !a == 0
        let n = Netlist {
            max_var: 3,
            inputs: vec![1],
            outputs: vec![Lit::new(3, true)],
            ands: vec![(3, Lit::new(1, false), Lit::new(1, true))],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.sim_patterns(&["0", "1"]).unwrap();

        let merged = aig.fraig().unwrap();
        aig.check_integrity().unwrap();

        assert_eq!(merged, 1);
        assert!(!aig.contains(3));
        // the output read !g3 and is now constant true
        let out = aig.outputs()[0];
        let edge = aig.gate(out).unwrap().fanin(FaninSlot::Fanin0).unwrap();
        assert!(edge.is_const_true());
    }

    #[test]
    fn refuted_conjectures_queue_counterexamples() {
        // g3 = a & b and g4 = !a & !b agree on the patterns "01" and "10"
        // (both 0) but are not equivalent.
        let n = Netlist {
            max_var: 4,
            inputs: vec![1, 2],
            outputs: vec![Lit::new(3, false), Lit::new(4, false)],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(1, true), Lit::new(2, true)),
            ],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        // a full batch, so no all-zero padding rows sneak in
        let patterns = ["01", "10"].repeat(8);
        aig.sim_patterns(&patterns).unwrap();
        // both gates (and the constant) still sit in one conjectured class
        assert_eq!(aig.fec_classes().len(), 1);
        assert_eq!(aig.fec_classes()[0].len(), 3);

        let merged = aig.fraig().unwrap();
        aig.check_integrity().unwrap();

        assert_eq!(merged, 0);
        assert_eq!(aig.summary().ands, 2);
        // each refuted conjecture produced an input vector of the right width
        assert_eq!(aig.cex_queue.len(), 2);
        for row in &aig.cex_queue {
            assert_eq!(row.len(), aig.inputs().len());
        }
    }

    #[test]
    fn reduction_preserves_the_output_function() {
        // a cone with structural duplicates (g5/g7 mirror g4/g6), a hidden
        // constant (g8 = a & !a) and a gate trivialized by it (g9 = g6 & !g8)
        let n = Netlist {
            max_var: 9,
            inputs: vec![1, 2, 3],
            outputs: vec![Lit::new(6, false), Lit::new(7, false), Lit::new(9, true)],
            ands: vec![
                (4, Lit::new(1, false), Lit::new(2, false)),
                (5, Lit::new(2, false), Lit::new(1, false)),
                (6, Lit::new(4, false), Lit::new(3, false)),
                (7, Lit::new(5, false), Lit::new(3, false)),
                (8, Lit::new(1, false), Lit::new(1, true)),
                (9, Lit::new(6, false), Lit::new(8, true)),
            ],
            ..Default::default()
        };
        let patterns = [
            "000", "001", "010", "011", "100", "101", "110", "111",
        ];

        let _ = env_logger::builder().is_test(true).try_init();
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.sim_patterns(&patterns).unwrap();
        let before: Vec<u16> = aig
            .outputs()
            .iter()
            .map(|&o| aig.gate(o).unwrap().sim_value())
            .collect();

        assert_eq!(aig.strash().unwrap(), 2);
        assert_eq!(aig.optimize().unwrap(), 2);
        aig.sim_patterns(&patterns).unwrap();
        aig.fraig().unwrap();
        aig.sweep().unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(aig.summary().ands, 2);

        aig.sim_patterns(&patterns).unwrap();
        let after: Vec<u16> = aig
            .outputs()
            .iter()
            .map(|&o| aig.gate(o).unwrap().sim_value())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn fraig_without_classes_is_a_no_op() {
        let mut aig = Aig::from_netlist(&redundant_cone()).unwrap();
        assert_eq!(aig.fraig().unwrap(), 0);
        aig.check_integrity().unwrap();
        assert_eq!(aig.summary().ands, 2);
    }
}
