//! Bit-parallel simulation.
//!
//! Patterns are simulated 16 at a time: each gate carries a packed [`u16`]
//! signature whose bit `k` is the gate's output under pattern `k` of the
//! current batch. Equivalence classes are refined against the signatures after
//! every batch.

use rand::RngCore;

use crate::aig::{Aig, AigError, GateKind, Result};

/// Patterns per simulation batch, the width of a packed signature.
pub(crate) const BATCH: usize = 16;

/// Additive stride of the internal pattern generator (a large prime), so
/// consecutive chunks never fall into a short cycle.
const PATTERN_STRIDE: u32 = 27_644_437;

/// Random simulation stops after this many consecutive batches without any
/// class refinement.
const STALE_ROUND_LIMIT: usize = 30;

/// Deterministic generator of pattern chunks, seeded once per random
/// simulation run.
struct PatternStream {
    state: u32,
    buffer: u16,
    remaining: usize,
}

impl PatternStream {
    fn new(seed: u32) -> Self {
        PatternStream {
            state: seed,
            buffer: 0,
            remaining: 0,
        }
    }

    /// Next packed 16-pattern chunk: the low 16 bits of the state, which then
    /// advances by the prime stride.
    fn next_chunk(&mut self) -> u16 {
        let chunk = self.state as u16;
        self.state = self.state.wrapping_add(PATTERN_STRIDE);
        chunk
    }

    fn next_bit(&mut self) -> bool {
        if self.remaining == 0 {
            self.buffer = self.next_chunk();
            self.remaining = 16;
        }
        let bit = self.buffer & 1 == 1;
        self.buffer >>= 1;
        self.remaining -= 1;
        bit
    }

    /// One input row of `width` random bits.
    fn next_row(&mut self, width: usize) -> Vec<bool> {
        (0..width).map(|_| self.next_bit()).collect()
    }
}

impl Aig {
    /// Simulate explicit patterns, refining the equivalence classes after each
    /// 16-pattern batch. Returns the number of patterns simulated.
    ///
    /// Every pattern is validated before anything is simulated, so a malformed
    /// row leaves the classes untouched. A partial final batch is padded with
    /// all-zero rows. Undefined placeholder gates hold the value 0.
    pub fn sim_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<usize> {
        let rows: Vec<Vec<bool>> = patterns
            .iter()
            .map(|p| self.parse_pattern(p.as_ref()))
            .collect::<Result<_>>()?;

        self.ensure_fec_seed();
        let width = self.inputs().len();
        for chunk in rows.chunks(BATCH) {
            let mut batch = chunk.to_vec();
            batch.resize(BATCH, vec![false; width]);
            self.simulate_batch(&batch, None)?;
            self.refine_fecs();
            self.record_history();
        }
        log::info!(
            "{} pattern(s) simulated, {} equivalence class(es)",
            rows.len(),
            self.fecs.len()
        );
        Ok(rows.len())
    }

    /// Simulate random patterns until the classes stop refining.
    ///
    /// Counterexample rows queued by the prover are consumed first, before any
    /// random generation. The run ends after [`STALE_ROUND_LIMIT`] consecutive
    /// batches without refinement, or once roughly four patterns per graph
    /// variable have been simulated. Undefined placeholder gates act as free
    /// variables and receive random signatures of their own. Returns the
    /// number of patterns simulated.
    pub fn sim_random(&mut self, rng: &mut impl RngCore) -> Result<usize> {
        self.ensure_fec_seed();
        let mut stream = PatternStream::new(rng.next_u32());
        let width = self.inputs().len();
        let limit = usize::max(4 * self.max_var() as usize, 4 * BATCH);
        let mut simulated = 0;
        let mut stale_rounds = 0;

        while stale_rounds < STALE_ROUND_LIMIT && simulated < limit {
            let before = self.class_shape();
            let mut batch = Vec::with_capacity(BATCH);
            while batch.len() < BATCH {
                match self.cex_queue.pop_front() {
                    Some(row) => batch.push(row),
                    None => batch.push(stream.next_row(width)),
                }
            }
            self.simulate_batch(&batch, Some(&mut stream))?;
            self.refine_fecs();
            self.record_history();
            simulated += BATCH;
            if self.class_shape() == before {
                stale_rounds += 1;
            } else {
                stale_rounds = 0;
            }
        }

        log::info!(
            "{} random pattern(s) simulated, {} equivalence class(es)",
            simulated,
            self.fecs.len()
        );
        Ok(simulated)
    }

    fn parse_pattern(&self, pattern: &str) -> Result<Vec<bool>> {
        let expected = self.inputs().len();
        let width = pattern.chars().count();
        if width != expected {
            return Err(AigError::PatternWidth {
                pattern: pattern.to_string(),
                width,
                expected,
            });
        }
        pattern
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(AigError::PatternAlphabet {
                    pattern: pattern.to_string(),
                    found,
                }),
            })
            .collect()
    }

    /// Evaluate one 16-row batch over the DFS order. Row `k` of `batch` drives
    /// bit `k` of every signature.
    fn simulate_batch(
        &mut self,
        batch: &[Vec<bool>],
        mut undef_stream: Option<&mut PatternStream>,
    ) -> Result<()> {
        debug_assert_eq!(batch.len(), BATCH);

        for (col, &input) in self.inputs.clone().iter().enumerate() {
            let mut value: u16 = 0;
            for (k, row) in batch.iter().enumerate() {
                if row.get(col).copied().unwrap_or(false) {
                    value |= 1 << k;
                }
            }
            self.gate_mut_ok(input)?.value = value;
        }

        for id in self.dfs.clone() {
            let gate = self.gate_ok(id)?;
            let value = match *gate.kind() {
                GateKind::Const => 0,
                GateKind::Input => continue,
                GateKind::Undef => match undef_stream {
                    Some(ref mut stream) => stream.next_chunk(),
                    None => 0,
                },
                GateKind::Output { fanin } => {
                    let v = self.gate_ok(fanin.target)?.value;
                    if fanin.complement { !v } else { v }
                }
                GateKind::And { fanin0, fanin1 } => {
                    let v0 = self.gate_ok(fanin0.target)?.value;
                    let v1 = self.gate_ok(fanin1.target)?.value;
                    let m0 = if fanin0.complement { 0xFFFF } else { 0 };
                    let m1 = if fanin1.complement { 0xFFFF } else { 0 };
                    (v0 ^ m0) & (v1 ^ m1)
                }
            };
            self.gate_mut_ok(id)?.value = value;
        }
        Ok(())
    }

    fn record_history(&mut self) {
        for id in self.dfs.clone() {
            if let Ok(gate) = self.gate_mut_ok(id) {
                let value = gate.value;
                gate.push_history(value);
            }
        }
    }

    /// Shape of the current classes, for refinement-progress detection.
    fn class_shape(&self) -> (usize, usize) {
        (
            self.fecs.len(),
            self.fecs.iter().map(Vec::len).sum::<usize>(),
        )
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::aig::test::small_netlist;
    use crate::{Aig, AigError, Lit, Netlist};

    #[test]
    fn pattern_validation() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        assert!(matches!(
            aig.sim_patterns(&["101"]),
            Err(AigError::PatternWidth { width: 3, expected: 2, .. })
        ));
        assert!(matches!(
            aig.sim_patterns(&["1x"]),
            Err(AigError::PatternAlphabet { found: 'x', .. })
        ));
        // nothing was simulated, classes untouched
        assert!(aig.fec_classes().is_empty());
    }

    #[test]
    fn signatures_follow_the_logic() {
        // g3 = a & b, g4 = !a & b
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        aig.sim_patterns(&["00", "01", "10", "11"]).unwrap();

        // bit k = pattern k; padded rows are all-zero
        assert_eq!(aig.gate(1).unwrap().sim_value(), 0b1100); // a: rows 10, 11
        assert_eq!(aig.gate(2).unwrap().sim_value(), 0b1010); // b: rows 01, 11
        assert_eq!(aig.gate(3).unwrap().sim_value(), 0b1000); // a & b
        assert_eq!(aig.gate(4).unwrap().sim_value(), 0b0010); // !a & b
        // output of !g4
        let out = aig.outputs()[1];
        assert_eq!(aig.gate(out).unwrap().sim_value(), !0b0010);
    }

    #[test]
    fn exhaustive_patterns_refine_classes() {
        // g3 = a & b and g4 = b & a are functionally equal; g5 = !(a & b)
        // shaped as !a & !b is not (it is !(a | b)).
        let n = Netlist {
            max_var: 5,
            inputs: vec![1, 2],
            outputs: vec![
                Lit::new(3, false),
                Lit::new(4, false),
                Lit::new(5, false),
            ],
            ands: vec![
                (3, Lit::new(1, false), Lit::new(2, false)),
                (4, Lit::new(2, false), Lit::new(1, false)),
                (5, Lit::new(1, true), Lit::new(2, true)),
            ],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.sim_patterns(&["00", "01", "10", "11"]).unwrap();

        let classes = aig.fec_classes();
        assert_eq!(classes.len(), 1);
        let mut members = classes[0].clone();
        members.sort_unstable();
        assert_eq!(members, vec![Lit::new(3, false), Lit::new(4, false)]);
    }

    #[test]
    fn random_simulation_terminates_and_refines() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let simulated = aig.sim_random(&mut rng).unwrap();
        assert!(simulated > 0);
        // g3 = a & b and g4 = !a & b are inequivalent and not complements:
        // random patterns tell them apart.
        assert!(aig.fec_classes().is_empty());
    }

    #[test]
    fn pattern_stream_advances_by_the_prime_stride() {
        let stride = (super::PATTERN_STRIDE % (1 << 16)) as u16;
        let mut stream = super::PatternStream::new(5);
        let a = stream.next_chunk();
        let b = stream.next_chunk();
        let c = stream.next_chunk();
        assert_eq!(a, 5);
        assert_eq!(b, a.wrapping_add(stride));
        assert_eq!(c, b.wrapping_add(stride));

        // same seed, same sequence
        let mut again = super::PatternStream::new(5);
        assert_eq!(again.next_chunk(), a);
    }

    #[test]
    fn undefined_gates_simulate_as_free_variables() {
        // g3 = a & u where u was never declared: random simulation gives u
        // nonconstant signatures, separating g3 from the constant class
        let n = Netlist {
            max_var: 4,
            inputs: vec![1],
            outputs: vec![Lit::new(3, false)],
            ands: vec![(3, Lit::new(1, false), Lit::new(4, false))],
            ..Default::default()
        };
        let mut aig = Aig::from_netlist(&n).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        aig.sim_random(&mut rng).unwrap();
        assert!(aig.fec_classes().is_empty());

        // under explicit patterns the placeholder holds zero
        let mut aig = Aig::from_netlist(&n).unwrap();
        aig.sim_patterns(&["1"]).unwrap();
        assert_eq!(aig.gate(4).unwrap().sim_value(), 0);
        assert_eq!(aig.gate(3).unwrap().sim_value(), 0);
    }

    #[test]
    fn history_is_recorded() {
        let mut aig = Aig::from_netlist(&small_netlist()).unwrap();
        aig.sim_patterns(&["11"]).unwrap();
        aig.sim_patterns(&["01"]).unwrap();
        let h: Vec<u16> = aig.gate(3).unwrap().sim_history().collect();
        assert_eq!(h, vec![0b1, 0b0]);
    }
}
