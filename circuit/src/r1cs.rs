//! Serializable constraint matrices.
//!
//! The circuit is synthesized once in setup mode and the resulting
//! `ark_relations` matrices are stored as an artifact. The variable vector is
//! laid out as `z = [1, instance..., witness...]` and row `i` holds when
//! `<A_i, z> * <B_i, z> = <C_i, z>`.

use ark_bn254::Fr;
use ark_relations::r1cs::{
    ConstraintMatrices, ConstraintSynthesizer, ConstraintSystem, Matrix, OptimizationGoal,
    SynthesisError, SynthesisMode,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

/// Errors raised while checking matrices or an assignment against them.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Rows reference variables that do not exist, or counts disagree.
    #[error("malformed constraint system: {0}")]
    Malformed(String),
    /// An assignment has the wrong number of entries.
    #[error("assignment length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// The constraint at `index` does not hold.
    #[error("constraint {index} is not satisfied")]
    Unsatisfied { index: usize },
    #[error("constraint system serialization failed: {0}")]
    Serialization(#[from] SerializationError),
}

/// `ConstraintMatrices<Fr>` with canonical serialization.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CircuitMatrices {
    /// Instance variables, including the constant one.
    pub num_instance_variables: usize,
    pub num_witness_variables: usize,
    pub num_constraints: usize,
    pub a_num_non_zero: usize,
    pub b_num_non_zero: usize,
    pub c_num_non_zero: usize,
    pub a: Matrix<Fr>,
    pub b: Matrix<Fr>,
    pub c: Matrix<Fr>,
}

impl From<CircuitMatrices> for ConstraintMatrices<Fr> {
    fn from(matrices: CircuitMatrices) -> Self {
        Self {
            num_instance_variables: matrices.num_instance_variables,
            num_witness_variables: matrices.num_witness_variables,
            num_constraints: matrices.num_constraints,
            a_num_non_zero: matrices.a_num_non_zero,
            b_num_non_zero: matrices.b_num_non_zero,
            c_num_non_zero: matrices.c_num_non_zero,
            a: matrices.a,
            b: matrices.b,
            c: matrices.c,
        }
    }
}

impl From<ConstraintMatrices<Fr>> for CircuitMatrices {
    fn from(matrices: ConstraintMatrices<Fr>) -> Self {
        Self {
            num_instance_variables: matrices.num_instance_variables,
            num_witness_variables: matrices.num_witness_variables,
            num_constraints: matrices.num_constraints,
            a_num_non_zero: matrices.a_num_non_zero,
            b_num_non_zero: matrices.b_num_non_zero,
            c_num_non_zero: matrices.c_num_non_zero,
            a: matrices.a,
            b: matrices.b,
            c: matrices.c,
        }
    }
}

impl CircuitMatrices {
    pub fn num_variables(&self) -> usize {
        self.num_instance_variables + self.num_witness_variables
    }

    /// Number of public inputs, excluding the constant one.
    pub fn num_public_inputs(&self) -> usize {
        self.num_instance_variables.saturating_sub(1)
    }

    /// Check row counts, non-zero counts and column bounds.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.num_instance_variables == 0 {
            return Err(MatrixError::Malformed(
                "missing constant instance variable".into(),
            ));
        }
        let num_variables = self.num_variables();
        for (name, matrix, non_zero) in [
            ("a", &self.a, self.a_num_non_zero),
            ("b", &self.b, self.b_num_non_zero),
            ("c", &self.c, self.c_num_non_zero),
        ] {
            if matrix.len() != self.num_constraints {
                return Err(MatrixError::Malformed(format!(
                    "{name} has {} rows, expected {}",
                    matrix.len(),
                    self.num_constraints
                )));
            }
            let entries: usize = matrix.iter().map(Vec::len).sum();
            if entries != non_zero {
                return Err(MatrixError::Malformed(format!(
                    "{name} has {entries} entries, header says {non_zero}"
                )));
            }
            for (row, terms) in matrix.iter().enumerate() {
                if let Some((_, column)) = terms.iter().find(|(_, col)| *col >= num_variables) {
                    return Err(MatrixError::Malformed(format!(
                        "{name}[{row}] references column {column} of {num_variables}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check `A z ∘ B z = C z`, reporting the first failing row.
    pub fn check_assignment(&self, z: &[Fr]) -> Result<(), MatrixError> {
        check_rows(&self.a, &self.b, &self.c, self.num_variables(), z)
    }

    /// SHA3-256 over the compressed serialization. Keys record this value so
    /// they can only be used with the circuit they were generated for.
    pub fn digest(&self) -> Result<[u8; 32], MatrixError> {
        let mut hasher = Sha3_256::new();
        self.serialize_compressed(&mut hasher)?;
        Ok(hasher.finalize().into())
    }
}

/// [`CircuitMatrices::check_assignment`] for matrices already handed to the prover.
pub fn check_assignment(matrices: &ConstraintMatrices<Fr>, z: &[Fr]) -> Result<(), MatrixError> {
    let num_variables = matrices.num_instance_variables + matrices.num_witness_variables;
    check_rows(&matrices.a, &matrices.b, &matrices.c, num_variables, z)
}

fn check_rows(
    a: &Matrix<Fr>,
    b: &Matrix<Fr>,
    c: &Matrix<Fr>,
    num_variables: usize,
    z: &[Fr],
) -> Result<(), MatrixError> {
    if z.len() != num_variables {
        return Err(MatrixError::LengthMismatch {
            expected: num_variables,
            found: z.len(),
        });
    }
    let row_value = |row: &[(Fr, usize)]| -> Fr {
        row.iter().map(|(coeff, col)| *coeff * z[*col]).sum()
    };
    for (index, ((a, b), c)) in a.iter().zip(b).zip(c).enumerate() {
        if row_value(a) * row_value(b) != row_value(c) {
            return Err(MatrixError::Unsatisfied { index });
        }
    }
    Ok(())
}

/// Variable values produced by synthesizing a circuit in prove mode.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// Instance values, starting with the constant one.
    pub instance: Vec<Fr>,
    pub witness: Vec<Fr>,
    pub num_constraints: usize,
}

impl Assignment {
    /// Public inputs without the constant one.
    pub fn public_inputs(&self) -> &[Fr] {
        self.instance.get(1..).unwrap_or(&[])
    }

    /// `z = [1, instance..., witness...]`.
    pub fn full(&self) -> Vec<Fr> {
        let mut z = Vec::with_capacity(self.instance.len() + self.witness.len());
        z.extend_from_slice(&self.instance);
        z.extend_from_slice(&self.witness);
        z
    }
}

/// Synthesize `circuit` without values and extract its matrices.
pub fn synthesize_matrices<C: ConstraintSynthesizer<Fr>>(
    circuit: C,
) -> Result<CircuitMatrices, SynthesisError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_optimization_goal(OptimizationGoal::Constraints);
    cs.set_mode(SynthesisMode::Setup);
    circuit.generate_constraints(cs.clone())?;
    cs.finalize();
    cs.to_matrices()
        .map(CircuitMatrices::from)
        .ok_or(SynthesisError::MissingCS)
}

/// Synthesize `circuit` with values, skipping matrix construction.
pub fn synthesize_assignment<C: ConstraintSynthesizer<Fr>>(
    circuit: C,
) -> Result<Assignment, SynthesisError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_optimization_goal(OptimizationGoal::Constraints);
    cs.set_mode(SynthesisMode::Prove {
        construct_matrices: false,
    });
    circuit.generate_constraints(cs.clone())?;
    cs.finalize();
    let num_constraints = cs.num_constraints();
    let inner = cs.borrow().ok_or(SynthesisError::MissingCS)?;
    Ok(Assignment {
        instance: inner.instance_assignment.clone(),
        witness: inner.witness_assignment.clone(),
        num_constraints,
    })
}
