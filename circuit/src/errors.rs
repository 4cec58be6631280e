//! Error taxonomy reported across the verification boundary.
//!
//! Each stage has its own error enum. They all convert into
//! [`VerifierError`], which carries one [`ErrorKind`] and a detail message.

use core::fmt;

use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

use crate::artifacts::LoadError;
use crate::groth16::{ProofError, ProverError};
use crate::pipeline::Stage;
use crate::r1cs::MatrixError;
use crate::witness::WitnessError;

/// The failure classes a caller can act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An artifact or input file could not be read.
    Unavailable,
    /// An artifact was read but failed integrity or format checks.
    Corrupt,
    /// An input string is not valid hex.
    InvalidEncoding,
    /// `r` or `s` is zero or not below the group order.
    InvalidSignatureComponent,
    /// The public key is not a canonical point on the curve.
    InvalidPublicKey,
    /// The inputs are well formed but the signature does not verify.
    WitnessUnsatisfiable,
    /// Keys, constraint system and witness do not belong together.
    KeyWitnessMismatch,
    /// Proof bytes do not decode to valid group elements.
    MalformedProof,
    /// A well-formed proof failed the pairing check.
    Rejected,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::InvalidSignatureComponent => "invalid signature component",
            ErrorKind::InvalidPublicKey => "invalid public key",
            ErrorKind::WitnessUnsatisfiable => "witness unsatisfiable",
            ErrorKind::KeyWitnessMismatch => "key/witness mismatch",
            ErrorKind::MalformedProof => "malformed proof",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, displayed as `"<kind>: <detail>"`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct VerifierError {
    pub kind: ErrorKind,
    pub message: String,
    /// The last pipeline stage reached before the failure, when known.
    pub stage: Option<Stage>,
}

impl VerifierError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn unsatisfiable() -> Self {
        Self::new(ErrorKind::WitnessUnsatisfiable, "signature does not verify")
    }

    pub fn rejected() -> Self {
        Self::new(ErrorKind::Rejected, "proof did not verify")
    }

    /// Tag the error with the stage it came from, keeping an existing tag.
    pub fn at(mut self, stage: Stage) -> Self {
        self.stage.get_or_insert(stage);
        self
    }
}

impl From<SynthesisError> for VerifierError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Unsatisfiable | SynthesisError::DivisionByZero => {
                VerifierError::unsatisfiable()
            }
            SynthesisError::MalformedVerifyingKey => {
                VerifierError::new(ErrorKind::KeyWitnessMismatch, err.to_string())
            }
            other => VerifierError::internal(other.to_string()),
        }
    }
}

impl From<MatrixError> for VerifierError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::Malformed(_) | MatrixError::Serialization(_) => {
                VerifierError::new(ErrorKind::Corrupt, err.to_string())
            }
            MatrixError::Unsatisfied { .. } => VerifierError::unsatisfiable(),
            MatrixError::LengthMismatch { .. } => {
                VerifierError::new(ErrorKind::KeyWitnessMismatch, err.to_string())
            }
        }
    }
}

impl From<LoadError> for VerifierError {
    fn from(err: LoadError) -> Self {
        let kind = match &err {
            LoadError::Io { .. } => ErrorKind::Unavailable,
            LoadError::Corrupt(_) => ErrorKind::Corrupt,
            LoadError::Mismatch(_) => ErrorKind::KeyWitnessMismatch,
        };
        VerifierError::new(kind, err.to_string())
    }
}

impl From<WitnessError> for VerifierError {
    fn from(err: WitnessError) -> Self {
        match err {
            WitnessError::InvalidEncoding { .. } => {
                VerifierError::new(ErrorKind::InvalidEncoding, err.to_string())
            }
            WitnessError::InvalidSignatureComponent { .. } => {
                VerifierError::new(ErrorKind::InvalidSignatureComponent, err.to_string())
            }
            WitnessError::InvalidPublicKey(_) => {
                VerifierError::new(ErrorKind::InvalidPublicKey, err.to_string())
            }
            WitnessError::Unsatisfiable => VerifierError::unsatisfiable(),
            WitnessError::ShapeMismatch(_) => {
                VerifierError::new(ErrorKind::KeyWitnessMismatch, err.to_string())
            }
            WitnessError::Io { .. } => VerifierError::new(ErrorKind::Unavailable, err.to_string()),
            WitnessError::Json { .. } => VerifierError::new(ErrorKind::Corrupt, err.to_string()),
            WitnessError::Synthesis(inner) => inner.into(),
            WitnessError::Matrix(inner) => inner.into(),
        }
    }
}

impl From<ProverError> for VerifierError {
    fn from(err: ProverError) -> Self {
        match err {
            ProverError::KeyWitnessMismatch(_) => {
                VerifierError::new(ErrorKind::KeyWitnessMismatch, err.to_string())
            }
            ProverError::Synthesis(inner) => inner.into(),
            ProverError::Matrix(inner) => inner.into(),
        }
    }
}

impl From<ProofError> for VerifierError {
    fn from(err: ProofError) -> Self {
        let kind = match &err {
            ProofError::Malformed(_) => ErrorKind::MalformedProof,
            ProofError::PublicInputCount { .. } => ErrorKind::KeyWitnessMismatch,
        };
        VerifierError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = VerifierError::unsatisfiable();
        assert_eq!(err.to_string(), "witness unsatisfiable: signature does not verify");

        let err = VerifierError::new(ErrorKind::Corrupt, "bad digest");
        assert_eq!(err.to_string(), "corrupt: bad digest");
    }

    #[test]
    fn test_stage_conversions() {
        let err: VerifierError = ProofError::Malformed("short".into()).into();
        assert_eq!(err.kind, ErrorKind::MalformedProof);

        let err: VerifierError = MatrixError::Unsatisfied { index: 3 }.into();
        assert_eq!(err.kind, ErrorKind::WitnessUnsatisfiable);

        let err: VerifierError = SynthesisError::AssignmentMissing.into();
        assert_eq!(err.kind, ErrorKind::Internal);

        let err: VerifierError = ProverError::Matrix(MatrixError::Malformed("rows".into())).into();
        assert_eq!(err.kind, ErrorKind::Corrupt);

        let err: VerifierError = LoadError::Mismatch("digest".into()).into();
        assert_eq!(err.kind, ErrorKind::KeyWitnessMismatch);

        let err: VerifierError = WitnessError::InvalidPublicKey("off curve".into()).into();
        assert_eq!(err.kind, ErrorKind::InvalidPublicKey);
    }

    #[test]
    fn test_first_stage_wins() {
        let err = VerifierError::rejected()
            .at(Stage::Verified)
            .at(Stage::Received);
        assert_eq!(err.stage, Some(Stage::Verified));
    }
}
