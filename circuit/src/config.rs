//! Where the verifier finds its artifacts.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the artifact directory.
pub const ARTIFACT_DIR_ENV: &str = "ECDSA_VERIFIER_ARTIFACT_DIR";

pub const R1CS_FILE: &str = "r1cs.bin";
pub const PROVING_KEY_FILE: &str = "proving_key.bin";
pub const VERIFYING_KEY_FILE: &str = "verifying_key.bin";
pub const WITNESS_INPUT_FILE: &str = "witness_input.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierConfig {
    pub artifact_dir: PathBuf,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("."),
        }
    }
}

impl VerifierConfig {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Read the artifact directory from [`ARTIFACT_DIR_ENV`], falling back to
    /// the current directory when it is unset or empty.
    pub fn from_env() -> Self {
        match env::var_os(ARTIFACT_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifact_dir)
    }
}

/// Full paths of the four files the verifier reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub r1cs: PathBuf,
    pub proving_key: PathBuf,
    pub verifying_key: PathBuf,
    pub witness_input: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            r1cs: dir.join(R1CS_FILE),
            proving_key: dir.join(PROVING_KEY_FILE),
            verifying_key: dir.join(VERIFYING_KEY_FILE),
            witness_input: dir.join(WITNESS_INPUT_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_in_dir() {
        let config = VerifierConfig::new("/tmp/artifacts");
        let paths = config.paths();
        assert_eq!(paths.r1cs, Path::new("/tmp/artifacts/r1cs.bin"));
        assert_eq!(paths.proving_key, Path::new("/tmp/artifacts/proving_key.bin"));
        assert_eq!(paths.verifying_key, Path::new("/tmp/artifacts/verifying_key.bin"));
        assert_eq!(paths.witness_input, Path::new("/tmp/artifacts/witness_input.json"));
    }

    #[test]
    fn test_default_is_current_dir() {
        assert_eq!(VerifierConfig::default().artifact_dir, PathBuf::from("."));
    }
}
