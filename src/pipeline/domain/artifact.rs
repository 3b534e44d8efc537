//! Generated artifact content handed to the publishing collaborator.

use serde::{Deserialize, Serialize};

/// One named file within a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    path: String,
    content: String,
}

impl ArtifactFile {
    /// Creates an artifact file from a relative path and its content.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Returns the file path relative to the artifact root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The content produced for one task round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    files: Vec<ArtifactFile>,
}

impl Artifact {
    /// Creates an artifact from a set of files.
    #[must_use]
    pub const fn new(files: Vec<ArtifactFile>) -> Self {
        Self { files }
    }

    /// Returns the artifact files.
    #[must_use]
    pub fn files(&self) -> &[ArtifactFile] {
        &self.files
    }

    /// Finds a file by its relative path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|file| file.path() == path)
    }

    /// Returns `true` when the artifact has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Tagged outcome of the generation stage.
///
/// Generation failure is recoverable: the pipeline substitutes a minimal
/// built-in artifact and records why, rather than aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The generation collaborator produced the artifact.
    Generated(Artifact),
    /// The collaborator failed and a fallback artifact was substituted.
    Degraded {
        /// The substituted minimal artifact.
        artifact: Artifact,
        /// Why the collaborator's output was unavailable.
        reason: String,
    },
}

impl GenerationOutcome {
    /// Returns the artifact regardless of how it was obtained.
    #[must_use]
    pub const fn artifact(&self) -> &Artifact {
        match self {
            Self::Generated(artifact) | Self::Degraded { artifact, .. } => artifact,
        }
    }

    /// Returns the degradation reason when the fallback was used.
    #[must_use]
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Generated(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Consumes the outcome and returns the artifact.
    #[must_use]
    pub fn into_artifact(self) -> Artifact {
        match self {
            Self::Generated(artifact) | Self::Degraded { artifact, .. } => artifact,
        }
    }
}
