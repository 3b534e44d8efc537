//! Validated submission request and decoded attachments.

use super::{PipelineDomainError, RoundNumber, RunKey, TaskSlug};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Attachment decoded from an inbound submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from already-decoded bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Decodes an attachment body.
    ///
    /// Accepts bare base64 as well as `data:<mime>;base64,<data>` URIs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidAttachment`] when the body is
    /// not valid base64.
    pub fn from_base64(
        name: impl Into<String>,
        content: &str,
    ) -> Result<Self, PipelineDomainError> {
        let owned_name = name.into();
        let encoded = content
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map_or(content, |(_, data)| data);
        let bytes = BASE64_STANDARD.decode(encoded.trim()).map_err(|err| {
            PipelineDomainError::InvalidAttachment {
                name: owned_name.clone(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            name: owned_name,
            bytes,
        })
    }

    /// Returns the attachment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the decoded content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Immutable, validated input for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    task: TaskSlug,
    round: RoundNumber,
    nonce: String,
    submitter: String,
    brief: String,
    checks: Vec<String>,
    callback_url: String,
    attachments: Vec<Attachment>,
}

impl SubmissionRequest {
    /// Creates a request with required fields.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyBrief`] when the brief is empty
    /// after trimming, or [`PipelineDomainError::InvalidCallbackUrl`] when
    /// the callback URL is not an absolute http(s) URL.
    pub fn new(
        task: TaskSlug,
        round: RoundNumber,
        nonce: impl Into<String>,
        submitter: impl Into<String>,
        brief: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self, PipelineDomainError> {
        let owned_brief = brief.into();
        if owned_brief.trim().is_empty() {
            return Err(PipelineDomainError::EmptyBrief);
        }
        let owned_url = callback_url.into();
        if !(owned_url.starts_with("http://") || owned_url.starts_with("https://")) {
            return Err(PipelineDomainError::InvalidCallbackUrl(owned_url));
        }
        Ok(Self {
            task,
            round,
            nonce: nonce.into(),
            submitter: submitter.into(),
            brief: owned_brief,
            checks: Vec::new(),
            callback_url: owned_url,
            attachments: Vec::new(),
        })
    }

    /// Sets the evaluation checks.
    #[must_use]
    pub fn with_checks(mut self, checks: impl IntoIterator<Item = String>) -> Self {
        self.checks = checks.into_iter().collect();
        self
    }

    /// Sets the decoded attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task(&self) -> &TaskSlug {
        &self.task
    }

    /// Returns the round number.
    #[must_use]
    pub const fn round(&self) -> RoundNumber {
        self.round
    }

    /// Returns the (task, round) key for this request.
    #[must_use]
    pub fn run_key(&self) -> RunKey {
        RunKey::new(self.task.clone(), self.round)
    }

    /// Returns the correlation nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the submitter identity.
    #[must_use]
    pub fn submitter(&self) -> &str {
        &self.submitter
    }

    /// Returns the natural-language brief.
    #[must_use]
    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Returns the evaluation checks.
    #[must_use]
    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    /// Returns the callback URL.
    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Returns the decoded attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}
