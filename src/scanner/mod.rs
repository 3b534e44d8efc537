//! Credential scanning for generated artifacts.
//!
//! The scanner is a pure function over artifact text: it matches a fixed
//! catalogue of credential shapes and reports findings with masked
//! excerpts. Raw matches are never exposed; the masked excerpt carries a
//! fixed-length prefix followed by a redaction marker, so the scanner
//! itself cannot become a leak vector.

mod catalogue;

use catalogue::{SECRET_PATTERNS, is_whitelisted};
use serde::Serialize;

/// Number of leading characters retained in a masked excerpt.
const MASK_PREFIX_CHARS: usize = 4;

/// Marker replacing everything past the retained prefix.
const REDACTION_MARKER: &str = "********";

/// One potential credential detected in scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretFinding {
    kind: String,
    line: usize,
    masked: String,
}

impl SecretFinding {
    fn new(kind: &str, line: usize, masked: String) -> Self {
        Self {
            kind: kind.to_owned(),
            line,
            masked,
        }
    }

    /// Returns the name of the matched credential shape.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the 1-based line number of the match.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the masked excerpt safe for logging.
    #[must_use]
    pub fn masked_excerpt(&self) -> &str {
        &self.masked
    }
}

/// Scans text for potential credentials.
///
/// Comment lines are skipped, placeholder-looking values are whitelisted,
/// and every finding carries only a masked excerpt of the match.
#[must_use]
pub fn scan(content: &str) -> Vec<SecretFinding> {
    let mut findings = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if is_comment(line) {
            continue;
        }
        for pattern in SECRET_PATTERNS.iter() {
            for matched in pattern.regex.find_iter(line) {
                let text = matched.as_str();
                if is_whitelisted(text) {
                    continue;
                }
                findings.push(SecretFinding::new(pattern.kind, index + 1, mask(text)));
            }
        }
    }
    findings
}

/// Masks a matched credential for safe logging.
///
/// Keeps at most [`MASK_PREFIX_CHARS`] leading characters; short matches
/// are redacted entirely.
#[must_use]
pub fn mask(text: &str) -> String {
    let prefix: String = if text.chars().count() <= MASK_PREFIX_CHARS {
        String::new()
    } else {
        text.chars().take(MASK_PREFIX_CHARS).collect()
    };
    format!("{prefix}{REDACTION_MARKER}")
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
}

#[cfg(test)]
mod tests;
