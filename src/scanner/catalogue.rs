//! Fixed catalogue of credential shapes and the placeholder whitelist.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named credential shape.
pub(crate) struct SecretPattern {
    pub(crate) kind: &'static str,
    pub(crate) regex: Regex,
}

/// Raw pattern sources, compiled once on first use.
const RAW_PATTERNS: &[(&str, &str)] = &[
    (
        r#"(?i)(api[_-]?key|apikey)\s*[:=]\s*["']([a-zA-Z0-9_\-]{20,})["']"#,
        "API key",
    ),
    (
        r#"(?i)(secret[_-]?key|secretkey)\s*[:=]\s*["']([a-zA-Z0-9_\-]{20,})["']"#,
        "secret key",
    ),
    (
        r#"(?i)(password|passwd|pwd)\s*[:=]\s*["']([^"']{8,})["']"#,
        "password",
    ),
    (
        r#"(?i)(token)\s*[:=]\s*["']([a-zA-Z0-9_\-]{20,})["']"#,
        "token",
    ),
    (
        r#"(?i)(github[_-]?token)\s*[:=]\s*["']([a-zA-Z0-9_\-]{20,})["']"#,
        "GitHub token",
    ),
    (
        r#"(?i)(openai[_-]?api[_-]?key)\s*[:=]\s*["']([a-zA-Z0-9_\-]{20,})["']"#,
        "OpenAI API key",
    ),
    (r"sk-[a-zA-Z0-9]{20,}", "OpenAI API key (sk- prefix)"),
    (r"ghp_[a-zA-Z0-9]{36,}", "GitHub personal access token"),
    (r"gho_[a-zA-Z0-9]{36,}", "GitHub OAuth token"),
    (r"ghs_[a-zA-Z0-9]{36,}", "GitHub app token"),
    (r"(?i)bearer\s+[a-zA-Z0-9_\-.]{20,}", "bearer token"),
    (
        r#"(?i)(aws[_-]?access[_-]?key[_-]?id)\s*[:=]\s*["']([A-Z0-9]{20})["']"#,
        "AWS access key",
    ),
    (
        r#"(?i)(aws[_-]?secret[_-]?access[_-]?key)\s*[:=]\s*["']([a-zA-Z0-9/+=]{40})["']"#,
        "AWS secret key",
    ),
    (
        r"-----BEGIN\s+(?:RSA\s+)?PRIVATE\s+KEY-----",
        "private key",
    ),
    (
        r#"(?i)(database[_-]?url|db[_-]?url)\s*[:=]\s*["']([^"']+)["']"#,
        "database URL",
    ),
];

/// Values that look like credentials but are placeholders.
const RAW_WHITELIST: &[&str] = &[
    r"(?i)example\.com",
    r"(?i)your-.*-here",
    r"(?i)placeholder",
    r"(?i)dummy",
    r"(?i)test[_-]?key",
    r"(?i)fake[_-]?token",
    r"(?i)xxx+",
    r"\*\*\*+",
];

pub(crate) static SECRET_PATTERNS: Lazy<Vec<SecretPattern>> = Lazy::new(|| {
    RAW_PATTERNS
        .iter()
        .filter_map(|&(raw, kind)| {
            Regex::new(raw)
                .ok()
                .map(|regex| SecretPattern { kind, regex })
        })
        .collect()
});

static WHITELIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    RAW_WHITELIST
        .iter()
        .filter_map(|&raw| Regex::new(raw).ok())
        .collect()
});

/// Returns `true` when the matched text is a known placeholder shape.
pub(crate) fn is_whitelisted(text: &str) -> bool {
    WHITELIST.iter().any(|pattern| pattern.is_match(text))
}
