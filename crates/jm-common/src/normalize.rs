use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, trim, and collapse every whitespace run (tabs, newlines, ideographic
/// spaces) to a single ASCII space.
///
/// Two texts with the same normalized form must embed to the same vector, so this is
/// also the cache identity for the embedding provider.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    RE_WHITESPACE.replace_all(&lowered, " ").into_owned()
}

/// SHA-256 hex digest of the normalized text.
pub fn text_fingerprint(text: &str) -> String {
    let normalized = normalize_text(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Case-insensitive identity of a skill, job type or location label.
pub fn normalize_label(label: &str) -> String {
    normalize_text(label)
}
