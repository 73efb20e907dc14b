use std::collections::BTreeSet;

/// Lowercase word tokens in input order.
///
/// Splits on anything that is not alphanumeric, `+` or `#` so `C++` and `C#` survive
/// as tokens; fragments made only of `+`/`#` are dropped. No stemming.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

/// Distinct tokens, ordered so that anything built from the set iterates deterministically.
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize_words(text).into_iter().collect()
}

/// Weighted features fed to the hash embedder: unigrams at 1.0, adjacent bigrams at 0.5.
pub fn weighted_features(text: &str) -> Vec<(String, f32)> {
    let tokens = tokenize_words(text);
    let mut features: Vec<(String, f32)> = tokens.iter().map(|t| (t.clone(), 1.0)).collect();
    features.extend(
        tokens
            .windows(2)
            .map(|pair| (format!("{} {}", pair[0], pair[1]), 0.5)),
    );
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_keeps_language_names() {
        assert_eq!(
            tokenize_words("Senior C++/C# engineer, (Remote)!"),
            vec!["senior", "c++", "c#", "engineer", "remote"]
        );
    }

    #[test]
    fn drops_symbol_only_fragments() {
        assert_eq!(tokenize_words("a ++ b -- #"), vec!["a", "b"]);
        assert!(tokenize_words("  ... ").is_empty());
    }

    #[test]
    fn token_set_deduplicates() {
        let set = token_set("Python python PYTHON sql");
        assert_eq!(set.len(), 2);
        assert!(set.contains("python"));
    }

    #[test]
    fn weighted_features_include_bigrams() {
        let features = weighted_features("remote python engineer");
        assert_eq!(features.len(), 5);
        assert!(features.contains(&("remote python".to_string(), 0.5)));
        assert!(features.contains(&("engineer".to_string(), 1.0)));
    }
}
