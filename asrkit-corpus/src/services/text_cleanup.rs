//! Transcript text normalization for STM output
//!
//! STM references are scored token by token, so text is lowercased and
//! stripped of punctuation. Bracketed tags (`[noise]`, `<unk>`) survive
//! intact. Cleaning is idempotent.

/// Normalize transcript text for scoring
pub fn clean_up(text: &str) -> String {
    text.split_whitespace()
        .flat_map(clean_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_tag(token: &str) -> bool {
    (token.starts_with('[') && token.ends_with(']'))
        || (token.starts_with('<') && token.ends_with('>'))
}

/// Clean one whitespace token; punctuation inside it may split it in two
fn clean_token(token: &str) -> Vec<String> {
    if token.len() > 1 && is_tag(token) {
        return vec![token.to_lowercase()];
    }

    let lowered = token.to_lowercase();
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = lowered.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        let inside_word = i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_alphanumeric()
            && chars[i + 1].is_alphanumeric();

        if c.is_alphanumeric() || c == '_' || ((c == '\'' || c == '-') && inside_word) {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
