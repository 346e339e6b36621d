/// Words masked out of chirp bodies, compared case-insensitively.
const BANNED_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

/// Replace banned words with `****`. Whitespace runs collapse to single spaces.
/// Only whole tokens match, so `Sharbert!` is left alone.
pub fn filter_profanity(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            if BANNED_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
