use once_cell::sync::Lazy;
use regex::Regex;

use super::stopwords::is_stop_word;

// Two or more word characters between word boundaries; single letters and
// digits never become terms.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// Lower-cases `text` and splits it into vocabulary terms, dropping stop words.
///
/// Numbers are ordinary terms: "2020" and "2021" are simply different words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}
