use std::collections::HashSet;

use once_cell::sync::Lazy;

/// English function words dropped before weighting so that major and city
/// tokens carry the similarity signal.
#[rustfmt::skip]
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    // articles
    "a", "an", "the",
    // pronouns
    "i", "me", "my", "myself", "we", "us", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    // question words
    "what", "which", "who", "whom", "whose", "why", "when", "where", "how",
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "at", "before",
    "behind", "below", "beneath", "beside", "between", "beyond", "by", "down", "during", "for",
    "from", "in", "inside", "into", "near", "of", "off", "on", "onto", "out", "outside", "over",
    "per", "through", "throughout", "to", "toward", "towards", "under", "until", "up", "upon",
    "via", "with", "within", "without",
    // conjunctions
    "and", "as", "because", "but", "if", "nor", "or", "since", "so", "than", "that", "though",
    "unless", "whereas", "whether", "while",
    // auxiliaries and modals
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "would", "should", "could", "ought", "can", "cannot", "may",
    "might", "must", "will", "shall",
    // determiners and adverbs
    "all", "any", "both", "each", "either", "every", "few", "more", "most", "much", "neither",
    "no", "none", "not", "only", "other", "own", "same", "several", "some", "such", "very",
    "too", "then", "there", "these", "this", "those", "just", "now", "here", "also", "again",
    "already", "even", "ever", "yet", "etc",
];

static ENGLISH: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Case-sensitive lookup; callers lower-case tokens first.
pub fn is_stop_word(token: &str) -> bool {
    ENGLISH.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_function_words_are_stop_words() {
        for word in ["the", "and", "of", "in", "for"] {
            assert!(is_stop_word(word), "{word} should be filtered");
        }
    }

    #[test]
    fn majors_cities_and_years_survive() {
        for word in ["cs", "nyc", "art", "la", "physics", "london", "2020", "new", "york"] {
            assert!(!is_stop_word(word), "{word} should not be filtered");
        }
    }

    #[test]
    fn list_has_no_duplicates() {
        assert_eq!(ENGLISH.len(), ENGLISH_STOP_WORDS.len());
    }
}
