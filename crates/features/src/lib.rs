//! Lexical features for matching free text against the catalog.
//!
//! Provides pure functions used by entity extraction:
//! - Levenshtein edit distance and normalized similarity
//! - Tiered restaurant-name matching (exact, partial, fuzzy)
//! - Dish-name matching
//! - Keyword sentiment classification (see [`sentiment`])

use smartdine_model::MatchType;

pub mod sentiment;

pub use sentiment::classify_sentiment;

/// Common food words that must never identify a restaurant on their own.
pub const FOOD_TERM_STOPLIST: &[&str] = &[
    "biryani", "dosa", "idli", "vada", "rice", "curry", "chicken", "mutton", "fish", "prawn",
    "paneer", "masala", "tandoor", "grill", "fry", "roast", "pizza", "burger", "sandwich",
    "pasta", "noodles", "fried", "spicy", "sweet", "sour", "hot", "cold", "fresh", "tasty",
    "delicious",
];

/// Name words and text tokens must be longer than this to be compared.
const MIN_DISTINCTIVE_LEN: usize = 4;

/// Full-name similarity a token must exceed for a `fuzzy` match.
const FUZZY_NAME_THRESHOLD: f32 = 0.7;

/// Name-word similarity a token must exceed for a `fuzzy_partial` match.
const FUZZY_WORD_THRESHOLD: f32 = 0.75;

const PARTIAL_CONFIDENCE: f32 = 0.8;
const DISH_PARTIAL_CONFIDENCE: f32 = 0.7;

/// Outcome of matching text against a single name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierMatch {
    pub match_type: MatchType,
    pub confidence: f32,
}

impl TierMatch {
    fn new(match_type: MatchType, confidence: f32) -> Self {
        Self {
            match_type,
            confidence,
        }
    }
}

/// Compute case-insensitive Levenshtein edit distance between two strings.
pub fn edit_distance(s1: &str, s2: &str) -> usize {
    let s1: Vec<char> = s1.to_lowercase().chars().collect();
    let s2: Vec<char> = s2.to_lowercase().chars().collect();
    let len1 = s1.len();
    let len2 = s2.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1[i - 1] == s2[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// Similarity in `0.0..=1.0`: one minus edit distance over the longer length.
///
/// Two empty strings are identical (1.0).
pub fn similarity(s1: &str, s2: &str) -> f32 {
    let max_len = s1.to_lowercase().chars().count().max(s2.to_lowercase().chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(s1, s2) as f32 / max_len as f32
}

pub fn is_food_term(word: &str) -> bool {
    FOOD_TERM_STOPLIST.contains(&word)
}

/// Remove every `(...)` group, e.g. "Cream Centre (Coimbatore)" -> "Cream Centre".
pub fn strip_parentheticals(name: &str) -> String {
    let mut out = name.to_string();
    while let Some(open) = out.find('(') {
        match out[open..].find(')') {
            Some(close) => out.replace_range(open..open + close + 1, ""),
            None => break,
        }
    }
    out.trim().to_string()
}

/// The word itself plus British/American spelling swaps (first occurrence only).
pub fn spelling_variants(word: &str) -> [String; 5] {
    [
        word.to_string(),
        word.replacen("re", "er", 1),
        word.replacen("er", "re", 1),
        word.replacen("our", "or", 1),
        word.replacen("or", "our", 1),
    ]
}

/// Lowercased name words long and specific enough to identify a restaurant.
pub fn distinctive_words(name: &str) -> Vec<String> {
    strip_parentheticals(&name.to_lowercase())
        .split(' ')
        .filter(|w| !is_food_term(w) && w.chars().count() > MIN_DISTINCTIVE_LEN)
        .map(str::to_string)
        .collect()
}

/// Match `text` against a restaurant `name`, returning the first tier that succeeds.
///
/// Tiers: full-name substring (1.0), distinctive word or spelling variant
/// substring (0.8), then token similarity against the full name or a
/// distinctive word. Within the fuzzy tier the most confident token wins.
pub fn match_name(text: &str, name: &str) -> Option<TierMatch> {
    let text = text.to_lowercase();
    let name = name.to_lowercase();

    if text.contains(&name) {
        return Some(TierMatch::new(MatchType::Exact, 1.0));
    }

    let words = distinctive_words(&name);
    let partial = words
        .iter()
        .any(|word| spelling_variants(word).iter().any(|v| text.contains(v.as_str())));
    if partial {
        return Some(TierMatch::new(MatchType::Partial, PARTIAL_CONFIDENCE));
    }

    let mut best: Option<TierMatch> = None;
    let mut keep = |candidate: TierMatch| {
        if best.map_or(true, |b| candidate.confidence > b.confidence) {
            best = Some(candidate);
        }
    };

    for token in text.split_whitespace() {
        if is_food_term(token) || token.chars().count() <= MIN_DISTINCTIVE_LEN {
            continue;
        }

        let full = similarity(token, &name);
        if full > FUZZY_NAME_THRESHOLD {
            keep(TierMatch::new(MatchType::Fuzzy, full));
            break;
        }

        if let Some(score) = words
            .iter()
            .map(|word| similarity(token, word))
            .find(|&score| score > FUZZY_WORD_THRESHOLD)
        {
            keep(TierMatch::new(MatchType::FuzzyPartial, score));
        }
    }

    best
}

/// Match `text` against a dish name: full name (1.0) or any word over three chars (0.7).
pub fn match_dish(text: &str, dish_name: &str) -> Option<TierMatch> {
    let text = text.to_lowercase();
    let dish = dish_name.to_lowercase();

    if text.contains(&dish) {
        return Some(TierMatch::new(MatchType::Exact, 1.0));
    }

    dish.split(' ')
        .any(|word| word.chars().count() > 3 && text.contains(word))
        .then(|| TierMatch::new(MatchType::Partial, DISH_PARTIAL_CONFIDENCE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("ANANDHAAS", "anandhaas"), 0);
        assert_eq!(edit_distance("centre", "center"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_similarity_identity_and_empty() {
        for name in ["Shree Anandhaas", "Cream Centre (Coimbatore)", "x", ""] {
            assert_eq!(similarity(name, name), 1.0);
            assert_eq!(edit_distance(name, name), 0);
        }
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_strip_parentheticals() {
        assert_eq!(strip_parentheticals("Cream Centre (Coimbatore)"), "Cream Centre");
        assert_eq!(strip_parentheticals("A (b) C (d)"), "A  C");
        assert_eq!(strip_parentheticals("Open (paren"), "Open (paren");
    }

    #[test]
    fn test_distinctive_words_skip_food_terms_and_short_words() {
        assert_eq!(distinctive_words("Biryani Darbar House"), vec!["darbar", "house"]);
        assert_eq!(distinctive_words("Cream Centre (Coimbatore)"), vec!["cream", "centre"]);
    }

    #[test]
    fn test_exact_match() {
        let m = match_name("Dinner at Shree Anandhaas tonight", "Shree Anandhaas").unwrap();
        assert_eq!(m.match_type, MatchType::Exact);
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_partial_match_with_spelling_variant() {
        let m = match_name("the cream center was packed", "Cream Centre (Coimbatore)").unwrap();
        assert_eq!(m.match_type, MatchType::Partial);
        assert_eq!(m.confidence, 0.8);

        let m = match_name("I ate at anandhaas", "Shree Anandhaas").unwrap();
        assert_eq!(m.match_type, MatchType::Partial);
    }

    #[test]
    fn test_fuzzy_partial_match_on_typo() {
        let m = match_name("went to anandaas today", "Shree Anandhaas").unwrap();
        assert_eq!(m.match_type, MatchType::FuzzyPartial);
        assert!(m.confidence > 0.75 && m.confidence < 1.0);
    }

    #[test]
    fn test_fuzzy_full_name_match() {
        let m = match_name("craving haribavan now", "Haribhavan").unwrap();
        assert_eq!(m.match_type, MatchType::Fuzzy);
        assert!(m.confidence > 0.7);
    }

    #[test]
    fn test_food_words_never_match_restaurants() {
        assert!(match_name("best biryani in town", "Biryani Point").is_none());
    }

    #[test]
    fn test_dish_match() {
        assert_eq!(
            match_dish("the masala dosa was tasty", "Masala Dosa").map(|m| m.match_type),
            Some(MatchType::Exact)
        );
        let partial = match_dish("crispy dosa", "Ghee Roast Dosa").unwrap();
        assert_eq!(partial.match_type, MatchType::Partial);
        assert_eq!(partial.confidence, 0.7);
        assert!(match_dish("tea", "Tea Cake").is_none());
    }
}
