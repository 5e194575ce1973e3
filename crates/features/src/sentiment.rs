//! Keyword sentiment for short food reviews and comments.
//!
//! Each keyword counts once when present anywhere in the lowercased text.
//! Negative keywords weigh twice as much as positive ones.

use smartdine_model::{Sentiment, SentimentResult};

const NEGATIVE_KEYWORDS: &[&str] = &[
    "bad", "worst", "terrible", "horrible", "disgusting", "awful", "poor", "not good", "waste",
    "pathetic", "disappointing", "disappointed", "never again", "avoid", "overpriced",
    "overrated", "stale", "cold", "tasteless", "bland", "rude", "slow", "dirty", "unhygienic",
    "not worth", "regret", "hate", "hated", "nasty", "gross",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "fantastic", "delicious", "tasty",
    "yummy", "love", "loved", "best", "perfect", "wonderful", "superb", "outstanding",
    "brilliant", "incredible", "fresh", "hot", "flavorful", "recommend", "must try", "worth it",
    "satisfied", "happy", "enjoyed", "favorite", "favourite",
];

const NEGATIVE_WEIGHT: u32 = 2;
const POSITIVE_WEIGHT: u32 = 1;

fn keyword_weight(text: &str, keywords: &[&str], weight: u32) -> u32 {
    keywords.iter().filter(|k| text.contains(*k)).count() as u32 * weight
}

/// Classify `text` as positive, negative or neutral.
pub fn classify_sentiment(text: &str) -> SentimentResult {
    let text = text.to_lowercase();
    let negative = keyword_weight(&text, NEGATIVE_KEYWORDS, NEGATIVE_WEIGHT);
    let positive = keyword_weight(&text, POSITIVE_KEYWORDS, POSITIVE_WEIGHT);

    let label = if negative > positive {
        Sentiment::Negative
    } else if positive > negative {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    };
    label.into()
}
