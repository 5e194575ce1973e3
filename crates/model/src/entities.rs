use serde::{Deserialize, Serialize};

/// Which matching tier produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Full name found verbatim
    Exact,
    /// A distinctive name word (or spelling variant) found verbatim
    Partial,
    /// A text token is close to the full name
    Fuzzy,
    /// A text token is close to one distinctive name word
    FuzzyPartial,
}

/// A restaurant mentioned in free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub match_type: MatchType,
    /// Tier confidence in `0.0..=1.0`; used for ordering only
    pub confidence: f32,
}

/// A menu dish mentioned in free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishMatch {
    pub dish_name: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub match_type: MatchType,
    pub confidence: f32,
}

/// Polarity label of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Signed score: +1, -1 or 0.
    pub fn score(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: Sentiment,
    pub score: i8,
}

impl From<Sentiment> for SentimentResult {
    fn from(label: Sentiment) -> Self {
        Self {
            label,
            score: label.score(),
        }
    }
}

/// Everything recognized in one text blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub restaurants: Vec<EntityMatch>,
    pub dishes: Vec<DishMatch>,
    pub cuisines: Vec<String>,
    pub sentiment: SentimentResult,
}

impl ExtractedEntities {
    pub fn mentions_restaurant(&self, restaurant_id: &str) -> bool {
        self.restaurants.iter().any(|r| r.restaurant_id == restaurant_id)
    }
}
