use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thumbs up or down on a recommended restaurant.
///
/// Field names follow the stored file layout (`restaurantId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: String,
    pub restaurant_id: String,
    pub liked: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stored_layout() {
        let entry = FeedbackEntry {
            id: "f1".to_string(),
            restaurant_id: "r001".to_string(),
            liked: false,
            timestamp: Utc.with_ymd_and_hms(2024, 7, 3, 8, 30, 0).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["restaurantId"], "r001");
        assert_eq!(json["liked"], false);
        assert_eq!(json["timestamp"], "2024-07-03T08:30:00Z");

        let back: FeedbackEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
