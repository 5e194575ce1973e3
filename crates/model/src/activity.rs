use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::FrequencyMap;

/// One of the four fixed hour bands of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 05:59
    Night,
}

impl TimeSlot {
    /// Enumeration order, also the tie-break order for `most_active`.
    pub const ALL: [TimeSlot; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity counts per time slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlots {
    pub morning: u32,
    pub afternoon: u32,
    pub evening: u32,
    pub night: u32,
}

impl TimeSlots {
    pub fn record(&mut self, slot: TimeSlot) {
        match slot {
            TimeSlot::Morning => self.morning += 1,
            TimeSlot::Afternoon => self.afternoon += 1,
            TimeSlot::Evening => self.evening += 1,
            TimeSlot::Night => self.night += 1,
        }
    }

    pub fn count(&self, slot: TimeSlot) -> u32 {
        match slot {
            TimeSlot::Morning => self.morning,
            TimeSlot::Afternoon => self.afternoon,
            TimeSlot::Evening => self.evening,
            TimeSlot::Night => self.night,
        }
    }

    /// Slot with the highest count; the earliest slot in `TimeSlot::ALL` wins ties.
    pub fn most_active(&self) -> TimeSlot {
        let mut best = TimeSlot::Morning;
        for slot in TimeSlot::ALL {
            if self.count(slot) > self.count(best) {
                best = slot;
            }
        }
        best
    }
}

/// Accepts both string and integer ids from the activity store.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}

/// A social post authored by some user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub caption: Option<String>,

    /// Free-text location, often a restaurant name
    #[serde(default)]
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(id: impl Into<String>, caption: Option<&str>, location: Option<&str>) -> Self {
        Self {
            id: id.into(),
            caption: caption.map(str::to_string),
            location: location.map(str::to_string),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Caption, when present and non-empty.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.is_empty())
    }

    /// Location, when present and non-empty.
    pub fn location_text(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }
}

/// A comment authored by the user on some post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub post_id: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: impl Into<String>, post_id: Option<&str>, text: &str) -> Self {
        Self {
            id: id.into(),
            post_id: post_id.map(str::to_string),
            text: Some(text.to_string()),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Raw activity of one user, as supplied by the activity store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    /// Posts the user authored
    #[serde(default)]
    pub posts: Vec<Post>,

    /// Posts the user liked
    #[serde(default)]
    pub liked_posts: Vec<Post>,

    /// Comments the user authored
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Posts targeted by `comments`
    #[serde(default)]
    pub commented_posts: Vec<Post>,
}

impl UserActivity {
    /// True when there is nothing to learn from.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.liked_posts.is_empty() && self.comments.is_empty()
    }

    pub fn commented_post(&self, post_id: &str) -> Option<&Post> {
        self.commented_posts.iter().find(|p| p.id == post_id)
    }
}

/// A user's weighted taste profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub favorite_restaurants: Vec<String>,
    pub favorite_cuisines: Vec<String>,
    pub favorite_dishes: Vec<String>,
    pub restaurant_frequency: FrequencyMap,
    pub cuisine_frequency: FrequencyMap,
    pub dish_frequency: FrequencyMap,
    pub most_active_time: TimeSlot,
    pub time_slots: TimeSlots,
    pub total_posts: u32,
    pub total_likes: u32,
    pub total_comments: u32,
    /// `posts * 2 + likes + comments * 1.5`
    pub activity_score: f64,
}

impl Default for UserProfile {
    /// The profile of a user with no activity at all.
    fn default() -> Self {
        Self {
            favorite_restaurants: Vec::new(),
            favorite_cuisines: Vec::new(),
            favorite_dishes: Vec::new(),
            restaurant_frequency: FrequencyMap::new(),
            cuisine_frequency: FrequencyMap::new(),
            dish_frequency: FrequencyMap::new(),
            most_active_time: TimeSlot::Evening,
            time_slots: TimeSlots::default(),
            total_posts: 0,
            total_likes: 0,
            total_comments: 0,
            activity_score: 0.0,
        }
    }
}

impl UserProfile {
    pub fn total_activity(&self) -> u32 {
        self.total_posts + self.total_likes + self.total_comments
    }
}
