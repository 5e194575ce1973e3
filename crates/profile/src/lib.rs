//! Taste profiles built from a user's social activity.
//!
//! Own posts, liked posts and authored comments are run through entity
//! extraction and folded into signed frequency maps. Comments carry
//! sentiment: a negative comment subtracts affinity from the restaurant it
//! is about, which may be the restaurant named by the parent post rather
//! than the comment itself.

use chrono::{FixedOffset, Offset, Timelike, Utc};
use smartdine_extract::EntityExtractor;
use smartdine_model::{
    Catalog, EntityMatch, FrequencyMap, Sentiment, TimeSlot, TimeSlots, UserActivity, UserProfile,
};

/// Default offset used to bucket post times: UTC+05:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Weight of a signal found in the user's own post.
const OWN_POST_WEIGHT: f64 = 2.0;
/// Weight of a signal found in a post the user liked.
const LIKED_POST_WEIGHT: f64 = 1.0;

/// Profile builder configuration.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub favorite_restaurants: usize,
    pub favorite_cuisines: usize,
    pub favorite_dishes: usize,
    /// Offset at which post creation hours are read
    pub utc_offset: FixedOffset,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            favorite_restaurants: 10,
            favorite_cuisines: 5,
            favorite_dishes: 10,
            utc_offset: offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES),
        }
    }
}

/// Convert minutes east of UTC into an offset, falling back to UTC when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Signed weight a comment contributes, by its sentiment.
pub fn comment_weight(sentiment: Sentiment) -> f64 {
    match sentiment {
        Sentiment::Negative => -2.0,
        Sentiment::Positive => 2.0,
        Sentiment::Neutral => 0.5,
    }
}

/// Keys of the `n` heaviest entries of `map`, ties by insertion order.
pub fn get_top_items(map: &FrequencyMap, n: usize) -> Vec<String> {
    map.top(n)
}

#[derive(Debug, Default)]
struct Tally {
    restaurants: FrequencyMap,
    cuisines: FrequencyMap,
    dishes: FrequencyMap,
    time_slots: TimeSlots,
}

impl Tally {
    fn credit_restaurants(&mut self, matches: &[EntityMatch], weight: f64) {
        for m in matches {
            self.restaurants.add(&m.restaurant_id, weight);
        }
    }
}

/// Builds a [`UserProfile`] from raw [`UserActivity`] against one catalog.
#[derive(Debug, Clone)]
pub struct ProfileBuilder<'a> {
    extractor: EntityExtractor<'a>,
    config: ProfileConfig,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, ProfileConfig::default())
    }

    pub fn with_config(catalog: &'a Catalog, config: ProfileConfig) -> Self {
        Self {
            extractor: EntityExtractor::new(catalog),
            config,
        }
    }

    /// Build a profile. Deterministic for a given activity and catalog.
    pub fn build(&self, activity: &UserActivity) -> UserProfile {
        if activity.is_empty() {
            return UserProfile::default();
        }

        let mut tally = Tally::default();
        self.tally_own_posts(activity, &mut tally);
        self.tally_liked_posts(activity, &mut tally);
        self.tally_comments(activity, &mut tally);

        let total_posts = activity.posts.len() as u32;
        let total_likes = activity.liked_posts.len() as u32;
        let total_comments = activity.comments.len() as u32;

        UserProfile {
            favorite_restaurants: get_top_items(&tally.restaurants, self.config.favorite_restaurants),
            favorite_cuisines: get_top_items(&tally.cuisines, self.config.favorite_cuisines),
            favorite_dishes: get_top_items(&tally.dishes, self.config.favorite_dishes),
            restaurant_frequency: tally.restaurants,
            cuisine_frequency: tally.cuisines,
            dish_frequency: tally.dishes,
            most_active_time: tally.time_slots.most_active(),
            time_slots: tally.time_slots,
            total_posts,
            total_likes,
            total_comments,
            activity_score: f64::from(total_posts) * 2.0
                + f64::from(total_likes)
                + f64::from(total_comments) * 1.5,
        }
    }

    fn tally_own_posts(&self, activity: &UserActivity, tally: &mut Tally) {
        for post in &activity.posts {
            let Some(caption) = post.caption_text() else {
                continue;
            };

            let entities = self.extractor.extract_entities(caption);
            tally.credit_restaurants(&entities.restaurants, OWN_POST_WEIGHT);

            if let Some(location) = post.location_text() {
                let at_location: Vec<EntityMatch> = self
                    .extractor
                    .extract_restaurant_mentions(location)
                    .into_iter()
                    .filter(|m| !entities.mentions_restaurant(&m.restaurant_id))
                    .collect();
                tally.credit_restaurants(&at_location, OWN_POST_WEIGHT);
            }

            for cuisine in &entities.cuisines {
                tally.cuisines.add(cuisine, OWN_POST_WEIGHT);
            }
            for dish in &entities.dishes {
                tally.dishes.add(&dish.dish_name, OWN_POST_WEIGHT);
            }

            let hour = post.created_at.with_timezone(&self.config.utc_offset).hour();
            tally.time_slots.record(TimeSlot::from_hour(hour));
        }
    }

    fn tally_liked_posts(&self, activity: &UserActivity, tally: &mut Tally) {
        for post in &activity.liked_posts {
            let Some(caption) = post.caption_text() else {
                continue;
            };

            let entities = self.extractor.extract_entities(caption);
            tally.credit_restaurants(&entities.restaurants, LIKED_POST_WEIGHT);
            for cuisine in &entities.cuisines {
                tally.cuisines.add(cuisine, LIKED_POST_WEIGHT);
            }
            for dish in &entities.dishes {
                tally.dishes.add(&dish.dish_name, LIKED_POST_WEIGHT);
            }
        }
    }

    fn tally_comments(&self, activity: &UserActivity, tally: &mut Tally) {
        for comment in &activity.comments {
            let Some(text) = comment.text_content() else {
                continue;
            };

            let entities = self.extractor.extract_entities(text);
            let weight = comment_weight(entities.sentiment.label);

            if !entities.restaurants.is_empty() {
                tally.credit_restaurants(&entities.restaurants, weight);
            } else if let Some(parent) = comment
                .post_id
                .as_deref()
                .and_then(|id| activity.commented_post(id))
            {
                // The parent's location is authoritative; its caption is only used without one.
                let context = parent.location_text().or(parent.caption_text());
                if let Some(context) = context {
                    let attributed = self.extractor.extract_restaurant_mentions(context);
                    for m in &attributed {
                        tracing::debug!(
                            comment_id = %comment.id,
                            post_id = %parent.id,
                            restaurant = %m.restaurant_name,
                            weight,
                            "Attributing comment to parent post restaurant"
                        );
                    }
                    tally.credit_restaurants(&attributed, weight);
                }
            }

            for cuisine in &entities.cuisines {
                tally.cuisines.add(cuisine, weight);
            }
            for dish in &entities.dishes {
                tally.dishes.add(&dish.dish_name, weight);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use smartdine_model::{Comment, Post, Restaurant};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Restaurant::new("r001", "Shree Anandhaas")
                .with_cuisines(&["South Indian"])
                .with_menu(&["Masala Dosa", "Filter Coffee"]),
            Restaurant::new("r002", "Cream Centre")
                .with_cuisines(&["North Indian", "Desserts"])
                .with_menu(&["Sizzling Brownie"]),
            Restaurant::new("r003", "Haribhavan").with_cuisines(&["Chettinad"]),
        ])
    }

    #[test]
    fn test_empty_activity_gives_default_profile() {
        let catalog = catalog();
        let profile = ProfileBuilder::new(&catalog).build(&UserActivity::default());
        assert_eq!(profile, UserProfile::default());
        assert_eq!(profile.most_active_time, TimeSlot::Evening);
    }

    #[test]
    fn test_own_post_caption_and_location() {
        let catalog = catalog();
        let activity = UserActivity {
            posts: vec![
                Post::new("p1", Some("Masala dosa at Shree Anandhaas"), Some("Shree Anandhaas")),
                Post::new("p2", Some("Sunday treat"), Some("Cream Centre")),
                Post::new("p3", None, Some("Haribhavan")),
            ],
            ..Default::default()
        };

        let profile = ProfileBuilder::new(&catalog).build(&activity);
        // caption and location naming the same place credit it once
        assert_eq!(profile.restaurant_frequency.get("r001"), Some(2.0));
        assert_eq!(profile.restaurant_frequency.get("r002"), Some(2.0));
        // posts without a caption are skipped entirely
        assert_eq!(profile.restaurant_frequency.get("r003"), None);
        assert_eq!(profile.dish_frequency.get("Masala Dosa"), Some(2.0));
        assert_eq!(profile.favorite_restaurants, vec!["r001", "r002"]);
        assert_eq!(profile.total_posts, 3);
        assert_eq!(profile.activity_score, 6.0);
    }

    #[test]
    fn test_negative_comment_attributed_to_parent_location() {
        let catalog = catalog();
        let activity = UserActivity {
            comments: vec![Comment::new("c1", Some("p9"), "terrible food")],
            commented_posts: vec![Post::new("p9", Some("Shree Anandhaas vibes"), Some("Cream Centre"))],
            ..Default::default()
        };

        let profile = ProfileBuilder::new(&catalog).build(&activity);
        assert_eq!(profile.restaurant_frequency.get("r002"), Some(-2.0));
        // location wins over caption when both exist
        assert_eq!(profile.restaurant_frequency.get("r001"), None);
        assert_eq!(profile.total_comments, 1);
        assert_eq!(profile.activity_score, 1.5);
    }

    #[test]
    fn test_comment_falls_back_to_parent_caption() {
        let catalog = catalog();
        let activity = UserActivity {
            comments: vec![Comment::new("c1", Some("p9"), "loved it")],
            commented_posts: vec![Post::new("p9", Some("Evening at Haribhavan"), None)],
            ..Default::default()
        };

        let profile = ProfileBuilder::new(&catalog).build(&activity);
        assert_eq!(profile.restaurant_frequency.get("r003"), Some(2.0));
    }

    #[test]
    fn test_comment_naming_restaurant_ignores_parent() {
        let catalog = catalog();
        let activity = UserActivity {
            comments: vec![Comment::new("c1", Some("p9"), "Cream Centre is ok")],
            commented_posts: vec![Post::new("p9", None, Some("Haribhavan"))],
            ..Default::default()
        };

        let profile = ProfileBuilder::new(&catalog).build(&activity);
        assert_eq!(profile.restaurant_frequency.get("r002"), Some(0.5));
        assert_eq!(profile.restaurant_frequency.get("r003"), None);
    }

    #[test]
    fn test_liked_posts_weigh_one_and_skip_time_slots() {
        let catalog = catalog();
        let activity = UserActivity {
            liked_posts: vec![Post::new("p1", Some("desserts at Cream Centre"), None)],
            ..Default::default()
        };

        let profile = ProfileBuilder::new(&catalog).build(&activity);
        assert_eq!(profile.restaurant_frequency.get("r002"), Some(1.0));
        assert_eq!(profile.cuisine_frequency.get("Desserts"), Some(1.0));
        assert_eq!(profile.time_slots, TimeSlots::default());
        // activity exists, so the all-zero tie resolves to morning
        assert_eq!(profile.most_active_time, TimeSlot::Morning);
        assert_eq!(profile.total_likes, 1);
    }

    #[test]
    fn test_time_slots_use_configured_offset() {
        let catalog = catalog();
        // 14:00 UTC is 19:30 at +05:30 (evening) but afternoon at UTC
        let created = Utc.with_ymd_and_hms(2024, 3, 2, 14, 0, 0).unwrap();
        let activity = UserActivity {
            posts: vec![Post::new("p1", Some("dinner"), None).at(created)],
            ..Default::default()
        };

        let ist = ProfileBuilder::new(&catalog).build(&activity);
        assert_eq!(ist.most_active_time, TimeSlot::Evening);

        let config = ProfileConfig {
            utc_offset: offset_from_minutes(0),
            ..Default::default()
        };
        let utc = ProfileBuilder::with_config(&catalog, config).build(&activity);
        assert_eq!(utc.most_active_time, TimeSlot::Afternoon);
    }

    #[test]
    fn test_build_is_deterministic() {
        let catalog = catalog();
        let activity = UserActivity {
            posts: vec![Post::new("p1", Some("Filter coffee at Shree Anandhaas"), None)],
            liked_posts: vec![Post::new("p2", Some("Cream Centre brownie"), None)],
            comments: vec![Comment::new("c1", None, "Haribhavan was great")],
            commented_posts: Vec::new(),
        };

        let builder = ProfileBuilder::new(&catalog);
        assert_eq!(builder.build(&activity), builder.build(&activity));
    }

    #[test]
    fn test_get_top_items() {
        let mut map = FrequencyMap::new();
        map.add("r002", 1.0);
        map.add("r001", 4.0);
        map.add("r003", 1.0);
        assert_eq!(get_top_items(&map, 2), vec!["r001", "r002"]);
    }
}
