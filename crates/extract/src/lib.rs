//! Entity extraction from free text.
//!
//! Finds restaurants, dishes and cuisines from the catalog mentioned in a
//! caption, location or comment, and classifies the text's sentiment.

use smartdine_features::{classify_sentiment, match_dish, match_name};
use smartdine_model::{Catalog, DishMatch, EntityMatch, ExtractedEntities};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Dish names that also appear as cuisine labels and must not count as cuisines.
pub const CUISINE_DISH_STOPLIST: &[&str] = &[
    "biryani", "dosa", "idli", "vada", "thali", "curry", "masala", "tandoori", "tikka", "kebab",
    "naan", "roti", "paratha",
];

/// Maximum number of dish matches returned for one text.
pub const MAX_DISH_MATCHES: usize = 5;

/// Extracts catalog entities from text against one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct EntityExtractor<'a> {
    catalog: &'a Catalog,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Restaurants named in `text`, most confident first, one per restaurant.
    pub fn extract_restaurant_mentions(&self, text: &str) -> Vec<EntityMatch> {
        let mut matches: Vec<EntityMatch> = self
            .catalog
            .iter()
            .filter_map(|restaurant| {
                match_name(text, &restaurant.name).map(|m| EntityMatch {
                    restaurant_id: restaurant.id.clone(),
                    restaurant_name: restaurant.name.clone(),
                    match_type: m.match_type,
                    confidence: m.confidence,
                })
            })
            .collect();

        sort_by_confidence(&mut matches, |m| m.confidence);

        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert(m.restaurant_id.clone()));
        matches
    }

    /// Menu dishes named in `text`, optionally restricted to one restaurant.
    pub fn extract_dish_mentions(&self, text: &str, restaurant_id: Option<&str>) -> Vec<DishMatch> {
        let mut matches = Vec::new();

        for restaurant in self
            .catalog
            .iter()
            .filter(|r| restaurant_id.map_or(true, |id| r.id == id))
        {
            for dish in &restaurant.menu_highlights {
                if let Some(m) = match_dish(text, &dish.name) {
                    matches.push(DishMatch {
                        dish_name: dish.name.clone(),
                        restaurant_id: restaurant.id.clone(),
                        restaurant_name: restaurant.name.clone(),
                        match_type: m.match_type,
                        confidence: m.confidence,
                    });
                }
            }
        }

        sort_by_confidence(&mut matches, |m| m.confidence);

        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert((m.restaurant_id.clone(), m.dish_name.clone())));
        matches.truncate(MAX_DISH_MATCHES);
        matches
    }

    /// Distinct catalog cuisine labels found in `text`, in catalog order.
    pub fn extract_cuisine_types(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        self.catalog
            .cuisines()
            .into_iter()
            .filter(|cuisine| {
                let lower = cuisine.to_lowercase();
                !CUISINE_DISH_STOPLIST.contains(&lower.as_str()) && text.contains(&lower)
            })
            .map(str::to_string)
            .collect()
    }

    /// Run every extraction pass plus sentiment classification.
    pub fn extract_entities(&self, text: &str) -> ExtractedEntities {
        ExtractedEntities {
            restaurants: self.extract_restaurant_mentions(text),
            dishes: self.extract_dish_mentions(text, None),
            cuisines: self.extract_cuisine_types(text),
            sentiment: classify_sentiment(text),
        }
    }
}

/// Stable sort, highest confidence first.
fn sort_by_confidence<T>(items: &mut [T], confidence: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| {
        confidence(b)
            .partial_cmp(&confidence(a))
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartdine_model::{MatchType, Restaurant, Sentiment};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Restaurant::new("r001", "Shree Anandhaas")
                .with_cuisines(&["South Indian", "Vegetarian"])
                .with_menu(&["Masala Dosa", "Ghee Roast", "Filter Coffee"]),
            Restaurant::new("r002", "Cream Centre (Coimbatore)")
                .with_cuisines(&["North Indian", "Desserts"])
                .with_menu(&["Chole Bhature", "Sizzling Brownie"]),
            Restaurant::new("r003", "Biryani Point")
                .with_cuisines(&["Biryani", "Mughlai"])
                .with_menu(&["Chicken Biryani", "Mutton Biryani"]),
            Restaurant::new("r004", "Anandhaas Express").with_cuisines(&["South Indian"]),
        ])
    }

    #[test]
    fn test_restaurant_mentions_ordered_and_unique() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);

        let matches = extractor.extract_restaurant_mentions("Lunch at Anandhaas Express today");
        let ids: Vec<&str> = matches.iter().map(|m| m.restaurant_id.as_str()).collect();
        assert_eq!(ids, vec!["r004", "r001"]);
        assert_eq!(matches[0].match_type, MatchType::Exact);
        assert_eq!(matches[1].match_type, MatchType::Partial);
    }

    #[test]
    fn test_location_with_spelling_variant() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);
        let matches = extractor.extract_restaurant_mentions("Cream Center");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].restaurant_id, "r002");
    }

    #[test]
    fn test_food_words_do_not_name_restaurants() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);
        assert!(extractor.extract_restaurant_mentions("craving biryani").is_empty());
    }

    #[test]
    fn test_dish_mentions() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);

        let dishes = extractor.extract_dish_mentions("the masala dosa and biryani", None);
        assert_eq!(dishes[0].dish_name, "Masala Dosa");
        assert_eq!(dishes[0].confidence, 1.0);
        assert!(dishes.iter().all(|d| d.confidence <= dishes[0].confidence));
        assert!(dishes.iter().any(|d| d.dish_name == "Mutton Biryani"));
        assert!(dishes.len() <= MAX_DISH_MATCHES);

        let scoped = extractor.extract_dish_mentions("the masala dosa and biryani", Some("r003"));
        assert!(scoped.iter().all(|d| d.restaurant_id == "r003"));
    }

    #[test]
    fn test_cuisines_skip_dish_names() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);
        let cuisines = extractor.extract_cuisine_types("south indian breakfast then biryani and desserts");
        assert_eq!(cuisines, vec!["South Indian", "Desserts"]);
    }

    #[test]
    fn test_extract_entities() {
        let catalog = catalog();
        let extractor = EntityExtractor::new(&catalog);
        let entities = extractor.extract_entities("Terrible food at Shree Anandhaas");
        assert!(entities.mentions_restaurant("r001"));
        assert_eq!(entities.sentiment.label, Sentiment::Negative);
    }
}
