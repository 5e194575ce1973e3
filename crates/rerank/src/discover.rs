//! Paginated catalog browsing with optional search.
//!
//! A search term matches restaurants (name, cuisine, tag, description) and
//! individual menu dishes. Restaurants are listed before dishes.

use serde::Serialize;
use smartdine_model::{Catalog, PriceLevel, Restaurant, UserProfile};

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// How the user has interacted with a restaurant, read from its frequency weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    None,
    Liked,
    Commented,
    Posted,
}

pub fn interaction_status(weight: f64) -> InteractionStatus {
    if weight >= 2.0 {
        InteractionStatus::Posted
    } else if weight >= 1.5 {
        InteractionStatus::Commented
    } else if weight >= 1.0 {
        InteractionStatus::Liked
    } else {
        InteractionStatus::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Restaurant,
    Dish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub user_interaction: InteractionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub dish_name: String,
    pub dish_price: f64,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub restaurant_rating: f32,
    pub restaurant_cuisines: Vec<String>,
    pub restaurant_price_level: PriceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscoverEntry {
    Restaurant(RestaurantEntry),
    Dish(DishEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscoverCounts {
    pub restaurants: usize,
    pub dishes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverPage {
    pub results: Vec<DiscoverEntry>,
    pub pagination: Pagination,
    pub search_query: String,
    pub counts: DiscoverCounts,
}

/// A browse request. Zero page or page size fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct DiscoverRequest {
    pub search: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

fn restaurant_matches(r: &Restaurant, term: &str) -> bool {
    r.name.to_lowercase().contains(term)
        || r.cuisines.iter().any(|c| c.to_lowercase().contains(term))
        || r.tags.iter().any(|t| t.to_lowercase().contains(term))
        || r.description.to_lowercase().contains(term)
}

fn dish_entries(catalog: &Catalog, term: &str) -> Vec<DishEntry> {
    catalog
        .iter()
        .flat_map(|r| {
            r.menu_highlights
                .iter()
                .filter(|dish| dish.name.to_lowercase().contains(term))
                .map(move |dish| DishEntry {
                    kind: EntryKind::Dish,
                    dish_name: dish.name.clone(),
                    dish_price: dish.price,
                    restaurant_id: r.id.clone(),
                    restaurant_name: r.name.clone(),
                    restaurant_rating: r.rating,
                    restaurant_cuisines: r.cuisines.clone(),
                    restaurant_price_level: r.price_level,
                })
        })
        .collect()
}

/// List one page of the catalog, tagging restaurants with the user's interaction status.
pub fn discover(catalog: &Catalog, profile: Option<&UserProfile>, request: &DiscoverRequest) -> DiscoverPage {
    let page = request.page.max(1);
    let per_page = if request.per_page == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        request.per_page
    };
    let search = request.search.clone().unwrap_or_default();
    let term = search.to_lowercase();

    let (restaurants, dishes): (Vec<&Restaurant>, Vec<DishEntry>) = if term.is_empty() {
        (catalog.iter().collect(), Vec::new())
    } else {
        (
            catalog.iter().filter(|r| restaurant_matches(r, &term)).collect(),
            dish_entries(catalog, &term),
        )
    };

    let counts = DiscoverCounts {
        restaurants: restaurants.len(),
        dishes: dishes.len(),
    };

    let entries: Vec<DiscoverEntry> = restaurants
        .into_iter()
        .map(|r| {
            let weight = profile.map_or(0.0, |p| p.restaurant_frequency.weight(&r.id));
            DiscoverEntry::Restaurant(RestaurantEntry {
                kind: EntryKind::Restaurant,
                restaurant: r.clone(),
                user_interaction: interaction_status(weight),
            })
        })
        .chain(dishes.into_iter().map(DiscoverEntry::Dish))
        .collect();

    let total_results = entries.len();
    let total_pages = total_results.div_ceil(per_page);
    let results = entries
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    DiscoverPage {
        results,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_results,
            per_page,
            has_next: page < total_pages,
            has_prev: page > 1,
        },
        search_query: search,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartdine_model::MenuItem;

    fn catalog() -> Catalog {
        let mut restaurants: Vec<Restaurant> = (1..=14)
            .map(|i| Restaurant::new(format!("r{:03}", i), format!("Place {}", i)))
            .collect();
        restaurants[0] = Restaurant::new("r001", "Dosa Corner").with_cuisines(&["South Indian"]);
        restaurants[1].menu_highlights = vec![MenuItem::new("Paper Dosa", 90.0)];
        restaurants[2].description = "Famous for dosa".to_string();
        Catalog::new(restaurants)
    }

    #[test]
    fn test_interaction_status_thresholds() {
        assert_eq!(interaction_status(4.0), InteractionStatus::Posted);
        assert_eq!(interaction_status(2.0), InteractionStatus::Posted);
        assert_eq!(interaction_status(1.5), InteractionStatus::Commented);
        assert_eq!(interaction_status(1.0), InteractionStatus::Liked);
        assert_eq!(interaction_status(0.5), InteractionStatus::None);
        assert_eq!(interaction_status(-2.0), InteractionStatus::None);
    }

    #[test]
    fn test_browse_all_paginates() {
        let catalog = catalog();
        let page = discover(&catalog, None, &DiscoverRequest::default());
        assert_eq!(page.results.len(), 12);
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 1,
                total_pages: 2,
                total_results: 14,
                per_page: 12,
                has_next: true,
                has_prev: false,
            }
        );

        let second = discover(
            &catalog,
            None,
            &DiscoverRequest {
                page: 2,
                ..Default::default()
            },
        );
        assert_eq!(second.results.len(), 2);
        assert!(!second.pagination.has_next);
        assert!(second.pagination.has_prev);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let catalog = catalog();
        let page = discover(
            &catalog,
            None,
            &DiscoverRequest {
                page: usize::MAX,
                per_page: 12,
                ..Default::default()
            },
        );
        assert!(page.results.is_empty());
        assert_eq!(page.pagination.current_page, usize::MAX);
        assert_eq!(page.pagination.total_results, 14);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn test_search_lists_restaurants_before_dishes() {
        let catalog = catalog();
        let mut profile = UserProfile::default();
        profile.restaurant_frequency.add("r001", 1.5);

        let request = DiscoverRequest {
            search: Some("DOSA".to_string()),
            ..Default::default()
        };
        let page = discover(&catalog, Some(&profile), &request);

        assert_eq!(page.counts, DiscoverCounts { restaurants: 2, dishes: 1 });
        assert_eq!(page.search_query, "DOSA");
        match &page.results[0] {
            DiscoverEntry::Restaurant(entry) => {
                assert_eq!(entry.restaurant.id, "r001");
                assert_eq!(entry.user_interaction, InteractionStatus::Commented);
            }
            other => panic!("expected restaurant, got {:?}", other),
        }
        assert!(matches!(&page.results[2], DiscoverEntry::Dish(d) if d.dish_name == "Paper Dosa"));
    }

    #[test]
    fn test_entries_serialize_with_type() {
        let catalog = catalog();
        let request = DiscoverRequest {
            search: Some("paper".to_string()),
            ..Default::default()
        };
        let page = discover(&catalog, None, &request);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["results"][0]["type"], "dish");
        assert_eq!(json["results"][0]["restaurant_id"], "r002");
        assert_eq!(json["pagination"]["total_pages"], 1);
    }
}
