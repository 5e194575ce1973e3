//! Query validation and oracle prompt generation.
//!
//! Turns a free-text craving ("something warm, it's raining") into:
//! - a validated query
//! - a detected dietary intent used to filter similar results
//! - a ranking prompt for the oracle, embedding a compact catalog listing

use smartdine_model::{Catalog, Restaurant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Empty query text")]
    EmptyQuery,
}

/// Reject empty or whitespace-only query text.
pub fn validate_query(text: &str) -> Result<&str, QueryError> {
    if text.trim().is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    Ok(text)
}

/// Dietary preference implied by the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietaryIntent {
    Veg,
    NonVeg,
    #[default]
    Neutral,
}

const NON_VEG_KEYWORDS: &[&str] = &["non-veg", "chicken", "mutton", "fish", "egg", "beef", "pork"];

/// Detect dietary intent. "veg" without "non-veg" wins over meat keywords.
pub fn detect_dietary_intent(text: &str) -> DietaryIntent {
    let text = text.to_lowercase();
    if text.contains("veg") && !text.contains("non-veg") {
        DietaryIntent::Veg
    } else if NON_VEG_KEYWORDS.iter().any(|k| text.contains(k)) {
        DietaryIntent::NonVeg
    } else {
        DietaryIntent::Neutral
    }
}

impl DietaryIntent {
    /// Whether `restaurant` may be suggested under this intent.
    pub fn allows(self, restaurant: &Restaurant) -> bool {
        match self {
            Self::Veg => {
                !restaurant.has_cuisine("Non-Veg") && !restaurant.has_tag("non-veg-specialty")
            }
            Self::NonVeg => !restaurant.has_cuisine("Vegetarian"),
            Self::Neutral => true,
        }
    }
}

/// One catalog line for the oracle prompt.
pub fn render_restaurant_line(r: &Restaurant) -> String {
    let menu = r
        .menu_highlights
        .iter()
        .map(|m| format!("{} ({})", m.name, m.price))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "ID: {} | Name: {} | Rating: {} | Cuisine: {} | Tags: {} | Menu: {} | Desc: {}",
        r.id,
        r.name,
        r.rating,
        r.cuisines.join(", "),
        r.tags.join(", "),
        menu,
        r.description
    )
}

/// The whole catalog, one restaurant per line, in catalog order.
pub fn render_catalog_context(catalog: &Catalog) -> String {
    catalog
        .iter()
        .map(render_restaurant_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for turning a query and catalog into an oracle-specific prompt.
pub trait PromptDialect {
    /// The output type (usually a prompt string)
    type Output;

    fn translate(&self, query: &str, catalog_context: &str) -> Result<Self::Output, QueryError>;
}

/// Restaurant concierge prompt: mood analysis plus 3-5 picks as JSON.
#[derive(Debug, Default)]
pub struct ConciergePrompt;

const CONCIERGE_TASK: &str = r#"Task:
1. Analyze the user's mood, craving, and intent from the query.
2. Select the top 3-5 restaurants that BEST match the query.
3. If the user is sad/stressed, prioritize comfort food or desserts.
4. If the user is celebrating, prioritize premium/lively places.
5. If the user is in a rush, prioritize fast food.
6. STRICTLY respect dietary keywords if present:
   - "Veg" / "Vegetarian" -> ONLY suggest restaurants/items that are explicitly vegetarian. Never suggest egg, chicken or mutton items.
   - If a specific dish is requested but only places without it are found, recommend them only when they offer a close alternative.
   - Never invent a dish that is not on the restaurant's menu; suggest the closest listed item instead.
7. STRICTLY respect rating constraints:
   - "rating above X" or "X stars" -> ONLY restaurants with Rating >= X.
   - "top rated" -> prioritize the highest rated options.
8. Return a JSON object with:
   - "analysis": short description of what the user is looking for.
   - "recommendations": array of objects with
     - "id": the restaurant ID.
     - "reason": why this fits their mood or query.
     - "suggested_item": a dish from that restaurant's menu list.

Output Format (JSON ONLY):
{
  "analysis": "User is feeling down and wants something sweet.",
  "recommendations": [
    { "id": "r010", "reason": "Perfect for lifting your spirits with sugary treats.", "suggested_item": "Red Velvet Cake" }
  ]
}"#;

impl PromptDialect for ConciergePrompt {
    type Output = String;

    fn translate(&self, query: &str, catalog_context: &str) -> Result<String, QueryError> {
        let query = validate_query(query)?;

        // Quotes would end the embedded query string early
        let escaped = query.replace('"', "'");

        Ok(format!(
            "You are a smart restaurant concierge.\nUser Query: \"{}\"\n\nAvailable Restaurants:\n{}\n\n{}\n",
            escaped, catalog_context, CONCIERGE_TASK
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartdine_model::MenuItem;

    #[test]
    fn test_empty_query_error() {
        assert_eq!(validate_query("   "), Err(QueryError::EmptyQuery));
        assert_eq!(validate_query(""), Err(QueryError::EmptyQuery));
        assert_eq!(validate_query("dosa"), Ok("dosa"));
    }

    #[test]
    fn test_dietary_intent() {
        assert_eq!(detect_dietary_intent("Veg Biryani please"), DietaryIntent::Veg);
        assert_eq!(detect_dietary_intent("non-veg thali"), DietaryIntent::NonVeg);
        assert_eq!(detect_dietary_intent("chicken 65"), DietaryIntent::NonVeg);
        assert_eq!(detect_dietary_intent("something sweet"), DietaryIntent::Neutral);
    }

    #[test]
    fn test_dietary_filter() {
        let non_veg = Restaurant::new("r1", "Meat Co").with_cuisines(&["Non-Veg"]);
        let specialty = Restaurant::new("r2", "Grill").with_tags(&["non-veg-specialty"]);
        let veg = Restaurant::new("r3", "Annapoorna").with_cuisines(&["Vegetarian"]);

        assert!(!DietaryIntent::Veg.allows(&non_veg));
        assert!(!DietaryIntent::Veg.allows(&specialty));
        assert!(DietaryIntent::Veg.allows(&veg));
        assert!(!DietaryIntent::NonVeg.allows(&veg));
        assert!(DietaryIntent::Neutral.allows(&non_veg));
    }

    #[test]
    fn test_restaurant_line() {
        let mut r = Restaurant::new("r010", "Sweet Truth")
            .with_cuisines(&["Desserts", "Bakery"])
            .with_tags(&["cafe"]);
        r.rating = 4.5;
        r.description = "Cakes and more".to_string();
        r.menu_highlights = vec![MenuItem::new("Red Velvet Cake", 180.0), MenuItem::new("Brownie", 99.5)];

        assert_eq!(
            render_restaurant_line(&r),
            "ID: r010 | Name: Sweet Truth | Rating: 4.5 | Cuisine: Desserts, Bakery | Tags: cafe | Menu: Red Velvet Cake (180), Brownie (99.5) | Desc: Cakes and more"
        );
    }

    #[test]
    fn test_catalog_context_one_line_each() {
        let catalog = Catalog::new(vec![Restaurant::new("r1", "A"), Restaurant::new("r2", "B")]);
        let context = render_catalog_context(&catalog);
        assert_eq!(context.lines().count(), 2);
        assert!(context.starts_with("ID: r1 | Name: A"));
    }

    #[test]
    fn test_concierge_prompt() {
        let prompt = ConciergePrompt
            .translate("feeling \"low\", want dessert", "ID: r010 | Name: Sweet Truth")
            .unwrap();
        assert!(prompt.contains("User Query: \"feeling 'low', want dessert\""));
        assert!(prompt.contains("ID: r010 | Name: Sweet Truth"));
        assert!(prompt.contains("\"recommendations\""));

        assert!(matches!(
            ConciergePrompt.translate(" ", ""),
            Err(QueryError::EmptyQuery)
        ));
    }
}
