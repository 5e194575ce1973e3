//! Time-of-day and weather context scoring.
//!
//! Each restaurant gets two small additive boosts: one for how well it
//! suits the current time (breakfast spots in the morning, late-night
//! delivery after 21:00, ...) and one for the current weather.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use serde::Serialize;
use smartdine_model::{Catalog, PriceLevel, Restaurant, TimeSlot, WeatherCondition, WeatherReading};
use std::collections::HashMap;

/// Season of the year, using the South Indian calendar regardless of location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// March to June
    Summer,
    /// July to October
    Monsoon,
    /// November to February
    Winter,
}

impl Season {
    /// Season for a calendar month (1 = January).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=6 => Self::Summer,
            7..=10 => Self::Monsoon,
            _ => Self::Winter,
        }
    }
}

/// Snapshot of "when" a request happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeContext {
    pub hour: u32,
    pub time_of_day: TimeSlot,
    /// Lowercase English day name, e.g. "saturday"
    pub day_of_week: String,
    pub is_weekend: bool,
    pub season: Season,
}

impl TimeContext {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        let hour = now.hour();
        let weekday = now.weekday();
        Self {
            hour,
            time_of_day: TimeSlot::from_hour(hour),
            day_of_week: weekday_name(weekday).to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            season: Season::from_month(now.month()),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn has_any_tag(restaurant: &Restaurant, tags: &[&str]) -> bool {
    tags.iter().any(|t| restaurant.has_tag(t))
}

fn hours_contain_any(restaurant: &Restaurant, needles: &[&str]) -> bool {
    needles.iter().any(|n| restaurant.opening_hours.contains(n))
}

/// True when any highlighted dish name contains one of `keywords`.
fn menu_mentions_any(restaurant: &Restaurant, keywords: &[&str]) -> bool {
    let menu = restaurant
        .menu_highlights
        .iter()
        .map(|m| m.name.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    keywords.iter().any(|k| menu.contains(k))
}

/// Time-of-day suitability boost for one restaurant.
pub fn time_score(restaurant: &Restaurant, ctx: &TimeContext) -> i32 {
    let mut score = 0;

    match ctx.time_of_day {
        TimeSlot::Morning => {
            if has_any_tag(restaurant, &["tiffin", "breakfast"]) {
                score += 15;
            }
            if restaurant.has_tag("cafe") || restaurant.has_cuisine("Cafe") {
                score += 10;
            }
            if hours_contain_any(restaurant, &["06:", "07:"]) {
                score += 5;
            }
        }
        TimeSlot::Afternoon => {
            if has_any_tag(restaurant, &["thali", "buffet"]) {
                score += 10;
            }
            if has_any_tag(restaurant, &["quick-service", "fast-food"]) {
                score += 8;
            }
        }
        TimeSlot::Evening => {
            if has_any_tag(restaurant, &["family", "fine-dining"]) {
                score += 10;
            }
            if has_any_tag(restaurant, &["aesthetic", "lounge"]) {
                score += 8;
            }
        }
        TimeSlot::Night => {
            if has_any_tag(restaurant, &["delivery", "takeaway"]) {
                score += 20;
            }
            if has_any_tag(restaurant, &["bar", "lounge"]) {
                score += 15;
            }
            if hours_contain_any(restaurant, &["11:", "12:", "01:"]) {
                score += 10;
            }
        }
    }

    let daytime = matches!(ctx.time_of_day, TimeSlot::Morning | TimeSlot::Afternoon);
    if ctx.is_weekend {
        if restaurant.has_tag("fine-dining") || restaurant.price_level == PriceLevel::Expensive {
            score += 15;
        }
        if daytime && restaurant.has_tag("brunch") {
            score += 10;
        }
        if has_any_tag(restaurant, &["group", "group-friendly"]) {
            score += 8;
        }
    } else if ctx.time_of_day == TimeSlot::Afternoon
        && (restaurant.has_tag("quick-service") || restaurant.price_level == PriceLevel::Budget)
    {
        score += 10;
    }

    score
}

/// Weather suitability boost for one restaurant.
pub fn weather_score(restaurant: &Restaurant, weather: &WeatherReading) -> i32 {
    let mut score = 0;

    if weather.condition.is_wet() {
        if has_any_tag(restaurant, &["delivery", "takeaway"]) {
            score += 20;
        }
        if restaurant.has_tag("comfort-food") || restaurant.has_cuisine("Indian") {
            score += 10;
        }
        if restaurant.has_tag("indoor") {
            score += 10;
        }
    }

    if weather.temperature > 30.0 {
        if has_any_tag(restaurant, &["desserts", "ice-cream"]) {
            score += 15;
        }
        if has_any_tag(restaurant, &["cafe", "beverages"]) {
            score += 10;
        }
        if menu_mentions_any(restaurant, &["ice cream", "cold coffee", "milkshake", "smoothie"]) {
            score += 10;
        }
    }

    if weather.temperature < 20.0 {
        if has_any_tag(restaurant, &["comfort-food", "traditional"]) {
            score += 15;
        }
        if menu_mentions_any(restaurant, &["soup", "coffee", "tea", "hot chocolate"]) {
            score += 10;
        }
    }

    if (20.0..=30.0).contains(&weather.temperature)
        && weather.condition == WeatherCondition::Clear
        && has_any_tag(restaurant, &["outdoor", "rooftop"])
    {
        score += 15;
    }

    score
}

/// Time and weather boosts of one restaurant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextScore {
    pub time: i32,
    pub weather: i32,
}

/// Context boosts for a whole catalog, keyed by restaurant id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextScores {
    scores: HashMap<String, ContextScore>,
}

impl ContextScores {
    /// Scores for `id`, or zeros when the restaurant was not scored.
    pub fn get(&self, id: &str) -> ContextScore {
        self.scores.get(id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(String, ContextScore)> for ContextScores {
    fn from_iter<I: IntoIterator<Item = (String, ContextScore)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Score every restaurant. Weather boosts stay zero when no reading is available.
pub fn score_catalog(
    catalog: &Catalog,
    time: &TimeContext,
    weather: Option<&WeatherReading>,
) -> ContextScores {
    catalog
        .iter()
        .map(|r| {
            let score = ContextScore {
                time: time_score(r, time),
                weather: weather.map_or(0, |w| weather_score(r, w)),
            };
            (r.id.clone(), score)
        })
        .collect()
}
