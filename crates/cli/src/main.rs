//! Command-line front end for the SmartDine recommendation engine.
//!
//! Usage:
//!     smartdine query "something warm, it's raining" --user u1 --lat 11.01 --lon 76.95
//!     smartdine similar r001
//!     smartdine profile u1
//!     smartdine discover --search biryani --page 2
//!     smartdine route --from-lat 11.01 --from-lon 76.95 --to-lat 11.03 --to-lon 76.97
//!     smartdine feedback r001 true
//!     smartdine health
//!     smartdine shell
//!
//! Settings come from flags, then the environment, then a `.env` file.
//!
//! Each one-shot command builds a fresh engine, so nothing is cached between
//! invocations. `shell` keeps one engine alive and reads commands from stdin,
//! one per line (split on whitespace). Cached profiles and weather readings
//! live as long as the shell, and only there does `clear-cache` have anything
//! to clear.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use smartdine_backend::{
    JsonCatalog, JsonFeedbackStore, OpenMeteoConfig, OpenMeteoWeather, OpenRouterConfig,
    OpenRouterOracle, OsrmConfig, OsrmRouter, SupabaseActivityStore, SupabaseConfig,
};
use smartdine_engine::{EngineConfig, QueryRequest, Recommender};
use smartdine_model::{Coordinates, FeedbackEntry, RouteSummary, ScoredResult};
use smartdine_rerank::discover::DiscoverEntry;
use smartdine_rerank::DiscoverRequest;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartdine")]
#[command(about = "Personalized restaurant recommendations")]
struct Cli {
    #[command(subcommand)]
    command: TopCommand,

    /// Restaurant catalog (JSON array)
    #[arg(long, env = "SMARTDINE_CATALOG", default_value = "data/restaurants.json")]
    catalog: PathBuf,

    /// OpenRouter API key; without it every query uses the keyword fallback
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: Option<String>,

    /// OpenRouter model
    #[arg(long, env = "OPENROUTER_MODEL", default_value = "google/gemini-2.0-flash-exp:free")]
    openrouter_model: String,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_anon_key: Option<String>,

    /// Feedback log (JSON array, created on first write)
    #[arg(long, env = "SMARTDINE_FEEDBACK", default_value = "data/feedback.json")]
    feedback_file: PathBuf,

    /// Profile cache lifetime in seconds (0 disables caching)
    #[arg(long, env = "PROFILE_CACHE_TTL_SECS", default_value = "3600")]
    profile_ttl_secs: u64,

    /// Local clock offset in minutes east of UTC
    #[arg(long, env = "SMARTDINE_UTC_OFFSET_MINUTES", default_value = "330", allow_hyphen_values = true)]
    utc_offset_minutes: i32,

    /// Skip weather lookups
    #[arg(long)]
    no_weather: bool,

    /// Skip route lookups
    #[arg(long)]
    no_routing: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Args)]
struct Location {
    /// User latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// User longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl Location {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

#[derive(Subcommand)]
enum TopCommand {
    #[command(flatten)]
    Run(Command),

    /// Read commands from stdin against one long-lived engine
    Shell,
}

/// One line typed into the shell.
#[derive(Parser)]
#[command(name = "smartdine", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Run(Command),

    /// Drop cached user profiles and weather readings
    ClearCache {
        /// User whose profile to drop
        #[arg(required_unless_present = "all")]
        user_id: Option<String>,

        /// Drop every cached profile and weather reading
        #[arg(long)]
        all: bool,
    },

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend restaurants for a free-text query
    Query {
        /// What the user is in the mood for
        #[arg(required = true)]
        text: Vec<String>,

        /// Personalize for this user
        #[arg(short, long)]
        user: Option<String>,

        #[command(flatten)]
        location: Location,
    },

    /// Find restaurants similar to one restaurant
    Similar {
        restaurant_id: String,

        #[command(flatten)]
        location: Location,
    },

    /// Show a user's taste profile
    Profile { user_id: String },

    /// Browse or search the catalog
    Discover {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "12")]
        per_page: usize,

        /// Tag restaurants with this user's interactions
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Driving route between two points
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,
    },

    /// Record a like or dislike; lists recorded feedback when no restaurant is given
    Feedback {
        #[arg(requires = "liked")]
        restaurant_id: Option<String>,

        /// true to like, false to dislike
        liked: Option<bool>,
    },

    /// Check the catalog and list configured collaborators
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartdine=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    match cli.command {
        TopCommand::Run(command) => {
            if !run(&engine, command, cli.format).await? {
                std::process::exit(1);
            }
        }
        TopCommand::Shell => run_shell(&engine, cli.format).await?,
    }

    Ok(())
}

/// Run one command. Returns false when the command reports an unhealthy state.
async fn run(engine: &Recommender, command: Command, format: Format) -> Result<bool> {
    match command {
        Command::Query { text, user, location } => {
            let mut request = QueryRequest::new(text.join(" "));
            request.user_id = user;
            request.location = location.coordinates();
            run_query(engine, &request, format).await?;
        }
        Command::Similar {
            restaurant_id,
            location,
        } => {
            run_similar(engine, &restaurant_id, location.coordinates(), format).await?;
        }
        Command::Profile { user_id } => {
            let profile = engine.user_profile(&user_id).await?;
            print_json(&profile)?;
        }
        Command::Discover {
            search,
            page,
            per_page,
            user,
        } => {
            let request = DiscoverRequest {
                search,
                page,
                per_page,
            };
            run_discover(engine, &request, user.as_deref(), format).await?;
        }
        Command::Route {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
        } => {
            let from = Coordinates::new(from_lat, from_lon);
            let to = Coordinates::new(to_lat, to_lon);
            let details = engine.route(from, to).await?;
            if format == Format::Json {
                print_json(&details)?;
            } else {
                println!("{}", details.summary);
            }
        }
        Command::Feedback {
            restaurant_id,
            liked,
        } => match (restaurant_id, liked) {
            (Some(restaurant_id), Some(liked)) => {
                let entry = engine.record_feedback(&restaurant_id, liked).await?;
                if format == Format::Json {
                    print_json(&entry)?;
                } else {
                    print_feedback(&entry);
                }
            }
            _ => {
                let entries = engine.feedback().await?;
                if format == Format::Json {
                    print_json(&entries)?;
                } else {
                    entries.iter().for_each(print_feedback);
                    println!("---");
                    println!("Total: {} entries", entries.len());
                }
            }
        },
        Command::Health => return run_health(engine, format).await,
    }
    Ok(true)
}

async fn run_shell(engine: &Recommender, format: Format) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().map(|w| w.trim_matches('"')).collect();
        if words.is_empty() {
            prompt()?;
            continue;
        }

        match ShellLine::try_parse_from(words) {
            Ok(ShellLine {
                command: ShellCommand::Exit,
            }) => break,
            Ok(ShellLine {
                command: ShellCommand::ClearCache { user_id, all },
            }) => clear_cache(engine, user_id.as_deref(), all)?,
            Ok(ShellLine {
                command: ShellCommand::Run(command),
            }) => {
                if let Err(e) = run(engine, command, format).await {
                    eprintln!("error: {:#}", e);
                }
            }
            Err(e) => e.print()?,
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("smartdine> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn clear_cache(engine: &Recommender, user_id: Option<&str>, all: bool) -> Result<()> {
    if all {
        engine.clear_all_cache();
        println!("All user caches cleared");
    } else if let Some(user_id) = user_id {
        let removed = engine.clear_user_cache(user_id)?;
        if removed {
            println!("Cache cleared for user {}", user_id);
        } else {
            println!("No cached profile for user {}", user_id);
        }
    }
    Ok(())
}

fn build_engine(cli: &Cli) -> Result<Recommender> {
    let config = EngineConfig {
        profile_ttl_secs: cli.profile_ttl_secs,
        utc_offset_minutes: cli.utc_offset_minutes,
        ..Default::default()
    };

    let catalog = Arc::new(JsonCatalog::new(cli.catalog.clone()));
    let oracle = Arc::new(OpenRouterOracle::new(OpenRouterConfig {
        api_key: cli.openrouter_api_key.clone(),
        model: cli.openrouter_model.clone(),
        ..Default::default()
    })?);
    if cli.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY not set, queries will use keyword matching");
    }

    let mut engine = Recommender::new(config, catalog, oracle)
        .with_feedback_store(Arc::new(JsonFeedbackStore::new(cli.feedback_file.clone())));

    if !cli.no_weather {
        engine = engine.with_weather(Arc::new(OpenMeteoWeather::new(OpenMeteoConfig::default())?));
    }
    if !cli.no_routing {
        engine = engine.with_router(Arc::new(OsrmRouter::new(OsrmConfig::default())?));
    }
    match (&cli.supabase_url, &cli.supabase_anon_key) {
        (Some(url), Some(key)) => {
            let store = SupabaseActivityStore::new(SupabaseConfig::new(url.as_str(), key.as_str()))?;
            engine = engine.with_activity_store(Arc::new(store));
        }
        _ => tracing::warn!("Supabase credentials not set, user profiles will be empty"),
    }

    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_feedback(entry: &FeedbackEntry) {
    println!(
        "{} {} {} ({})",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        if entry.liked { "liked" } else { "disliked" },
        entry.restaurant_id,
        entry.id
    );
}

fn route_text(route: Option<&RouteSummary>) -> String {
    route
        .map(|r| format!(" | {} away, {}", r.distance, r.trip_duration))
        .unwrap_or_default()
}

fn print_result(rank: usize, result: &ScoredResult) {
    println!("\n{}. {} ({})", rank, result.restaurant.name, result.id());
    println!("   {}", result.short_reason);
    if let Some(item) = &result.suggested_item {
        println!("   Try: {}", item);
    }
    println!(
        "   Score: {} (ai {:.0}, user {:.0}, time {}, weather {}){}",
        result.final_score,
        result.ai_score,
        result.user_score,
        result.time_score,
        result.weather_score,
        route_text(result.route.as_ref())
    );
}

async fn run_query(engine: &Recommender, request: &QueryRequest, format: Format) -> Result<()> {
    let response = engine.recommend(request).await?;
    if format == Format::Json {
        return print_json(&response);
    }

    println!("Query: {}", response.query);
    println!("Analysis: {}", response.analysis);
    let time = &response.context.time;
    print!("Context: {} {}", time.day_of_week, time.time_of_day);
    if let Some(weather) = &response.context.weather {
        print!(", {} {}", weather.description, weather.temperature);
    }
    println!();
    println!("---");

    for (i, result) in response.results.iter().enumerate() {
        print_result(i + 1, result);
    }

    if let Some(similar) = response.similar_results.as_ref().filter(|s| !s.is_empty()) {
        println!("\nYou might also like:");
        for (i, result) in similar.iter().enumerate() {
            print_result(i + 1, result);
        }
    }

    println!("\n---");
    println!("Total: {} results", response.results.len());
    Ok(())
}

async fn run_similar(
    engine: &Recommender,
    restaurant_id: &str,
    location: Option<Coordinates>,
    format: Format,
) -> Result<()> {
    let response = engine.similar(restaurant_id, location).await?;
    if format == Format::Json {
        return print_json(&response);
    }

    println!("Similar to: {}", response.source);
    println!("---");
    for (i, similar) in response.similar_restaurants.iter().enumerate() {
        println!(
            "{}. {} (score {:.1}) - {}{}",
            i + 1,
            similar.restaurant.name,
            similar.score,
            similar.short_reason,
            route_text(similar.route.as_ref())
        );
    }
    Ok(())
}

async fn run_discover(
    engine: &Recommender,
    request: &DiscoverRequest,
    user_id: Option<&str>,
    format: Format,
) -> Result<()> {
    let page = engine.discover(request, user_id).await?;
    if format == Format::Json {
        return print_json(&page);
    }

    for entry in &page.results {
        match entry {
            DiscoverEntry::Restaurant(r) => println!(
                "[restaurant] {} ({}) rating {:.1} | {:?}",
                r.restaurant.name, r.restaurant.id, r.restaurant.rating, r.user_interaction
            ),
            DiscoverEntry::Dish(d) => println!(
                "[dish] {} at {} | {:.0}",
                d.dish_name, d.restaurant_name, d.dish_price
            ),
        }
    }

    let p = &page.pagination;
    println!("---");
    println!(
        "Page {}/{} | {} restaurants, {} dishes",
        p.current_page, p.total_pages, page.counts.restaurants, page.counts.dishes
    );
    Ok(())
}

async fn run_health(engine: &Recommender, format: Format) -> Result<bool> {
    let report = engine.health().await;
    if format == Format::Json {
        print_json(&report)?;
    } else {
        match (&report.restaurants, &report.catalog_error) {
            (Some(count), _) => println!("Catalog ({}): OK, {} restaurants", report.catalog, count),
            (None, Some(e)) => println!("Catalog ({}): FAILED: {}", report.catalog, e),
            (None, None) => println!("Catalog ({}): unknown", report.catalog),
        }
        println!("Oracle: {}", report.oracle);
        println!("Weather: {}", report.weather.unwrap_or("disabled"));
        println!("Routing: {}", report.routing.unwrap_or("disabled"));
        println!("Activity store: {}", report.activity_store.unwrap_or("disabled"));
        println!("Feedback store: {}", report.feedback_store.unwrap_or("disabled"));
        println!("Cached profiles: {}", report.cached_profiles);
    }
    Ok(report.is_healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_cache_only_in_shell() {
        assert!(Cli::try_parse_from(["smartdine", "clear-cache", "u1"]).is_err());

        let line = ShellLine::try_parse_from(["clear-cache", "--all"]).unwrap();
        assert!(matches!(
            line.command,
            ShellCommand::ClearCache { user_id: None, all: true }
        ));
        assert!(ShellLine::try_parse_from(["clear-cache"]).is_err());
    }

    #[test]
    fn test_shell_query_words_join() {
        let line = ShellLine::try_parse_from(["query", "spicy", "biryani", "-u", "u1"]).unwrap();
        match line.command {
            ShellCommand::Run(Command::Query { text, user, .. }) => {
                assert_eq!(text.join(" "), "spicy biryani");
                assert_eq!(user.as_deref(), Some("u1"));
            }
            _ => panic!("expected a query"),
        }
        assert!(matches!(
            ShellLine::try_parse_from(["quit"]).unwrap().command,
            ShellCommand::Exit
        ));
    }

    #[test]
    fn test_feedback_arguments() {
        let cli = Cli::try_parse_from(["smartdine", "feedback", "r001", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            TopCommand::Run(Command::Feedback { restaurant_id: Some(_), liked: Some(false) })
        ));

        let cli = Cli::try_parse_from(["smartdine", "feedback"]).unwrap();
        assert!(matches!(
            cli.command,
            TopCommand::Run(Command::Feedback { restaurant_id: None, liked: None })
        ));

        assert!(Cli::try_parse_from(["smartdine", "feedback", "r001"]).is_err());
    }

    #[test]
    fn test_route_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "smartdine", "route", "--from-lat", "-33.86", "--from-lon", "151.2", "--to-lat", "-33.87",
            "--to-lon", "151.21",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            TopCommand::Run(Command::Route { from_lat, .. }) if from_lat == -33.86
        ));
    }
}
