//! Restaurant catalog read from a JSON array file.

use async_trait::async_trait;
use smartdine_model::{Catalog, Restaurant};
use std::path::PathBuf;

use crate::{BackendError, CatalogProvider};

#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(json: &str) -> Result<Catalog, BackendError> {
        let restaurants: Vec<Restaurant> =
            serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Catalog::new(restaurants))
    }
}

#[async_trait]
impl CatalogProvider for JsonCatalog {
    async fn load(&self) -> Result<Catalog, BackendError> {
        tracing::debug!(path = %self.path.display(), "Loading restaurant catalog");
        let json = tokio::fs::read_to_string(&self.path).await?;
        Self::parse(&json)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartdine_model::PriceLevel;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "id": "r001",
            "name": "Shree Anandhaas",
            "cuisines": ["South Indian", "Vegetarian"],
            "tags": ["tiffin", "family"],
            "price_level": "budget",
            "rating": 4.3,
            "opening_hours": "06:30 - 22:30",
            "coordinates": { "lat": 11.0168, "lon": 76.9558 },
            "menu_highlights": [{ "name": "Ghee Roast", "price": 120 }],
            "description": "Classic tiffin spot"
        },
        { "id": "r002", "name": "Sparse Entry", "price_level": "mid-range" }
    ]"#;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = JsonCatalog::new(file.path()).load().await.unwrap();
        assert_eq!(catalog.len(), 2);

        let r001 = catalog.get("r001").unwrap();
        assert_eq!(r001.price_level, PriceLevel::Budget);
        assert_eq!(r001.menu_highlights[0].price, 120.0);
        assert!(r001.coordinates.is_some());

        let sparse = catalog.get("r002").unwrap();
        assert_eq!(sparse.price_level, PriceLevel::Moderate);
        assert!(sparse.cuisines.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = JsonCatalog::new(dir.path().join("missing.json")).load().await;
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(JsonCatalog::parse("{not json"), Err(BackendError::Parse(_))));
    }
}
