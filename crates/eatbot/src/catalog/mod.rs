//! Record catalogs - the storage collaborators behind the feature handlers

mod json;

use std::fmt::Debug;

use async_trait::async_trait;
use chat_state::{NewProduct, NewRecipe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::{
    JsonCatalog, JsonProductCatalog, JsonRecipeCatalog, Record, PRODUCTS_FILE, RECIPES_FILE,
};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

/// Nutrients are per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait RecipeCatalog: Debug + Send + Sync {
    async fn list_recipes(&self) -> Result<Vec<Recipe>>;

    async fn get_recipe(&self, id: u64) -> Result<Option<Recipe>>;

    async fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe>;

    /// Returns the removed recipe, or `None` if there was none with `id`.
    async fn delete_recipe(&self, id: u64) -> Result<Option<Recipe>>;

    /// Recipes whose name or ingredients contain every word of `query`.
    async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>> {
        let terms = search_terms(query);
        let recipes = self.list_recipes().await?;
        Ok(recipes
            .into_iter()
            .filter(|recipe| {
                let haystack = format!("{} {}", recipe.name, recipe.ingredients.join(" "));
                matches_all(&haystack, &terms)
            })
            .collect())
    }
}

#[async_trait]
pub trait ProductCatalog: Debug + Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: u64) -> Result<Option<Product>>;

    async fn add_product(&self, product: NewProduct) -> Result<Product>;

    async fn delete_product(&self, id: u64) -> Result<Option<Product>>;

    /// Products whose name contains every word of `query`.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let terms = search_terms(query);
        let products = self.list_products().await?;
        Ok(products
            .into_iter()
            .filter(|product| matches_all(&product.name, &terms))
            .collect())
    }
}

/// Lowercased words of a free-text query.
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_all(haystack: &str, terms: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    !terms.is_empty() && terms.iter().all(|term| haystack.contains(term.as_str()))
}
