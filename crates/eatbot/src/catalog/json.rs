//! JSON file backed catalogs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chat_state::{NewProduct, NewRecipe};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;

use super::{Product, ProductCatalog, Recipe, RecipeCatalog, Result};

pub const RECIPES_FILE: &str = "recipes.json";
pub const PRODUCTS_FILE: &str = "products.json";

/// A stored record with a numeric id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> u64;
}

impl Record for Recipe {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Product {
    fn id(&self) -> u64 {
        self.id
    }
}

/// All records of one kind, kept in memory and written back to a single
/// JSON array on every change.
#[derive(Debug)]
pub struct JsonCatalog<T> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

pub type JsonRecipeCatalog = JsonCatalog<Recipe>;
pub type JsonProductCatalog = JsonCatalog<Product>;

impl<T: Record> JsonCatalog<T> {
    /// Load `path`, starting empty if the file does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<T> = if path.exists() {
            let contents = fs::read_to_string(&path).await?;
            if contents.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            Vec::new()
        };
        tracing::debug!(path = %path.display(), count = records.len(), "catalog loaded");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn all(&self) -> Vec<T> {
        self.records.lock().await.clone()
    }

    async fn find(&self, id: u64) -> Option<T> {
        self.records
            .lock()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    /// Build a record with the next free id, save the file, then keep it.
    async fn insert_with<F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(u64) -> T + Send,
    {
        let mut records = self.records.lock().await;
        let id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
        let record = build(id);

        let mut updated = records.clone();
        updated.push(record.clone());
        self.save(&updated).await?;
        *records = updated;
        Ok(record)
    }

    /// Memory only changes once the file has been written.
    async fn remove(&self, id: u64) -> Result<Option<T>> {
        let mut records = self.records.lock().await;
        let Some(index) = records.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };

        let mut updated = records.clone();
        let removed = updated.remove(index);
        self.save(&updated).await?;
        *records = updated;
        Ok(Some(removed))
    }

    async fn save(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, contents).await?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "catalog saved");
        Ok(())
    }
}

#[async_trait]
impl RecipeCatalog for JsonCatalog<Recipe> {
    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.all().await)
    }

    async fn get_recipe(&self, id: u64) -> Result<Option<Recipe>> {
        Ok(self.find(id).await)
    }

    async fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe> {
        self.insert_with(|id| Recipe {
            id,
            name: recipe.name,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            created_at: Utc::now(),
        })
        .await
    }

    async fn delete_recipe(&self, id: u64) -> Result<Option<Recipe>> {
        self.remove(id).await
    }
}

#[async_trait]
impl ProductCatalog for JsonCatalog<Product> {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.all().await)
    }

    async fn get_product(&self, id: u64) -> Result<Option<Product>> {
        Ok(self.find(id).await)
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product> {
        self.insert_with(|id| Product {
            id,
            name: product.name,
            calories: product.calories,
            protein: product.protein,
            fat: product.fat,
            carbs: product.carbs,
            created_at: Utc::now(),
        })
        .await
    }

    async fn delete_product(&self, id: u64) -> Result<Option<Product>> {
        self.remove(id).await
    }
}
