//! Persist confirmed dialogs

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::UserId;
use chat_router::{DialogCommitter, HandlerError};
use chat_state::DialogSubmission;

use crate::catalog::{ProductCatalog, RecipeCatalog};

#[derive(Debug)]
pub struct RecipeCommitter {
    catalog: Arc<dyn RecipeCatalog>,
}

impl RecipeCommitter {
    pub fn new(catalog: Arc<dyn RecipeCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl DialogCommitter for RecipeCommitter {
    async fn commit(
        &self,
        user: UserId,
        submission: DialogSubmission,
    ) -> Result<String, HandlerError> {
        let DialogSubmission::Recipe(recipe) = submission else {
            return Err(HandlerError::Invalid("expected a recipe".to_string()));
        };
        let saved = self
            .catalog
            .add_recipe(recipe)
            .await
            .map_err(anyhow::Error::from)?;
        tracing::info!(user_id = %user, recipe_id = saved.id, "recipe created");
        Ok(format!("✅ Recipe «{}» saved.", saved.name))
    }
}

#[derive(Debug)]
pub struct ProductCommitter {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductCommitter {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl DialogCommitter for ProductCommitter {
    async fn commit(
        &self,
        user: UserId,
        submission: DialogSubmission,
    ) -> Result<String, HandlerError> {
        let DialogSubmission::Product(product) = submission else {
            return Err(HandlerError::Invalid("expected a product".to_string()));
        };
        let saved = self
            .catalog
            .add_product(product)
            .await
            .map_err(anyhow::Error::from)?;
        tracing::info!(user_id = %user, product_id = saved.id, "product created");
        Ok(format!("✅ Product «{}» saved.", saved.name))
    }
}
