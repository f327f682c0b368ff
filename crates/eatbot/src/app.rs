//! Wire catalogs, handlers and dialogs into a router

use std::sync::Arc;

use anyhow::Context;
use chat_core::{CallbackCodec, Config};
use chat_router::{DialogRunner, HandlerRegistry, NavigationManager, Renderer, Router};
use chat_state::DialogKind;
use session_manager::SessionStore;

use crate::catalog::{JsonProductCatalog, JsonRecipeCatalog, PRODUCTS_FILE, RECIPES_FILE};
use crate::handlers::{ProductCommitter, ProductsHandler, RecipeCommitter, RecipesHandler};
use crate::screens::{self, ButtonFactory, SECTION_PRODUCTS, SECTION_RECIPES};

pub async fn build_router(config: &Config, renderer: Arc<dyn Renderer>) -> anyhow::Result<Router> {
    let recipes_path = config.data_dir.join(RECIPES_FILE);
    let recipes = Arc::new(
        JsonRecipeCatalog::open(&recipes_path)
            .await
            .with_context(|| format!("failed to open {}", recipes_path.display()))?,
    );
    let products_path = config.data_dir.join(PRODUCTS_FILE);
    let products = Arc::new(
        JsonProductCatalog::open(&products_path)
            .await
            .with_context(|| format!("failed to open {}", products_path.display()))?,
    );
    tracing::info!(data_dir = %config.data_dir.display(), "catalogs loaded");

    let codec = CallbackCodec::new(config.callback_budget);
    let buttons = ButtonFactory::new(codec);
    let registry = HandlerRegistry::new()
        .with(
            SECTION_RECIPES,
            Arc::new(RecipesHandler::new(recipes.clone(), buttons, config.page_size)),
        )
        .with(
            SECTION_PRODUCTS,
            Arc::new(ProductsHandler::new(products.clone(), buttons, config.page_size)),
        );

    let dialogs = DialogRunner::new()
        .with(DialogKind::RecipeCreation, Arc::new(RecipeCommitter::new(recipes)))
        .with(DialogKind::ProductCreation, Arc::new(ProductCommitter::new(products)));

    let home = screens::home(&config.home_text, &codec)
        .context("home screen does not fit the callback budget")?;
    let navigation = NavigationManager::new(renderer, home);
    let sessions = Arc::new(SessionStore::new(config.stack_limit));

    Ok(Router::new(Arc::new(registry), navigation, dialogs, sessions))
}
