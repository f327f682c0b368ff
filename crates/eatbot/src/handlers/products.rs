//! `products` section

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{Button, CallbackToken, Keyboard, Params, RenderSpec, UserId};
use chat_router::{Handler, HandlerError, HandlerOutcome, TEXT_PARAM};

use crate::catalog::{search_terms, Product, ProductCatalog};
use crate::screens::{
    id_param, page_param, paginate, query_param, search_prompt, ButtonFactory, SearchQueries,
    ACTION_ADD, ACTION_DELETE, ACTION_DELETE_CONFIRM, ACTION_LIST, ACTION_MENU, ACTION_RESULTS,
    ACTION_SEARCH, ACTION_SEARCH_QUERY, ACTION_VIEW, PARAM_ID, PARAM_PAGE, PARAM_QUERY,
    SECTION_PRODUCTS,
};

const SEARCH_PROMPT: &str = "🔍 Search products\n\nSend part of a product name:";

#[derive(Debug)]
pub struct ProductsHandler {
    catalog: Arc<dyn ProductCatalog>,
    buttons: ButtonFactory,
    page_size: usize,
    queries: SearchQueries,
}

fn token(action: &str) -> CallbackToken {
    CallbackToken::new(SECTION_PRODUCTS, action)
}

fn list_token(page: usize) -> CallbackToken {
    token(ACTION_LIST).with_param(PARAM_PAGE, page)
}

fn results_token(query_id: u64, page: usize) -> CallbackToken {
    token(ACTION_RESULTS)
        .with_param(PARAM_QUERY, query_id)
        .with_param(PARAM_PAGE, page)
}

impl ProductsHandler {
    pub fn new(catalog: Arc<dyn ProductCatalog>, buttons: ButtonFactory, page_size: usize) -> Self {
        Self {
            catalog,
            buttons,
            page_size: page_size.max(1),
            queries: SearchQueries::new(),
        }
    }

    fn menu(&self) -> Result<RenderSpec, HandlerError> {
        let keyboard = Keyboard::menu(
            vec![
                self.buttons.button("➕ Add product", &token(ACTION_ADD))?,
                self.buttons.button("📋 Products", &list_token(1))?,
                self.buttons.button("🔍 Search", &token(ACTION_SEARCH))?,
            ],
            1,
        );
        Ok(RenderSpec::new("🥗 Products\n\nChoose an action:", keyboard))
    }

    fn view_button(&self, product: &Product) -> Result<Button, HandlerError> {
        let view = token(ACTION_VIEW).with_param(PARAM_ID, product.id);
        let label = format!("{} ({} kcal)", product.name, product.calories);
        self.buttons.button(label, &view)
    }

    async fn list(&self, page: usize) -> Result<RenderSpec, HandlerError> {
        let products = self.catalog.list_products().await.map_err(anyhow::Error::from)?;
        if products.is_empty() {
            let add = self.buttons.button("➕ Add product", &token(ACTION_ADD))?;
            return Ok(RenderSpec::new(
                "📋 No products yet.",
                Keyboard::detail(vec![add]),
            ));
        }

        let (items, page, total_pages) = paginate(&products, page, self.page_size);
        let buttons = items
            .iter()
            .map(|product| self.view_button(product))
            .collect::<Result<Vec<_>, _>>()?;
        let keyboard = self.buttons.paginated(buttons, page, total_pages, list_token)?;

        Ok(RenderSpec::new(
            format!("📋 Products ({})\n\nPage {page} of {total_pages}:", products.len()),
            keyboard,
        ))
    }

    async fn find(&self, params: &Params) -> Result<Product, HandlerError> {
        let id = id_param(params.get(PARAM_ID), "product")?;
        self.catalog
            .get_product(id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| HandlerError::NotFound(format!("product {id}")))
    }

    async fn view(&self, params: &Params) -> Result<RenderSpec, HandlerError> {
        let product = self.find(params).await?;
        let delete = token(ACTION_DELETE_CONFIRM).with_param(PARAM_ID, product.id);
        let keyboard = Keyboard::detail(vec![self.buttons.button("🗑 Delete", &delete)?]);
        Ok(RenderSpec::new(describe(&product), keyboard))
    }

    async fn delete_confirm(&self, params: &Params) -> Result<RenderSpec, HandlerError> {
        let product = self.find(params).await?;
        let delete = token(ACTION_DELETE).with_param(PARAM_ID, product.id);
        let keyboard = Keyboard::detail(vec![self.buttons.button("✅ Yes, delete", &delete)?]);
        Ok(RenderSpec::new(
            format!("🗑 Delete the product «{}»?", product.name),
            keyboard,
        ))
    }

    async fn delete(&self, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let id = id_param(params.get(PARAM_ID), "product")?;
        let removed = self
            .catalog
            .delete_product(id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| HandlerError::NotFound(format!("product {id}")))?;
        tracing::info!(product_id = id, "product deleted");

        let mut screen = self.list(1).await?;
        screen.text = format!("✅ Product «{}» deleted.\n\n{}", removed.name, screen.text);
        Ok(HandlerOutcome::Redirect(list_token(1), screen))
    }

    async fn search_query(&self, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let query = params.get(TEXT_PARAM).map(|text| text.trim()).unwrap_or_default();
        if search_terms(query).is_empty() {
            return Ok(search_prompt(SEARCH_PROMPT, Some("❌ The query is empty.")));
        }
        let query_id = self.queries.remember(query).await;
        let screen = self.results(query, query_id, 1).await?;
        Ok(HandlerOutcome::Redirect(results_token(query_id, 1), screen))
    }

    async fn results_page(&self, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let page = page_param(params.get(PARAM_PAGE))?;
        let Some(query_id) = query_param(params.get(PARAM_QUERY)) else {
            return Ok(search_prompt(SEARCH_PROMPT, None));
        };
        match self.queries.recall(query_id).await {
            Some(query) => Ok(HandlerOutcome::Show(self.results(&query, query_id, page).await?)),
            None => Ok(search_prompt(SEARCH_PROMPT, Some("⌛ This search has expired."))),
        }
    }

    async fn results(
        &self,
        query: &str,
        query_id: u64,
        page: usize,
    ) -> Result<RenderSpec, HandlerError> {
        let found = self
            .catalog
            .search_products(query)
            .await
            .map_err(anyhow::Error::from)?;
        tracing::debug!(query_id, matches = found.len(), "product search");
        let again = self.buttons.button("🔎 New search", &token(ACTION_SEARCH))?;
        if found.is_empty() {
            return Ok(RenderSpec::new(
                format!("🔍 Nothing found for «{query}».\n\nCheck the spelling or add the product."),
                Keyboard::detail(vec![again]),
            ));
        }

        let (items, page, total_pages) = paginate(&found, page, self.page_size);
        let mut buttons = items
            .iter()
            .map(|product| self.view_button(product))
            .collect::<Result<Vec<_>, _>>()?;
        buttons.push(again);
        let keyboard = self
            .buttons
            .paginated(buttons, page, total_pages, |page| results_token(query_id, page))?;

        Ok(RenderSpec::new(
            format!(
                "🔍 Results for «{query}» ({})\n\nPage {page} of {total_pages}:",
                found.len()
            ),
            keyboard,
        ))
    }
}

fn describe(product: &Product) -> String {
    format!(
        "🥗 {}\n\nPer 100 g:\nCalories: {} kcal\nProtein: {} g\nFat: {} g\nCarbs: {} g",
        product.name, product.calories, product.protein, product.fat, product.carbs
    )
}

#[async_trait]
impl Handler for ProductsHandler {
    async fn handle_action(
        &self,
        user: UserId,
        action: &str,
        params: &Params,
    ) -> Result<HandlerOutcome, HandlerError> {
        tracing::debug!(user_id = %user, action, "products");
        let screen = match action {
            ACTION_MENU => self.menu()?,
            ACTION_LIST => self.list(page_param(params.get(PARAM_PAGE))?).await?,
            ACTION_VIEW => self.view(params).await?,
            ACTION_DELETE_CONFIRM => self.delete_confirm(params).await?,
            ACTION_DELETE => return self.delete(params).await,
            ACTION_SEARCH => return Ok(search_prompt(SEARCH_PROMPT, None)),
            ACTION_SEARCH_QUERY => return self.search_query(params).await,
            ACTION_RESULTS => return self.results_page(params).await,
            other => {
                tracing::debug!(action = other, "unknown products action, showing menu");
                return Ok(HandlerOutcome::Redirect(token(ACTION_MENU), self.menu()?));
            }
        };
        Ok(HandlerOutcome::Show(screen))
    }
}
