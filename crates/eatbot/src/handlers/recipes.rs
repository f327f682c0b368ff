//! `recipes` section

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{Button, CallbackToken, Keyboard, Params, RenderSpec, UserId};
use chat_router::{Handler, HandlerError, HandlerOutcome, TEXT_PARAM};

use crate::catalog::{search_terms, Recipe, RecipeCatalog};
use crate::screens::{
    id_param, page_param, paginate, query_param, search_prompt, ButtonFactory, SearchQueries,
    ACTION_ADD, ACTION_DELETE, ACTION_DELETE_CONFIRM, ACTION_LIST, ACTION_MENU, ACTION_RESULTS,
    ACTION_SEARCH, ACTION_SEARCH_QUERY, ACTION_VIEW, PARAM_ID, PARAM_PAGE, PARAM_QUERY,
    SECTION_RECIPES,
};

const SEARCH_PROMPT: &str = "🔍 Search recipes\n\nSend an ingredient or part of a recipe name:";

#[derive(Debug)]
pub struct RecipesHandler {
    catalog: Arc<dyn RecipeCatalog>,
    buttons: ButtonFactory,
    page_size: usize,
    queries: SearchQueries,
}

fn token(action: &str) -> CallbackToken {
    CallbackToken::new(SECTION_RECIPES, action)
}

fn list_token(page: usize) -> CallbackToken {
    token(ACTION_LIST).with_param(PARAM_PAGE, page)
}

fn results_token(query_id: u64, page: usize) -> CallbackToken {
    token(ACTION_RESULTS)
        .with_param(PARAM_QUERY, query_id)
        .with_param(PARAM_PAGE, page)
}

impl RecipesHandler {
    pub fn new(catalog: Arc<dyn RecipeCatalog>, buttons: ButtonFactory, page_size: usize) -> Self {
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
                self.buttons.button("➕ Add recipe", &token(ACTION_ADD))?,
                self.buttons.button("📋 My recipes", &list_token(1))?,
                self.buttons.button("🔍 Search", &token(ACTION_SEARCH))?,
            ],
            1,
        );
        Ok(RenderSpec::new("🍳 Recipes\n\nChoose an action:", keyboard))
    }

    async fn list(&self, page: usize) -> Result<RenderSpec, HandlerError> {
        let recipes = self.catalog.list_recipes().await.map_err(anyhow::Error::from)?;
        if recipes.is_empty() {
            let add = self.buttons.button("➕ Add recipe", &token(ACTION_ADD))?;
            let keyboard = Keyboard::detail(vec![add]);
            return Ok(RenderSpec::new("📋 You have no recipes yet.", keyboard));
        }

        let (items, page, total_pages) = paginate(&recipes, page, self.page_size);
        let buttons = items
            .iter()
            .map(|recipe| self.view_button(recipe))
            .collect::<Result<Vec<_>, _>>()?;
        let keyboard = self.buttons.paginated(buttons, page, total_pages, list_token)?;

        Ok(RenderSpec::new(
            format!("📋 My recipes ({})\n\nPage {page} of {total_pages}:", recipes.len()),
            keyboard,
        ))
    }

    fn view_button(&self, recipe: &Recipe) -> Result<Button, HandlerError> {
        let view = token(ACTION_VIEW).with_param(PARAM_ID, recipe.id);
        self.buttons.button(format!("📖 {}", recipe.name), &view)
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
            .search_recipes(query)
            .await
            .map_err(anyhow::Error::from)?;
        tracing::debug!(query_id, matches = found.len(), "recipe search");
        let again = self.buttons.button("🔎 New search", &token(ACTION_SEARCH))?;
        if found.is_empty() {
            return Ok(RenderSpec::new(
                format!("🔍 Nothing found for «{query}».\n\nTry other ingredients or check the spelling."),
                Keyboard::detail(vec![again]),
            ));
        }

        let (items, page, total_pages) = paginate(&found, page, self.page_size);
        let mut buttons = items
            .iter()
            .map(|recipe| self.view_button(recipe))
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

    async fn find(&self, params: &Params) -> Result<Recipe, HandlerError> {
        let id = id_param(params.get(PARAM_ID), "recipe")?;
        self.catalog
            .get_recipe(id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| HandlerError::NotFound(format!("recipe {id}")))
    }

    async fn view(&self, params: &Params) -> Result<RenderSpec, HandlerError> {
        let recipe = self.find(params).await?;
        let delete = token(ACTION_DELETE_CONFIRM).with_param(PARAM_ID, recipe.id);
        let keyboard = Keyboard::detail(vec![self.buttons.button("🗑 Delete", &delete)?]);
        Ok(RenderSpec::new(describe(&recipe), keyboard))
    }

    async fn delete_confirm(&self, params: &Params) -> Result<RenderSpec, HandlerError> {
        let recipe = self.find(params).await?;
        let delete = token(ACTION_DELETE).with_param(PARAM_ID, recipe.id);
        let keyboard = Keyboard::detail(vec![self.buttons.button("✅ Yes, delete", &delete)?]);
        Ok(RenderSpec::new(
            format!("🗑 Delete the recipe «{}»?", recipe.name),
            keyboard,
        ))
    }

    async fn delete(&self, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let id = id_param(params.get(PARAM_ID), "recipe")?;
        let removed = self
            .catalog
            .delete_recipe(id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| HandlerError::NotFound(format!("recipe {id}")))?;
        tracing::info!(recipe_id = id, "recipe deleted");

        let mut screen = self.list(1).await?;
        screen.text = format!("✅ Recipe «{}» deleted.\n\n{}", removed.name, screen.text);
        Ok(HandlerOutcome::Redirect(list_token(1), screen))
    }
}

fn describe(recipe: &Recipe) -> String {
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "📖 {}\n\nIngredients:\n{}\n\nInstructions:\n{}",
        recipe.name, ingredients, recipe.instructions
    )
}

#[async_trait]
impl Handler for RecipesHandler {
    async fn handle_action(
        &self,
        user: UserId,
        action: &str,
        params: &Params,
    ) -> Result<HandlerOutcome, HandlerError> {
        tracing::debug!(user_id = %user, action, "recipes");
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
                tracing::debug!(action = other, "unknown recipes action, showing menu");
                return Ok(HandlerOutcome::Redirect(token(ACTION_MENU), self.menu()?));
            }
        };
        Ok(HandlerOutcome::Show(screen))
    }
}
