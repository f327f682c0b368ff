//! Shared screen pieces

use std::collections::VecDeque;

use chat_core::{Button, CallbackCodec, CallbackToken, CodecError, Keyboard, RenderSpec};
use chat_router::{HandlerError, HandlerOutcome};
use tokio::sync::Mutex;

pub const SECTION_RECIPES: &str = "recipes";
pub const SECTION_PRODUCTS: &str = "products";

pub const ACTION_MENU: &str = "menu";
pub const ACTION_LIST: &str = "list";
pub const ACTION_VIEW: &str = "view";
pub const ACTION_ADD: &str = "add";
pub const ACTION_DELETE_CONFIRM: &str = "delete_confirm";
pub const ACTION_DELETE: &str = "delete";
pub const ACTION_SEARCH: &str = "search";
pub const ACTION_SEARCH_QUERY: &str = "search_query";
pub const ACTION_RESULTS: &str = "results";

pub const PARAM_ID: &str = "id";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_QUERY: &str = "q";

/// Search queries remembered for result pagination.
const QUERY_HISTORY: usize = 256;

/// The main menu: one button per section.
pub fn home(text: &str, codec: &CallbackCodec) -> Result<RenderSpec, CodecError> {
    let recipes = CallbackToken::new(SECTION_RECIPES, ACTION_MENU);
    let products = CallbackToken::new(SECTION_PRODUCTS, ACTION_MENU);
    let keyboard = Keyboard::empty().row(vec![
        Button::with_codec("🍳 Recipes", &recipes, codec)?,
        Button::with_codec("🥗 Products", &products, codec)?,
    ]);
    Ok(RenderSpec::new(text, keyboard))
}

/// Encodes buttons with the configured budget.
#[derive(Debug, Clone, Copy)]
pub struct ButtonFactory {
    codec: CallbackCodec,
}

impl ButtonFactory {
    pub fn new(codec: CallbackCodec) -> Self {
        Self { codec }
    }

    pub fn button(
        &self,
        label: impl Into<String>,
        token: &CallbackToken,
    ) -> Result<Button, HandlerError> {
        Ok(Button::with_codec(label, token, &self.codec)?)
    }

    /// Item rows, page arrows and a back row, all within the budget.
    pub fn paginated<F>(
        &self,
        items: Vec<Button>,
        page: usize,
        total_pages: usize,
        page_token: F,
    ) -> Result<Keyboard, HandlerError>
    where
        F: Fn(usize) -> CallbackToken,
    {
        Ok(Keyboard::paginated(items, page, total_pages, page_token, &self.codec)?)
    }
}

impl Default for ButtonFactory {
    fn default() -> Self {
        Self::new(CallbackCodec::default())
    }
}

/// 1-based page from the `page` parameter; absent means the first page.
pub fn page_param(token_page: Option<&String>) -> Result<usize, HandlerError> {
    match token_page {
        None => Ok(1),
        Some(raw) => match raw.parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(HandlerError::Invalid(format!("bad page number {raw:?}"))),
        },
    }
}

/// Numeric record id from the `id` parameter.
pub fn id_param(token_id: Option<&String>, what: &str) -> Result<u64, HandlerError> {
    token_id
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| HandlerError::NotFound(format!("{what} (no such id)")))
}

/// Ask for a search query, with an optional note above the prompt.
/// The reply comes back as `search_query` in the asking section.
pub fn search_prompt(prompt: &str, note: Option<&str>) -> HandlerOutcome {
    let text = match note {
        Some(note) => format!("{note}\n\n{prompt}"),
        None => prompt.to_string(),
    };
    HandlerOutcome::AwaitText {
        screen: RenderSpec::new(text, Keyboard::back_only()),
        reply_to: ACTION_SEARCH_QUERY.to_string(),
    }
}

/// Numeric query id from the `q` parameter.
pub fn query_param(token_query: Option<&String>) -> Option<u64> {
    token_query.and_then(|raw| raw.parse().ok())
}

/// Recent search queries under short ids, so result pages can be linked
/// from buttons whatever the query text is. The oldest entries are dropped.
#[derive(Debug, Default)]
pub struct SearchQueries {
    log: Mutex<QueryLog>,
}

#[derive(Debug, Default)]
struct QueryLog {
    next_id: u64,
    entries: VecDeque<(u64, String)>,
}

impl SearchQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `query`, reusing the id of an identical remembered query.
    pub async fn remember(&self, query: &str) -> u64 {
        let mut log = self.log.lock().await;
        if let Some((id, _)) = log.entries.iter().find(|(_, known)| known == query) {
            return *id;
        }
        log.next_id += 1;
        let id = log.next_id;
        log.entries.push_back((id, query.to_string()));
        if log.entries.len() > QUERY_HISTORY {
            log.entries.pop_front();
        }
        id
    }

    pub async fn recall(&self, id: u64) -> Option<String> {
        let log = self.log.lock().await;
        log.entries
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, query)| query.clone())
    }
}

/// Slice `items` into the given page. Returns the page items, the page
/// actually shown (clamped to the last page) and the total page count.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], usize, usize) {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    (&items[start..end], page, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_has_both_sections() {
        let screen = home("hi", &CallbackCodec::default()).unwrap();
        let tokens: Vec<&str> = screen.keyboard.buttons().map(|b| b.token.as_str()).collect();
        assert_eq!(tokens, vec!["recipes:menu", "products:menu"]);
    }

    #[test]
    fn test_home_uses_the_configured_budget() {
        // "products:menu" is 13 bytes.
        assert!(matches!(
            home("hi", &CallbackCodec::new(12)),
            Err(CodecError::EncodingTooLarge { len: 13, budget: 12 })
        ));
    }

    #[test]
    fn test_factory_paginates_within_budget() {
        let factory = ButtonFactory::new(CallbackCodec::new(16));
        let page = |page| CallbackToken::new("recipes", "list").with_param("page", page);
        let err = factory.paginated(Vec::new(), 1, 3, page).unwrap_err();
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_search_queries() {
        let queries = SearchQueries::new();
        let eggs = queries.remember("eggs").await;
        assert_eq!(queries.remember("eggs").await, eggs);
        let milk = queries.remember("молоко").await;
        assert_ne!(milk, eggs);
        assert_eq!(queries.recall(milk).await.as_deref(), Some("молоко"));
        assert_eq!(queries.recall(999).await, None);

        for n in 0..QUERY_HISTORY {
            queries.remember(&format!("query {n}")).await;
        }
        assert_eq!(queries.recall(eggs).await, None);
        assert!(queries.recall(milk).await.is_some());
    }

    #[test]
    fn test_page_param() {
        assert_eq!(page_param(None).unwrap(), 1);
        assert_eq!(page_param(Some(&"3".to_string())).unwrap(), 3);
        assert!(matches!(
            page_param(Some(&"abc".to_string())),
            Err(HandlerError::Invalid(_))
        ));
        assert!(page_param(Some(&"0".to_string())).is_err());
    }

    #[test]
    fn test_id_param() {
        assert_eq!(id_param(Some(&"7".to_string()), "recipe").unwrap(), 7);
        assert!(matches!(id_param(None, "recipe"), Err(HandlerError::NotFound(_))));
        assert!(matches!(
            id_param(Some(&"x".to_string()), "recipe"),
            Err(HandlerError::NotFound(_))
        ));
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=12).collect();
        let (page, shown, total) = paginate(&items, 3, 5);
        assert_eq!(page, &[11, 12]);
        assert_eq!((shown, total), (3, 3));

        let (page, shown, _) = paginate(&items, 9, 5);
        assert_eq!(page, &[11, 12]);
        assert_eq!(shown, 3);

        let empty: Vec<u32> = Vec::new();
        let (page, shown, total) = paginate(&empty, 1, 5);
        assert!(page.is_empty());
        assert_eq!((shown, total), (1, 1));
    }

    #[test]
    fn test_oversized_button_is_internal_error() {
        let factory = ButtonFactory::new(CallbackCodec::new(8));
        let err = factory
            .button("x", &CallbackToken::new("recipes", "view").with_param("id", 1))
            .unwrap_err();
        assert!(err.is_internal());
    }
}
