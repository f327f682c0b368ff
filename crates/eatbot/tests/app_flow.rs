//! Whole-application flows over a temporary data directory

use std::sync::Arc;

use chat_core::{Config, RenderSpec, UserId};
use chat_router::{InboundEvent, MemoryRenderer, Router};
use eatbot::{build_router, console};
use tempfile::TempDir;

const USER: UserId = UserId(7);

struct App {
    _dir: TempDir,
    config: Config,
    renderer: Arc<MemoryRenderer>,
    router: Router,
}

impl App {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let renderer = Arc::new(MemoryRenderer::new());
        let router = build_router(&config, renderer.clone()).await.unwrap();
        Self {
            _dir: dir,
            config,
            renderer,
            router,
        }
    }

    async fn tap(&self, token: &str) -> RenderSpec {
        self.router.handle(USER, InboundEvent::callback(token)).await;
        self.last().await
    }

    async fn say(&self, text: &str) -> RenderSpec {
        self.router.handle(USER, InboundEvent::text(text)).await;
        self.last().await
    }

    async fn last(&self) -> RenderSpec {
        self.renderer.last(USER).await.unwrap()
    }
}

fn labels(screen: &RenderSpec) -> Vec<&str> {
    screen.keyboard.buttons().map(|b| b.label.as_str()).collect()
}

#[tokio::test]
async fn test_add_recipe_then_browse_it() {
    let app = App::new().await;

    let menu = app.tap("recipes:menu").await;
    assert!(menu.text.starts_with("🍳 Recipes"));

    let prompt = app.tap("recipes:add").await;
    assert!(prompt.text.contains("Enter the recipe name"));

    app.say("Omelette").await;
    app.say("2 eggs\n- 50 ml milk").await;
    let confirm = app.say("Whisk and fry for 3 minutes.").await;
    assert!(confirm.text.contains("Omelette"));

    let back_at_menu = app.tap("dialog:commit").await;
    assert_eq!(back_at_menu, menu);
    let screens = app.renderer.screens_for(USER).await;
    assert_eq!(screens[screens.len() - 2].text, "✅ Recipe «Omelette» saved.");

    let list = app.tap("recipes:list:page=1").await;
    assert!(list.text.contains("My recipes (1)"));
    assert_eq!(labels(&list)[0], "📖 Omelette");

    let view = app.tap("recipes:view:id=1").await;
    assert!(view.text.contains("• 50 ml milk"));
    assert!(view.text.contains("Whisk and fry"));

    assert_eq!(app.tap("nav:back").await, list);
    assert_eq!(app.tap("nav:back").await, menu);
}

#[tokio::test]
async fn test_catalog_survives_restart() {
    let app = App::new().await;
    app.tap("products:menu").await;
    app.tap("products:add").await;
    for input in ["Oats", "389", "16,9", "6.9", "66.3"] {
        app.say(input).await;
    }
    app.tap("dialog:commit").await;

    let renderer = Arc::new(MemoryRenderer::new());
    let router = build_router(&app.config, renderer.clone()).await.unwrap();
    router
        .handle(USER, InboundEvent::callback("products:view:id=1"))
        .await;
    let view = renderer.last(USER).await.unwrap();
    assert!(view.text.contains("Oats"));
    assert!(view.text.contains("Protein: 16.9 g"));
}

#[tokio::test]
async fn test_delete_recipe_and_missing_view() {
    let app = App::new().await;
    app.tap("recipes:add").await;
    app.say("Pancakes").await;
    app.say("flour").await;
    app.say("Mix.").await;
    app.tap("dialog:commit").await;

    app.tap("recipes:view:id=1").await;
    app.tap("recipes:delete_confirm:id=1").await;
    let list = app.tap("recipes:delete:id=1").await;
    assert!(list.text.starts_with("✅ Recipe «Pancakes» deleted."));
    assert!(list.text.contains("no recipes yet"));

    let error = app.tap("recipes:view:id=1").await;
    assert!(error.text.contains("Not found"));
    assert_eq!(app.tap("nav:back").await, list);
}

#[tokio::test]
async fn test_cancelled_dialog_saves_nothing() {
    let app = App::new().await;
    let menu = app.tap("products:menu").await;
    app.tap("products:add").await;
    app.say("Rice").await;

    assert_eq!(app.tap("dialog:cancel").await, menu);
    let list = app.tap("products:list").await;
    assert!(list.text.contains("No products yet"));
}

#[tokio::test]
async fn test_search_recipes_by_ingredient() {
    let app = App::new().await;
    for (name, ingredients) in [("Omelette", "2 eggs\nmilk"), ("Salad", "tomato\ncucumber")] {
        app.tap("recipes:add").await;
        app.say(name).await;
        app.say(ingredients).await;
        app.say("Cook.").await;
        app.tap("dialog:commit").await;
    }

    let menu = app.tap("recipes:menu").await;
    assert!(labels(&menu).contains(&"🔍 Search"));
    let prompt = app.tap("recipes:search").await;
    assert!(prompt.text.contains("Send an ingredient"));

    let results = app.say("Milk").await;
    assert!(results.text.contains("Results for «Milk» (1)"));
    assert_eq!(labels(&results), vec!["📖 Omelette", "🔎 New search", "◀️ Back"]);

    let view = app.tap("recipes:view:id=1").await;
    assert!(view.text.contains("Omelette"));
    assert_eq!(app.tap("nav:back").await, results);

    // Back on the prompt, the next text is a new query.
    assert_eq!(app.tap("nav:back").await, prompt);
    let nothing = app.say("chocolate").await;
    assert!(nothing.text.contains("Nothing found for «chocolate»"));

    assert_eq!(app.tap("nav:back").await, prompt);
    assert_eq!(app.tap("nav:back").await, menu);
    let hint = app.say("milk").await;
    assert!(!hint.text.contains("Results"));
}

#[tokio::test]
async fn test_delete_product_after_search() {
    let app = App::new().await;
    app.tap("products:add").await;
    for input in ["Oats", "389", "16.9", "6.9", "66.3"] {
        app.say(input).await;
    }
    app.tap("dialog:commit").await;

    app.tap("products:search").await;
    let results = app.say("oat").await;
    assert_eq!(labels(&results)[0], "Oats (389 kcal)");

    app.tap("products:view:id=1").await;
    let confirm = app.tap("products:delete_confirm:id=1").await;
    assert_eq!(confirm.text, "🗑 Delete the product «Oats»?");
    let list = app.tap("products:delete:id=1").await;
    assert!(list.text.starts_with("✅ Product «Oats» deleted."));
    assert!(list.text.contains("No products yet"));

    let renderer = Arc::new(MemoryRenderer::new());
    let router = build_router(&app.config, renderer.clone()).await.unwrap();
    router
        .handle(USER, InboundEvent::callback("products:view:id=1"))
        .await;
    assert!(renderer.last(USER).await.unwrap().text.contains("Not found"));
}

#[tokio::test]
async fn test_callback_budget_applies_to_home() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        callback_budget: 12,
        ..Config::default()
    };
    let err = build_router(&config, Arc::new(MemoryRenderer::new()))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("callback budget"));
}

#[tokio::test]
async fn test_console_lines_drive_the_router() {
    let app = App::new().await;
    let input: &[u8] =
        b"cb:recipes:add\nSoup of the day\ncarrots\\nwater\nBoil.\ncb:dialog:commit\n9 /start\nquit\ncb:nav:back\n";

    let handled = console::run(&app.router, input, USER).await.unwrap();
    assert_eq!(handled, 6);

    let home = app.renderer.last(UserId(9)).await.unwrap();
    assert_eq!(home.text, app.config.home_text);

    let list = app.tap("recipes:list:page=1").await;
    assert_eq!(labels(&list)[0], "📖 Soup of the day");
    let view = app.tap("recipes:view:id=1").await;
    assert!(view.text.contains("• water"));
}
