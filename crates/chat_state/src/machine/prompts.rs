//! Prompts shown at each dialog step

use chat_core::{Keyboard, RenderSpec};

use super::states::{DialogState, ProductDraft, ProductStep, RecipeDraft, RecipeStep};
use super::transitions::{DialogMachine, Rejection};

const CANCEL_HINT: &str = "🔙 Press «Cancel» to stop.";

impl DialogMachine {
    /// The screen for the current step, prefixed with the rejection if any.
    pub fn prompt(&self, rejection: Option<&Rejection>) -> RenderSpec {
        let body = match self.state() {
            DialogState::Recipe { step, draft } => recipe_prompt(*step, draft),
            DialogState::Product { step, draft } => product_prompt(*step, draft),
        };

        let keyboard = if self.step().is_confirm() {
            Keyboard::confirm()
        } else {
            Keyboard::dialog_input()
        };

        let text = match rejection {
            Some(reason) => format!("❌ {reason}\n\n{body}"),
            None => body,
        };
        RenderSpec::new(text, keyboard)
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn recipe_prompt(step: RecipeStep, draft: &RecipeDraft) -> String {
    let name = draft.name.as_deref().unwrap_or("Untitled");
    match step {
        RecipeStep::Name => format!(
            "➕ New recipe\n\nEnter the recipe name (at least 3 characters).\n\n{CANCEL_HINT}"
        ),
        RecipeStep::Ingredients => format!(
            "✅ Name: {name}\n\nNow list the ingredients, one per line.\n\nExample:\n• 2 eggs\n• 100 g flour\n\n{CANCEL_HINT}"
        ),
        RecipeStep::Instructions => format!(
            "✅ Ingredients saved:\n\n{}\n\nNow enter the cooking instructions.\n\n{CANCEL_HINT}",
            bullet_list(&draft.ingredients)
        ),
        RecipeStep::Confirm => format!(
            "📖 Preview\n\nName: {name}\n\nIngredients:\n{}\n\nInstructions:\n{}\n\nConfirm or cancel:",
            bullet_list(&draft.ingredients),
            draft.instructions.as_deref().unwrap_or("")
        ),
    }
}

fn amount(value: Option<f64>) -> String {
    value.map(|v| format!("{v}")).unwrap_or_else(|| "-".to_string())
}

fn product_prompt(step: ProductStep, draft: &ProductDraft) -> String {
    let name = draft.name.as_deref().unwrap_or("Untitled");
    match step {
        ProductStep::Name => format!(
            "➕ New product\n\nEnter the product name (at least 2 characters).\n\n{CANCEL_HINT}"
        ),
        ProductStep::Calories => {
            format!("✅ Name: {name}\n\nCalories per 100 g (kcal):\n\n{CANCEL_HINT}")
        }
        ProductStep::Protein => format!("Protein per 100 g (g):\n\n{CANCEL_HINT}"),
        ProductStep::Fat => format!("Fat per 100 g (g):\n\n{CANCEL_HINT}"),
        ProductStep::Carbs => format!("Carbohydrates per 100 g (g):\n\n{CANCEL_HINT}"),
        ProductStep::Confirm => format!(
            "📖 Preview\n\nName: {name}\nCalories: {} kcal\nProtein: {} g\nFat: {} g\nCarbs: {} g\n\nConfirm or cancel:",
            amount(draft.calories),
            amount(draft.protein),
            amount(draft.fat),
            amount(draft.carbs)
        ),
    }
}
