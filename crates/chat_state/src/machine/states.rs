//! Dialog states - the closed set of steps and typed collected fields
//!
//! Step and draft live in the same variant, so a recipe step can never be
//! paired with a product draft.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::events::InputCategory;

/// The dialogs this front-end knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    RecipeCreation,
    ProductCreation,
}

impl DialogKind {
    pub const ALL: [DialogKind; 2] = [DialogKind::RecipeCreation, DialogKind::ProductCreation];

    /// The `(section, action)` callback that starts this dialog.
    pub fn entry_trigger(&self) -> (&'static str, &'static str) {
        match self {
            Self::RecipeCreation => ("recipes", "add"),
            Self::ProductCreation => ("products", "add"),
        }
    }

    pub fn from_trigger(section: &str, action: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.entry_trigger() == (section, action))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RecipeCreation => "recipe creation",
            Self::ProductCreation => "product creation",
        }
    }

    /// Every declared step of this dialog, in order.
    pub fn steps(&self) -> Vec<DialogStep> {
        match self {
            Self::RecipeCreation => RecipeStep::ALL.into_iter().map(DialogStep::Recipe).collect(),
            Self::ProductCreation => ProductStep::ALL.into_iter().map(DialogStep::Product).collect(),
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStep {
    Name,
    Ingredients,
    Instructions,
    Confirm,
}

impl RecipeStep {
    pub const ALL: [RecipeStep; 4] = [Self::Name, Self::Ingredients, Self::Instructions, Self::Confirm];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStep {
    Name,
    Calories,
    Protein,
    Fat,
    Carbs,
    Confirm,
}

impl ProductStep {
    pub const ALL: [ProductStep; 6] = [
        Self::Name,
        Self::Calories,
        Self::Protein,
        Self::Fat,
        Self::Carbs,
        Self::Confirm,
    ];
}

/// A step of any dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStep {
    Recipe(RecipeStep),
    Product(ProductStep),
}

impl DialogStep {
    pub fn kind(&self) -> DialogKind {
        match self {
            Self::Recipe(_) => DialogKind::RecipeCreation,
            Self::Product(_) => DialogKind::ProductCreation,
        }
    }

    /// The single input category this step accepts.
    pub fn expects(&self) -> InputCategory {
        if self.is_confirm() {
            InputCategory::Choice
        } else {
            InputCategory::Text
        }
    }

    pub fn is_confirm(&self) -> bool {
        matches!(
            self,
            Self::Recipe(RecipeStep::Confirm) | Self::Product(ProductStep::Confirm)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Recipe(RecipeStep::Name) | Self::Product(ProductStep::Name) => "name",
            Self::Recipe(RecipeStep::Ingredients) => "ingredients",
            Self::Recipe(RecipeStep::Instructions) => "instructions",
            Self::Product(ProductStep::Calories) => "calories",
            Self::Product(ProductStep::Protein) => "protein",
            Self::Product(ProductStep::Fat) => "fat",
            Self::Product(ProductStep::Carbs) => "carbs",
            Self::Recipe(RecipeStep::Confirm) | Self::Product(ProductStep::Confirm) => "confirm",
        }
    }
}

impl fmt::Display for DialogStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind().label(), self.name())
    }
}

/// Fields collected so far by the recipe dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Option<String>,
}

/// Fields collected so far by the product dialog. Nutrients are per 100 g.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
}

/// Current step together with the collected fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialog", rename_all = "snake_case")]
pub enum DialogState {
    Recipe { step: RecipeStep, draft: RecipeDraft },
    Product { step: ProductStep, draft: ProductDraft },
}

impl DialogState {
    /// First step with nothing collected.
    pub fn initial(kind: DialogKind) -> Self {
        match kind {
            DialogKind::RecipeCreation => Self::Recipe {
                step: RecipeStep::Name,
                draft: RecipeDraft::default(),
            },
            DialogKind::ProductCreation => Self::Product {
                step: ProductStep::Name,
                draft: ProductDraft::default(),
            },
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.step().kind()
    }

    pub fn step(&self) -> DialogStep {
        match self {
            Self::Recipe { step, .. } => DialogStep::Recipe(*step),
            Self::Product { step, .. } => DialogStep::Product(*step),
        }
    }
}

/// A complete recipe ready to hand to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

/// A complete product ready to hand to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// What a dialog hands to business logic on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogSubmission {
    Recipe(NewRecipe),
    Product(NewProduct),
}

impl DialogSubmission {
    pub fn kind(&self) -> DialogKind {
        match self {
            Self::Recipe(_) => DialogKind::RecipeCreation,
            Self::Product(_) => DialogKind::ProductCreation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_triggers_round_trip() {
        for kind in DialogKind::ALL {
            let (section, action) = kind.entry_trigger();
            assert_eq!(DialogKind::from_trigger(section, action), Some(kind));
        }
        assert_eq!(DialogKind::from_trigger("recipes", "view"), None);
    }

    #[test]
    fn test_only_confirm_expects_choice() {
        for kind in DialogKind::ALL {
            let steps = kind.steps();
            let confirms: Vec<_> = steps.iter().filter(|s| s.is_confirm()).collect();
            assert_eq!(confirms.len(), 1);
            assert_eq!(steps.last(), confirms.first().copied());
            for step in &steps {
                assert_eq!(step.kind(), kind);
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let state = DialogState::initial(DialogKind::RecipeCreation);
        assert_eq!(state.step(), DialogStep::Recipe(RecipeStep::Name));
        assert_eq!(state.kind(), DialogKind::RecipeCreation);
    }
}
