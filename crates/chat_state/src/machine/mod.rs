//! State machine module
//!
//! Contains the dialog FSM, its events and the prompts shown at each step.

mod events;
mod prompts;
mod states;
mod transitions;

pub use events::{ConfirmChoice, DialogEvent, InputCategory};
pub use states::{
    DialogKind, DialogState, DialogStep, DialogSubmission, NewProduct, NewRecipe, ProductDraft,
    ProductStep, RecipeDraft, RecipeStep,
};
pub use transitions::{DialogMachine, Rejection, StepOutcome, StepRecord, TransitionError};
