//! chat_state - Dialog state machines
//!
//! A dialog is a closed set of steps with typed collected fields. Each step
//! accepts one category of input; everything else is rejected with a
//! re-prompt. Every dialog ends in either a commit or a cancel.

pub mod machine;

// Re-export commonly used types
pub use machine::{
    ConfirmChoice, DialogEvent, DialogKind, DialogMachine, DialogState, DialogStep,
    DialogSubmission, InputCategory, NewProduct, NewRecipe, ProductDraft, ProductStep,
    RecipeDraft, RecipeStep, Rejection, StepOutcome, StepRecord, TransitionError,
};
