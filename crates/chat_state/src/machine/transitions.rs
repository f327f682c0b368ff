//! Dialog transitions - FSM transition logic
//!
//! Every `(step, event)` pair resolves to exactly one of: advance to the next
//! declared step, stay on the same step with a rejection, commit, or cancel.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::events::{ConfirmChoice, DialogEvent, InputCategory};
use super::states::{
    DialogKind, DialogState, DialogStep, DialogSubmission, NewProduct, NewRecipe, ProductDraft,
    ProductStep, RecipeDraft, RecipeStep,
};

pub const MIN_RECIPE_NAME_CHARS: usize = 3;
pub const MIN_PRODUCT_NAME_CHARS: usize = 2;

/// Unexpected failures while applying a transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("dialog {0} has already finished")]
    Finished(DialogKind),

    #[error("cannot commit {kind}: {field} was never collected")]
    IncompleteDraft { kind: DialogKind, field: &'static str },
}

/// Why input was not accepted at the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Input of the wrong category for this step.
    WrongInput { expected: InputCategory },
    /// Right category, but the value failed validation.
    Invalid(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongInput {
                expected: InputCategory::Text,
            } => f.write_str("Please type your answer as a message."),
            Self::WrongInput {
                expected: InputCategory::Choice,
            } => f.write_str("Please use the buttons below to confirm or cancel."),
            Self::Invalid(reason) => f.write_str(reason),
        }
    }
}

/// Result of feeding one event to a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved to the next declared step.
    Advanced { from: DialogStep, to: DialogStep },
    /// Stayed on the same step; collected fields unchanged.
    Rejected { step: DialogStep, reason: Rejection },
    /// Confirmed; the dialog is finished.
    Committed(DialogSubmission),
    /// Cancelled; collected fields discarded, the dialog is finished.
    Cancelled,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed(_) | Self::Cancelled)
    }
}

/// One entry of the transition history.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub from: DialogStep,
    /// `None` when the event ended the dialog.
    pub to: Option<DialogStep>,
    pub event: DialogEvent,
    pub at: DateTime<Utc>,
}

/// Outcome of a per-dialog transition function before it is applied.
enum Next<S, D> {
    Move(S, D),
    Stay(Rejection),
    Commit(DialogSubmission),
    Cancel,
}

/// State machine for one running dialog.
#[derive(Debug, Clone)]
pub struct DialogMachine {
    /// Current step and collected fields.
    state: DialogState,
    finished: bool,
    /// Transition history (limited).
    history: Vec<StepRecord>,
    /// Max history entries to keep.
    max_history: usize,
}

impl DialogMachine {
    /// Create a machine at the first step of `kind`.
    pub fn new(kind: DialogKind) -> Self {
        Self::with_state(DialogState::initial(kind))
    }

    /// Create a machine with a specific state.
    pub fn with_state(state: DialogState) -> Self {
        Self {
            state,
            finished: false,
            history: Vec::new(),
            max_history: 50,
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.state.kind()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn step(&self) -> DialogStep {
        self.state.step()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drop collected fields and go back to the first step.
    pub fn restart(&mut self) {
        self.state = DialogState::initial(self.kind());
        self.finished = false;
    }

    /// Feed one event to the dialog.
    pub fn handle_event(&mut self, event: DialogEvent) -> Result<StepOutcome, TransitionError> {
        if self.finished {
            return Err(TransitionError::Finished(self.kind()));
        }

        let from = self.step();
        let outcome = match &self.state {
            DialogState::Recipe { step, draft } => match recipe_next(*step, draft, &event)? {
                Next::Move(step, draft) => {
                    self.state = DialogState::Recipe { step, draft };
                    StepOutcome::Advanced {
                        from,
                        to: self.step(),
                    }
                }
                Next::Stay(reason) => StepOutcome::Rejected { step: from, reason },
                Next::Commit(submission) => StepOutcome::Committed(submission),
                Next::Cancel => StepOutcome::Cancelled,
            },
            DialogState::Product { step, draft } => match product_next(*step, draft, &event)? {
                Next::Move(step, draft) => {
                    self.state = DialogState::Product { step, draft };
                    StepOutcome::Advanced {
                        from,
                        to: self.step(),
                    }
                }
                Next::Stay(reason) => StepOutcome::Rejected { step: from, reason },
                Next::Commit(submission) => StepOutcome::Committed(submission),
                Next::Cancel => StepOutcome::Cancelled,
            },
        };

        if outcome.is_terminal() {
            self.finished = true;
        }
        if let StepOutcome::Rejected { reason, .. } = &outcome {
            tracing::debug!(step = %from, %reason, "dialog input rejected");
        }

        self.history.push(StepRecord {
            from,
            to: (!outcome.is_terminal()).then(|| self.step()),
            event,
            at: Utc::now(),
        });
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        Ok(outcome)
    }
}

/// Shared handling of the global cancel trigger and category checks.
///
/// Returns the text for text steps, or `Err(next)` when the event is settled
/// without looking at its content.
fn expect_text<'e, S, D>(step: DialogStep, event: &'e DialogEvent) -> Result<&'e str, Next<S, D>> {
    match event {
        DialogEvent::Cancel => Err(Next::Cancel),
        DialogEvent::Text(text) if step.expects() == InputCategory::Text => Ok(text.trim()),
        _ => Err(Next::Stay(Rejection::WrongInput {
            expected: step.expects(),
        })),
    }
}

fn confirm_choice<S, D>(event: &DialogEvent) -> Result<ConfirmChoice, Next<S, D>> {
    match event {
        DialogEvent::Cancel => Err(Next::Cancel),
        DialogEvent::Choice(choice) => Ok(*choice),
        DialogEvent::Text(_) => Err(Next::Stay(Rejection::WrongInput {
            expected: InputCategory::Choice,
        })),
    }
}

fn recipe_next(
    step: RecipeStep,
    draft: &RecipeDraft,
    event: &DialogEvent,
) -> Result<Next<RecipeStep, RecipeDraft>, TransitionError> {
    use RecipeStep::*;

    if step == Confirm {
        return Ok(match confirm_choice(event) {
            Err(next) => next,
            Ok(ConfirmChoice::Cancel) => Next::Cancel,
            Ok(ConfirmChoice::Commit) => Next::Commit(DialogSubmission::Recipe(finish_recipe(draft)?)),
        });
    }

    let text = match expect_text(DialogStep::Recipe(step), event) {
        Ok(text) => text,
        Err(next) => return Ok(next),
    };

    let mut draft = draft.clone();
    let next = match step {
        Name => {
            if text.chars().count() < MIN_RECIPE_NAME_CHARS {
                return Ok(Next::Stay(Rejection::Invalid(format!(
                    "The name must be at least {MIN_RECIPE_NAME_CHARS} characters long. Try again:"
                ))));
            }
            draft.name = Some(text.to_string());
            Ingredients
        }
        Ingredients => {
            let ingredients = parse_ingredients(text);
            if ingredients.is_empty() {
                return Ok(Next::Stay(Rejection::Invalid(
                    "No ingredients found. List one ingredient per line:".to_string(),
                )));
            }
            draft.ingredients = ingredients;
            Instructions
        }
        Instructions => {
            if text.is_empty() {
                return Ok(Next::Stay(Rejection::Invalid(
                    "Instructions must not be empty. Try again:".to_string(),
                )));
            }
            draft.instructions = Some(text.to_string());
            Confirm
        }
        Confirm => unreachable!("confirm handled above"),
    };

    Ok(Next::Move(next, draft))
}

fn product_next(
    step: ProductStep,
    draft: &ProductDraft,
    event: &DialogEvent,
) -> Result<Next<ProductStep, ProductDraft>, TransitionError> {
    use ProductStep::*;

    if step == Confirm {
        return Ok(match confirm_choice(event) {
            Err(next) => next,
            Ok(ConfirmChoice::Cancel) => Next::Cancel,
            Ok(ConfirmChoice::Commit) => {
                Next::Commit(DialogSubmission::Product(finish_product(draft)?))
            }
        });
    }

    let text = match expect_text(DialogStep::Product(step), event) {
        Ok(text) => text,
        Err(next) => return Ok(next),
    };

    let mut draft = draft.clone();
    let next = match step {
        Name => {
            if text.chars().count() < MIN_PRODUCT_NAME_CHARS {
                return Ok(Next::Stay(Rejection::Invalid(format!(
                    "The name must be at least {MIN_PRODUCT_NAME_CHARS} characters long. Try again:"
                ))));
            }
            draft.name = Some(text.to_string());
            Calories
        }
        Calories | Protein | Fat | Carbs => {
            let Some(value) = parse_amount(text) else {
                return Ok(Next::Stay(Rejection::Invalid(
                    "Enter a non-negative number, for example 12.5:".to_string(),
                )));
            };
            match step {
                Calories => {
                    draft.calories = Some(value);
                    Protein
                }
                Protein => {
                    draft.protein = Some(value);
                    Fat
                }
                Fat => {
                    draft.fat = Some(value);
                    Carbs
                }
                _ => {
                    draft.carbs = Some(value);
                    Confirm
                }
            }
        }
        Confirm => unreachable!("confirm handled above"),
    };

    Ok(Next::Move(next, draft))
}

fn finish_recipe(draft: &RecipeDraft) -> Result<NewRecipe, TransitionError> {
    let missing = |field| TransitionError::IncompleteDraft {
        kind: DialogKind::RecipeCreation,
        field,
    };
    if draft.ingredients.is_empty() {
        return Err(missing("ingredients"));
    }
    Ok(NewRecipe {
        name: draft.name.clone().ok_or_else(|| missing("name"))?,
        ingredients: draft.ingredients.clone(),
        instructions: draft
            .instructions
            .clone()
            .ok_or_else(|| missing("instructions"))?,
    })
}

fn finish_product(draft: &ProductDraft) -> Result<NewProduct, TransitionError> {
    let missing = |field| TransitionError::IncompleteDraft {
        kind: DialogKind::ProductCreation,
        field,
    };
    Ok(NewProduct {
        name: draft.name.clone().ok_or_else(|| missing("name"))?,
        calories: draft.calories.ok_or_else(|| missing("calories"))?,
        protein: draft.protein.ok_or_else(|| missing("protein"))?,
        fat: draft.fat.ok_or_else(|| missing("fat"))?,
        carbs: draft.carbs.ok_or_else(|| missing("carbs"))?,
    })
}

/// One ingredient per line; list markers are stripped.
fn parse_ingredients(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(&['•', '-', '*'][..]).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-negative decimal; a comma is accepted as the decimal separator.
fn parse_amount(text: &str) -> Option<f64> {
    let value: f64 = text.replace(',', ".").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_recipe_draft() -> RecipeDraft {
        RecipeDraft {
            name: Some("Omelette".into()),
            ingredients: vec!["2 eggs".into(), "50 ml milk".into()],
            instructions: Some("Whisk and fry.".into()),
        }
    }

    fn full_product_draft() -> ProductDraft {
        ProductDraft {
            name: Some("Apple".into()),
            calories: Some(52.0),
            protein: Some(0.3),
            fat: Some(0.2),
            carbs: Some(14.0),
        }
    }

    fn state_at(step: DialogStep) -> DialogState {
        match step {
            DialogStep::Recipe(step) => DialogState::Recipe {
                step,
                draft: full_recipe_draft(),
            },
            DialogStep::Product(step) => DialogState::Product {
                step,
                draft: full_product_draft(),
            },
        }
    }

    #[test]
    fn test_recipe_happy_path() {
        let mut sm = DialogMachine::new(DialogKind::RecipeCreation);

        let t1 = sm.handle_event(DialogEvent::text("Omelette")).unwrap();
        assert_eq!(
            t1,
            StepOutcome::Advanced {
                from: DialogStep::Recipe(RecipeStep::Name),
                to: DialogStep::Recipe(RecipeStep::Ingredients),
            }
        );

        sm.handle_event(DialogEvent::text("• 2 eggs\n- 50 ml milk\n\n* salt"))
            .unwrap();
        sm.handle_event(DialogEvent::text("Whisk and fry.")).unwrap();
        assert_eq!(sm.step(), DialogStep::Recipe(RecipeStep::Confirm));

        let done = sm
            .handle_event(DialogEvent::Choice(ConfirmChoice::Commit))
            .unwrap();
        match done {
            StepOutcome::Committed(DialogSubmission::Recipe(recipe)) => {
                assert_eq!(recipe.name, "Omelette");
                assert_eq!(recipe.ingredients, vec!["2 eggs", "50 ml milk", "salt"]);
                assert_eq!(recipe.instructions, "Whisk and fry.");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(sm.is_finished());
    }

    #[test]
    fn test_invalid_name_self_loops_without_changing_fields() {
        let mut sm = DialogMachine::new(DialogKind::RecipeCreation);
        let before = sm.state().clone();

        for input in ["", "  ", "ab"] {
            let outcome = sm.handle_event(DialogEvent::text(input)).unwrap();
            assert!(matches!(
                outcome,
                StepOutcome::Rejected {
                    step: DialogStep::Recipe(RecipeStep::Name),
                    reason: Rejection::Invalid(_),
                }
            ));
        }
        assert_eq!(sm.state(), &before);
        assert!(!sm.is_finished());
    }

    #[test]
    fn test_wrong_category_is_rejected() {
        let mut sm = DialogMachine::new(DialogKind::ProductCreation);
        let outcome = sm
            .handle_event(DialogEvent::Choice(ConfirmChoice::Commit))
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Rejected {
                step: DialogStep::Product(ProductStep::Name),
                reason: Rejection::WrongInput {
                    expected: InputCategory::Text
                },
            }
        );

        let mut sm = DialogMachine::with_state(state_at(DialogStep::Recipe(RecipeStep::Confirm)));
        let outcome = sm.handle_event(DialogEvent::text("yes")).unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Rejected {
                reason: Rejection::WrongInput {
                    expected: InputCategory::Choice
                },
                ..
            }
        ));
    }

    #[test]
    fn test_product_amounts() {
        let mut sm = DialogMachine::new(DialogKind::ProductCreation);
        sm.handle_event(DialogEvent::text("Apple")).unwrap();

        let rejected = sm.handle_event(DialogEvent::text("-5")).unwrap();
        assert!(matches!(rejected, StepOutcome::Rejected { .. }));
        let rejected = sm.handle_event(DialogEvent::text("lots")).unwrap();
        assert!(matches!(rejected, StepOutcome::Rejected { .. }));

        for amount in ["52", "0,3", "0.2", "14"] {
            sm.handle_event(DialogEvent::text(amount)).unwrap();
        }
        assert_eq!(sm.step(), DialogStep::Product(ProductStep::Confirm));

        let done = sm
            .handle_event(DialogEvent::Choice(ConfirmChoice::Commit))
            .unwrap();
        assert_eq!(
            done,
            StepOutcome::Committed(DialogSubmission::Product(NewProduct {
                name: "Apple".into(),
                calories: 52.0,
                protein: 0.3,
                fat: 0.2,
                carbs: 14.0,
            }))
        );
    }

    #[test]
    fn test_every_step_handles_every_event() {
        let events = [
            DialogEvent::text("Something valid 12"),
            DialogEvent::text("42"),
            DialogEvent::text(""),
            DialogEvent::Choice(ConfirmChoice::Commit),
            DialogEvent::Choice(ConfirmChoice::Cancel),
            DialogEvent::Cancel,
        ];

        for kind in DialogKind::ALL {
            for step in kind.steps() {
                for event in &events {
                    let mut sm = DialogMachine::with_state(state_at(step));
                    let outcome = sm.handle_event(event.clone()).unwrap_or_else(|e| {
                        panic!("{step} left {event:?} unhandled: {e}")
                    });
                    match outcome {
                        StepOutcome::Advanced { from, to } => {
                            assert_eq!(from, step);
                            assert_ne!(to, step);
                            assert_eq!(to.kind(), kind);
                        }
                        StepOutcome::Rejected { step: at, .. } => assert_eq!(at, step),
                        StepOutcome::Committed(submission) => {
                            assert!(step.is_confirm());
                            assert_eq!(submission.kind(), kind);
                        }
                        StepOutcome::Cancelled => {}
                    }
                }
            }
        }
    }

    #[test]
    fn test_cancel_from_any_step() {
        for kind in DialogKind::ALL {
            for step in kind.steps() {
                let mut sm = DialogMachine::with_state(state_at(step));
                assert_eq!(
                    sm.handle_event(DialogEvent::Cancel).unwrap(),
                    StepOutcome::Cancelled
                );
                assert!(sm.is_finished());
            }
        }
    }

    #[test]
    fn test_finished_machine_refuses_events() {
        let mut sm = DialogMachine::new(DialogKind::RecipeCreation);
        sm.handle_event(DialogEvent::Cancel).unwrap();
        assert_eq!(
            sm.handle_event(DialogEvent::text("Omelette")),
            Err(TransitionError::Finished(DialogKind::RecipeCreation))
        );
    }

    #[test]
    fn test_incomplete_draft_is_an_error() {
        let mut sm = DialogMachine::with_state(DialogState::Recipe {
            step: RecipeStep::Confirm,
            draft: RecipeDraft::default(),
        });
        let err = sm
            .handle_event(DialogEvent::Choice(ConfirmChoice::Commit))
            .unwrap_err();
        assert!(matches!(err, TransitionError::IncompleteDraft { .. }));
    }

    #[test]
    fn test_restart_clears_fields() {
        let mut sm = DialogMachine::new(DialogKind::RecipeCreation);
        sm.handle_event(DialogEvent::text("Omelette")).unwrap();
        sm.restart();
        assert_eq!(sm.state(), &DialogState::initial(DialogKind::RecipeCreation));
    }

    #[test]
    fn test_history_tracking() {
        let mut sm = DialogMachine::new(DialogKind::RecipeCreation);
        sm.handle_event(DialogEvent::text("Omelette")).unwrap();
        sm.handle_event(DialogEvent::Cancel).unwrap();

        assert_eq!(sm.history().len(), 2);
        assert_eq!(
            sm.history()[0].to,
            Some(DialogStep::Recipe(RecipeStep::Ingredients))
        );
        assert_eq!(sm.history()[1].to, None);
    }
}
