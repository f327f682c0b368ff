//! Session data structures

use chat_core::{NavigationFrame, UserId};
use chat_state::{DialogEvent, DialogKind, DialogMachine, StepOutcome};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::stack::NavigationStack;

/// A running dialog and the screen to resume afterwards.
#[derive(Debug, Clone)]
pub struct DialogSession {
    pub id: Uuid,
    machine: DialogMachine,
    /// Taken exactly once when the dialog ends.
    return_point: Option<NavigationFrame>,
    pub started_at: DateTime<Utc>,
}

impl DialogSession {
    pub fn new(kind: DialogKind, return_point: NavigationFrame) -> Self {
        Self {
            id: Uuid::new_v4(),
            machine: DialogMachine::new(kind),
            return_point: Some(return_point),
            started_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.machine.kind()
    }

    pub fn machine(&self) -> &DialogMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut DialogMachine {
        &mut self.machine
    }

    pub fn return_point(&self) -> Option<&NavigationFrame> {
        self.return_point.as_ref()
    }

    /// Consume the return point. Later calls return `None`.
    pub fn take_return_point(&mut self) -> Option<NavigationFrame> {
        self.return_point.take()
    }

    /// Whether the return point has already been consumed.
    pub fn is_closed(&self) -> bool {
        self.return_point.is_none()
    }
}

/// Everything the front-end knows about one user.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: UserId,
    /// The screen the user is looking at.
    pub current: Option<NavigationFrame>,
    /// Screens to return to with "back".
    pub stack: NavigationStack,
    /// Active dialog, if any.
    pub dialog: Option<DialogSession>,
    pub created_at: DateTime<Utc>,
    /// Last time the session was updated
    pub last_updated: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: UserId, stack_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            current: None,
            stack: NavigationStack::new(stack_limit),
            dialog: None,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// The head of the navigation history: the current screen.
    pub fn top_frame(&self) -> Option<&NavigationFrame> {
        self.current.as_ref()
    }

    pub fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog_mut(&mut self) -> Result<&mut DialogSession> {
        self.dialog.as_mut().ok_or(SessionError::NoActiveDialog)
    }

    /// Feed an event to the active dialog.
    pub fn feed_dialog(&mut self, event: DialogEvent) -> Result<StepOutcome> {
        let dialog = self.dialog_mut()?;
        Ok(dialog.machine_mut().handle_event(event)?)
    }
}
