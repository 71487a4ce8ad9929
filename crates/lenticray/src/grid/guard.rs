//! Confirm-before-navigate decisions.

use std::collections::VecDeque;
use std::fmt;

/// An action that would replace the resident page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    PageTurn { from: usize, to: usize },
    AddPage,
    UploadCsv,
}

impl PendingAction {
    /// Question shown to the user while edits are unsaved.
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::PageTurn { .. } => {
                "You have unsaved changes. Do you want to save them before changing the page?"
            }
            PendingAction::AddPage => {
                "You have unsaved changes. Do you want to save them before adding a new page?"
            }
            PendingAction::UploadCsv => {
                "You have unsaved changes. Uploading a CSV replaces the whole dataset. \
                 Do you want to save them first?"
            }
        }
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingAction::PageTurn { from, to } => write!(f, "Page change {} -> {}", from, to),
            PendingAction::AddPage => f.write_str("Add page"),
            PendingAction::UploadCsv => f.write_str("CSV upload"),
        }
    }
}

/// What to do with unsaved edits before a [`PendingAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Save the page, then proceed. A failed save aborts the action.
    Save,
    /// Drop the edits and proceed.
    Discard,
    /// Stay on the current page with edits intact.
    Cancel,
}

/// How unsaved edits were resolved before an action proceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Nothing to resolve: the buffer was clean or a save was in flight.
    Clean,
    /// The page was saved.
    Saved,
    /// The edits will be dropped by the action.
    Discarded,
}

/// Asked by the editor whenever a dirty page is about to be replaced.
pub trait NavigationGuard {
    fn decide(&mut self, action: &PendingAction) -> GuardDecision;
}

impl<F> NavigationGuard for F
where
    F: FnMut(&PendingAction) -> GuardDecision,
{
    fn decide(&mut self, action: &PendingAction) -> GuardDecision {
        self(action)
    }
}

/// Guard that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedGuard(pub GuardDecision);

impl NavigationGuard for FixedGuard {
    fn decide(&mut self, _action: &PendingAction) -> GuardDecision {
        self.0
    }
}

/// Guard that replays queued decisions and remembers what it was asked.
#[derive(Debug, Clone)]
pub struct ScriptedGuard {
    decisions: VecDeque<GuardDecision>,
    fallback: GuardDecision,
    asked: Vec<PendingAction>,
}

impl ScriptedGuard {
    /// Answers `decisions` in order, then `Cancel`.
    pub fn new(decisions: impl IntoIterator<Item = GuardDecision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            fallback: GuardDecision::Cancel,
            asked: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: GuardDecision) -> Self {
        self.fallback = fallback;
        self
    }

    /// Every action the editor asked about, oldest first.
    pub fn asked(&self) -> &[PendingAction] {
        &self.asked
    }
}

impl NavigationGuard for ScriptedGuard {
    fn decide(&mut self, action: &PendingAction) -> GuardDecision {
        self.asked.push(*action);
        self.decisions.pop_front().unwrap_or(self.fallback)
    }
}
