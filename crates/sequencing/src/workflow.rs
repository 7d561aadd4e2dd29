//! Progress tracker for the guided campaign-creation workflow
//! (contacts → template → campaign → schedule → review).

use std::collections::HashSet;
use std::sync::Arc;

use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// Workflow Step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Contacts,
    Template,
    Campaign,
    Schedule,
    Review,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 5] = [
        WorkflowStep::Contacts,
        WorkflowStep::Template,
        WorkflowStep::Campaign,
        WorkflowStep::Schedule,
        WorkflowStep::Review,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Contacts => 0,
            Self::Template => 1,
            Self::Campaign => 2,
            Self::Schedule => 3,
            Self::Review => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Contacts => "Contacts",
            Self::Template => "Template",
            Self::Campaign => "Campaign",
            Self::Schedule => "Schedule",
            Self::Review => "Review",
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Moves the hosting UI to a workflow step.
pub trait Navigator: Send + Sync {
    fn navigate(&self, step: WorkflowStep);
}

pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn navigate(&self, _step: WorkflowStep) {}
}

/// A recorded move between steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepVisit {
    pub from: WorkflowStep,
    pub to: WorkflowStep,
    pub at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Progress Tracker
// ---------------------------------------------------------------------------

pub struct WorkflowProgress {
    current: WorkflowStep,
    completed: HashSet<WorkflowStep>,
    history: Vec<StepVisit>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for WorkflowProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowProgress")
            .field("current", &self.current)
            .field("completed", &self.completed)
            .field("history", &self.history.len())
            .finish()
    }
}

impl Default for WorkflowProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgress {
    /// Starts at `Contacts` with nothing completed.
    pub fn new() -> Self {
        Self {
            current: WorkflowStep::Contacts,
            completed: HashSet::new(),
            history: Vec::new(),
            navigator: Arc::new(NoOpNavigator),
        }
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn current(&self) -> WorkflowStep {
        self.current
    }

    pub fn is_complete(&self, step: WorkflowStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn is_finished(&self) -> bool {
        self.completed.len() == WorkflowStep::ALL.len()
    }

    pub fn history(&self) -> &[StepVisit] {
        &self.history
    }

    /// Whole-number percentage of completed steps.
    pub fn percent_complete(&self) -> u8 {
        (self.completed.len() * 100 / WorkflowStep::ALL.len()) as u8
    }

    pub fn first_incomplete(&self) -> Option<WorkflowStep> {
        WorkflowStep::ALL
            .iter()
            .copied()
            .find(|s| !self.completed.contains(s))
    }

    /// Marks the current step done and advances to the next one. Returns
    /// the new step, or `None` once the final step is completed.
    pub fn complete_current(&mut self) -> Option<WorkflowStep> {
        self.completed.insert(self.current);
        info!(step = ?self.current, percent = self.percent_complete(), "Workflow step completed");
        let next = self.current.next()?;
        self.move_to(next);
        Some(next)
    }

    /// Jumps to `step`. Allowed for completed steps and for the first
    /// incomplete one; skipping ahead is rejected.
    pub fn go_to(&mut self, step: WorkflowStep) -> CampaignResult<()> {
        if step == self.current {
            return Ok(());
        }
        let reachable = self.completed.contains(&step) || self.first_incomplete() == Some(step);
        if !reachable {
            return Err(CampaignError::Workflow(format!(
                "cannot jump from {} to {} before completing earlier steps",
                self.current.label(),
                step.label()
            )));
        }
        self.move_to(step);
        Ok(())
    }

    /// Steps back one position. `None` at the first step.
    pub fn back(&mut self) -> Option<WorkflowStep> {
        let previous = self.current.previous()?;
        self.move_to(previous);
        Some(previous)
    }

    fn move_to(&mut self, step: WorkflowStep) {
        self.history.push(StepVisit {
            from: self.current,
            to: step,
            at: Utc::now(),
        });
        self.current = step;
        self.navigator.navigate(step);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<WorkflowStep>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, step: WorkflowStep) {
            self.visited.lock().unwrap().push(step);
        }
    }

    #[test]
    fn test_full_walkthrough() {
        let nav = Arc::new(RecordingNavigator::default());
        let mut progress = WorkflowProgress::new().with_navigator(nav.clone());
        assert_eq!(progress.current(), WorkflowStep::Contacts);
        assert_eq!(progress.percent_complete(), 0);

        assert_eq!(progress.complete_current(), Some(WorkflowStep::Template));
        assert_eq!(progress.complete_current(), Some(WorkflowStep::Campaign));
        assert_eq!(progress.complete_current(), Some(WorkflowStep::Schedule));
        assert_eq!(progress.complete_current(), Some(WorkflowStep::Review));
        assert_eq!(progress.percent_complete(), 80);
        assert!(!progress.is_finished());

        assert_eq!(progress.complete_current(), None);
        assert!(progress.is_finished());
        assert_eq!(progress.percent_complete(), 100);

        assert_eq!(
            *nav.visited.lock().unwrap(),
            vec![
                WorkflowStep::Template,
                WorkflowStep::Campaign,
                WorkflowStep::Schedule,
                WorkflowStep::Review,
            ]
        );
        assert_eq!(progress.history().len(), 4);
    }

    #[test]
    fn test_cannot_skip_ahead() {
        let mut progress = WorkflowProgress::new();
        assert!(progress.go_to(WorkflowStep::Schedule).is_err());
        assert_eq!(progress.current(), WorkflowStep::Contacts);

        progress.complete_current();
        progress.complete_current();
        assert_eq!(progress.current(), WorkflowStep::Campaign);

        // back to a completed step and forward to the first incomplete one
        progress.go_to(WorkflowStep::Contacts).unwrap();
        progress.go_to(WorkflowStep::Campaign).unwrap();
        assert!(progress.go_to(WorkflowStep::Review).is_err());
    }

    #[test]
    fn test_back() {
        let mut progress = WorkflowProgress::new();
        assert_eq!(progress.back(), None);
        progress.complete_current();
        assert_eq!(progress.back(), Some(WorkflowStep::Contacts));
        assert!(progress.is_complete(WorkflowStep::Contacts));
        assert_eq!(progress.first_incomplete(), Some(WorkflowStep::Template));
    }

    #[test]
    fn test_step_order() {
        assert_eq!(WorkflowStep::Contacts.next(), Some(WorkflowStep::Template));
        assert_eq!(WorkflowStep::Review.next(), None);
        assert_eq!(WorkflowStep::Template.previous(), Some(WorkflowStep::Contacts));
        assert_eq!(WorkflowStep::Contacts.previous(), None);
    }
}
