//! Presentation-side owner of a follow-up sequence.
//!
//! The editor keeps the transient drag state the engine must not know
//! about, and pushes every effective change out through two injected
//! collaborators: a [`SequencePersistence`] that receives the replacement
//! list and a [`Notifier`] for the confirmation toast.

use std::sync::{Arc, Mutex};

use campaign_core::notifications::{make_notification, noop_notifier};
use campaign_core::{CampaignResult, FollowUpItem, FollowUpPatch, Notifier};
use tracing::debug;

use crate::engine::{ScheduledSend, SequenceReorderEngine};
use crate::sequence::FollowUpSequence;

/// Receives the replacement sequence after each effective change.
pub trait SequencePersistence: Send + Sync {
    fn on_follow_ups_change(&self, items: &FollowUpSequence);
}

impl<F> SequencePersistence for F
where
    F: Fn(&FollowUpSequence) + Send + Sync,
{
    fn on_follow_ups_change(&self, items: &FollowUpSequence) {
        self(items)
    }
}

/// Persistence that only remembers what it was handed. Used in tests and
/// by callers that read the sequence back from the editor.
#[derive(Default)]
pub struct RecordingPersistence {
    saved: Mutex<Vec<FollowUpSequence>>,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.saved.lock().expect("persistence mutex poisoned").len()
    }

    pub fn last(&self) -> Option<FollowUpSequence> {
        self.saved
            .lock()
            .expect("persistence mutex poisoned")
            .last()
            .cloned()
    }
}

impl SequencePersistence for RecordingPersistence {
    fn on_follow_ups_change(&self, items: &FollowUpSequence) {
        self.saved
            .lock()
            .expect("persistence mutex poisoned")
            .push(items.clone());
    }
}

/// Transient drag-and-drop view state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    pub dragging_index: Option<usize>,
    pub drag_over_index: Option<usize>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.dragging_index.is_some()
    }
}

pub struct SequenceEditor {
    items: FollowUpSequence,
    drag: DragState,
    engine: SequenceReorderEngine,
    notifier: Arc<dyn Notifier>,
    persistence: Arc<dyn SequencePersistence>,
}

impl std::fmt::Debug for SequenceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceEditor")
            .field("items", &self.items.len())
            .field("drag", &self.drag)
            .field("engine", &self.engine)
            .finish()
    }
}

impl SequenceEditor {
    /// Creates an editor that neither persists nor notifies.
    pub fn new(items: FollowUpSequence, engine: SequenceReorderEngine) -> Self {
        Self {
            items,
            drag: DragState::default(),
            engine,
            notifier: noop_notifier(),
            persistence: Arc::new(|_: &FollowUpSequence| {}),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn SequencePersistence>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn items(&self) -> &FollowUpSequence {
        &self.items
    }

    pub fn into_items(self) -> FollowUpSequence {
        self.items
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn engine(&self) -> &SequenceReorderEngine {
        &self.engine
    }

    pub fn drag_start(&mut self, index: usize) {
        if index >= self.items.len() {
            debug!(index, "Ignoring drag start outside the sequence");
            return;
        }
        self.drag = DragState {
            dragging_index: Some(index),
            drag_over_index: None,
        };
    }

    pub fn drag_over(&mut self, index: usize) {
        if self.drag.is_dragging() {
            self.drag.drag_over_index = Some(index);
        }
    }

    /// Cancels a drag without moving anything.
    pub fn drag_end(&mut self) {
        self.drag = DragState::default();
    }

    /// Completes a drag by moving the dragged item to `target_index`.
    /// Returns whether the sequence changed.
    pub fn drop_on(&mut self, target_index: usize) -> bool {
        let drag = std::mem::take(&mut self.drag);
        let Some(source_index) = drag.dragging_index else {
            return false;
        };
        self.move_item(source_index, target_index)
    }

    /// Moves an item without going through drag state.
    pub fn move_item(&mut self, source_index: usize, target_index: usize) -> bool {
        let (title, id) = match self.items.get(source_index) {
            Some(item) => (
                self.engine.title_for(source_index, item),
                item.id().to_string(),
            ),
            None => return false,
        };
        match self.engine.try_reorder(&self.items, source_index, target_index) {
            Some(next) => {
                let position = next
                    .iter()
                    .position(|i| i.id() == id)
                    .unwrap_or(target_index);
                self.commit(
                    next,
                    "Sequence reordered",
                    format!("Moved \"{}\" to position {}", title, position + 1),
                );
                true
            }
            None => false,
        }
    }

    pub fn update_item(&mut self, index: usize, patch: &FollowUpPatch) -> bool {
        match self.engine.try_update_item(&self.items, index, patch) {
            Some(next) => {
                let title = next
                    .get(index)
                    .map(|item| self.engine.title_for(index, item))
                    .unwrap_or_default();
                self.commit(next, "Follow-up updated", format!("Saved \"{}\"", title));
                true
            }
            None => false,
        }
    }

    pub fn add_follow_up(&mut self, item: FollowUpItem) -> CampaignResult<()> {
        let next = self.engine.add_follow_up(&self.items, item)?;
        let title = self.engine.title_for(next.len() - 1, &next.items()[next.len() - 1]);
        self.commit(next, "Follow-up added", format!("Added \"{}\"", title));
        Ok(())
    }

    pub fn remove_follow_up(&mut self, index: usize) -> bool {
        let title = match self.items.get(index) {
            Some(item) => self.engine.title_for(index, item),
            None => return false,
        };
        match self.engine.try_remove_follow_up(&self.items, index) {
            Some(next) => {
                self.commit(next, "Follow-up removed", format!("Removed \"{}\"", title));
                true
            }
            None => false,
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.engine.titles(&self.items)
    }

    pub fn schedule(&self) -> Vec<ScheduledSend> {
        self.engine.schedule(&self.items)
    }

    fn commit(&mut self, next: FollowUpSequence, title: &str, message: String) {
        self.items = next;
        self.persistence.on_follow_ups_change(&self.items);
        self.notifier.notify(make_notification(title, message));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use campaign_core::notifications::{capture_notifier, CaptureNotifier};

    fn editor() -> (SequenceEditor, Arc<CaptureNotifier>, Arc<RecordingPersistence>) {
        let items = FollowUpSequence::new(
            ["A", "B", "C", "D"]
                .iter()
                .map(|id| FollowUpItem::new(*id, format!("message {}", id)).unwrap())
                .collect(),
        )
        .unwrap();
        let notifier = capture_notifier();
        let persistence = Arc::new(RecordingPersistence::new());
        let editor = SequenceEditor::new(items, SequenceReorderEngine::new())
            .with_notifier(notifier.clone())
            .with_persistence(persistence.clone());
        (editor, notifier, persistence)
    }

    #[test]
    fn test_drag_and_drop_reorders_and_persists() {
        let (mut editor, notifier, persistence) = editor();
        editor.drag_start(0);
        editor.drag_over(1);
        editor.drag_over(2);
        assert_eq!(
            editor.drag_state(),
            DragState {
                dragging_index: Some(0),
                drag_over_index: Some(2),
            }
        );

        assert!(editor.drop_on(2));
        assert_eq!(editor.items().ids(), vec!["B", "C", "A", "D"]);
        assert_eq!(editor.drag_state(), DragState::default());

        assert_eq!(persistence.count(), 1);
        assert_eq!(persistence.last().unwrap().ids(), vec!["B", "C", "A", "D"]);
        assert_eq!(notifier.titles(), vec!["Sequence reordered".to_string()]);
        assert_eq!(
            notifier.notifications()[0].message,
            "Moved \"Initial Message\" to position 3"
        );
    }

    #[test]
    fn test_noops_emit_nothing() {
        let (mut editor, notifier, persistence) = editor();

        // drop without a drag
        assert!(!editor.drop_on(1));
        // drop on itself
        editor.drag_start(1);
        assert!(!editor.drop_on(1));
        assert_eq!(editor.drag_state(), DragState::default());
        // drag start outside the list is ignored
        editor.drag_start(9);
        assert!(!editor.drag_state().is_dragging());

        assert!(!editor.update_item(99, &FollowUpPatch::default().message("x")));
        assert!(!editor.remove_follow_up(0));
        assert!(!editor.move_item(7, 0));

        assert_eq!(notifier.count(), 0);
        assert_eq!(persistence.count(), 0);
        assert_eq!(editor.items().ids(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_drag_end_cancels() {
        let (mut editor, _notifier, persistence) = editor();
        editor.drag_start(3);
        editor.drag_over(0);
        editor.drag_end();
        assert!(!editor.drop_on(0));
        assert_eq!(persistence.count(), 0);
    }

    #[test]
    fn test_update_add_remove_notify_once_each() {
        let (mut editor, notifier, persistence) = editor();

        assert!(editor.update_item(1, &FollowUpPatch::default().name("Reminder")));
        editor
            .add_follow_up(FollowUpItem::new("E", "last call").unwrap())
            .unwrap();
        assert!(editor.remove_follow_up(2));

        assert_eq!(
            notifier.titles(),
            vec![
                "Follow-up updated".to_string(),
                "Follow-up added".to_string(),
                "Follow-up removed".to_string(),
            ]
        );
        assert_eq!(persistence.count(), 3);
        assert_eq!(editor.items().ids(), vec!["A", "B", "D", "E"]);
        assert_eq!(
            editor.titles(),
            vec!["Initial Message", "Reminder", "Follow-up #2", "Follow-up #3"]
        );
    }

    #[test]
    fn test_duplicate_add_is_an_error() {
        let (mut editor, notifier, _persistence) = editor();
        assert!(editor
            .add_follow_up(FollowUpItem::new("B", "again").unwrap())
            .is_err());
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_closure_persistence() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (editor, _, _) = editor();
        let mut editor = editor.with_persistence(Arc::new(move |items: &FollowUpSequence| {
            sink.lock().unwrap().push(items.len());
        }));
        assert!(editor.move_item(3, 0));
        assert_eq!(*seen.lock().unwrap(), vec![4]);
    }
}
