//! Follow-up sequencing for the campaign-creation workflow: drag-and-drop
//! reordering with positional delay renumbering, field edits, send-plan
//! computation and workflow progress tracking.

pub mod editor;
pub mod engine;
pub mod sequence;
pub mod workflow;

pub use editor::{DragState, RecordingPersistence, SequenceEditor, SequencePersistence};
pub use engine::{DelayPolicy, ScheduledSend, SequenceReorderEngine};
pub use sequence::FollowUpSequence;
pub use workflow::{Navigator, WorkflowProgress, WorkflowStep};
