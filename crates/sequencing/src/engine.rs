use std::sync::Arc;

use campaign_core::config::SequencingConfig;
use campaign_core::{CampaignError, CampaignResult, FollowUpCondition, FollowUpItem, FollowUpPatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sequence::FollowUpSequence;

/// How follow-up delays are treated after a structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DelayPolicy {
    /// Position `i > 0` gets `i * spacing_days`; authored gaps are dropped.
    Uniform { spacing_days: u32 },
    /// Every item keeps the delay it was authored with.
    Preserve,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        DelayPolicy::Uniform { spacing_days: 3 }
    }
}

/// One row of the review-step schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSend {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub condition: FollowUpCondition,
    pub delay_days: u32,
    /// Days since campaign start.
    pub day_offset: u64,
}

/// Pure operations over a [`FollowUpSequence`]. Holds no per-sequence state;
/// every call returns a fresh sequence and leaves the input untouched.
#[derive(Debug, Clone)]
pub struct SequenceReorderEngine {
    policy: DelayPolicy,
    initial_label: String,
    follow_up_label_prefix: String,
}

impl Default for SequenceReorderEngine {
    fn default() -> Self {
        Self::from_config(&SequencingConfig::default())
    }
}

impl SequenceReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SequencingConfig) -> Self {
        let policy = if config.preserve_custom_delays {
            DelayPolicy::Preserve
        } else {
            DelayPolicy::Uniform {
                spacing_days: config.spacing_days,
            }
        };
        Self {
            policy,
            initial_label: config.initial_label.clone(),
            follow_up_label_prefix: config.follow_up_label_prefix.clone(),
        }
    }

    pub fn with_policy(mut self, policy: DelayPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DelayPolicy {
        self.policy
    }

    /// Moves the item at `source_index` so it ends up at `target_index`,
    /// then renumbers delays. The target is interpreted against the list
    /// after removal; a target past the end appends.
    ///
    /// Returns `None` when `source_index` is out of range or equals
    /// `target_index`.
    pub fn try_reorder(
        &self,
        items: &FollowUpSequence,
        source_index: usize,
        target_index: usize,
    ) -> Option<FollowUpSequence> {
        if source_index >= items.len() || source_index == target_index {
            debug!(source_index, target_index, len = items.len(), "Ignoring reorder");
            return None;
        }

        let mut next = items.items().to_vec();
        let moved = next.remove(source_index);
        let target = target_index.min(next.len());
        info!(
            id = %moved.id(),
            from = source_index,
            to = target,
            "Reordering follow-up"
        );
        next.insert(target, moved);

        Some(FollowUpSequence::from_validated(self.renumber(next)))
    }

    /// Like [`try_reorder`](Self::try_reorder) but returns the input
    /// unchanged for ignored moves.
    pub fn reorder(
        &self,
        items: &FollowUpSequence,
        source_index: usize,
        target_index: usize,
    ) -> FollowUpSequence {
        self.try_reorder(items, source_index, target_index)
            .unwrap_or_else(|| items.clone())
    }

    /// Shallow-merges `patch` into the item at `index`. Other items keep
    /// their `Arc` identity. `None` when `index` is out of bounds.
    pub fn try_update_item(
        &self,
        items: &FollowUpSequence,
        index: usize,
        patch: &FollowUpPatch,
    ) -> Option<FollowUpSequence> {
        let current = match items.get(index) {
            Some(item) => item,
            None => {
                debug!(index, len = items.len(), "Ignoring update");
                return None;
            }
        };

        let mut next = items.items().to_vec();
        next[index] = Arc::new(current.patched(patch));
        debug!(index, id = %current.id(), "Updated follow-up");
        Some(FollowUpSequence::from_validated(next))
    }

    pub fn update_item(
        &self,
        items: &FollowUpSequence,
        index: usize,
        patch: &FollowUpPatch,
    ) -> FollowUpSequence {
        self.try_update_item(items, index, patch)
            .unwrap_or_else(|| items.clone())
    }

    /// Display title for the item at `index`.
    pub fn title_for(&self, index: usize, item: &FollowUpItem) -> String {
        if index == 0 {
            return self.initial_label.clone();
        }
        match item.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}{}", self.follow_up_label_prefix, index),
        }
    }

    pub fn titles(&self, items: &FollowUpSequence) -> Vec<String> {
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.title_for(idx, item))
            .collect()
    }

    /// Appends `item` as the last follow-up. Under the uniform policy its
    /// delay is set from its position; earlier items are left as they are.
    pub fn add_follow_up(
        &self,
        items: &FollowUpSequence,
        item: FollowUpItem,
    ) -> CampaignResult<FollowUpSequence> {
        if items.contains_id(item.id()) {
            return Err(CampaignError::Validation(format!(
                "duplicate follow-up id '{}'",
                item.id()
            )));
        }

        let position = items.len();
        let item = match self.delay_for(position) {
            Some(delay) => item.with_delay_days(delay),
            None => item,
        };
        info!(id = %item.id(), position, "Adding follow-up");

        let mut next = items.items().to_vec();
        next.push(Arc::new(item));
        Ok(FollowUpSequence::from_validated(next))
    }

    /// Removes the follow-up at `index` and renumbers the rest. The initial
    /// message (index 0) cannot be removed; that and out-of-bounds indices
    /// return `None`.
    pub fn try_remove_follow_up(
        &self,
        items: &FollowUpSequence,
        index: usize,
    ) -> Option<FollowUpSequence> {
        if index == 0 || index >= items.len() {
            debug!(index, len = items.len(), "Ignoring remove");
            return None;
        }

        let mut next = items.items().to_vec();
        let removed = next.remove(index);
        info!(id = %removed.id(), index, "Removing follow-up");
        Some(FollowUpSequence::from_validated(self.renumber(next)))
    }

    /// Cumulative send plan: the initial message goes out on day 0 and each
    /// follow-up `delay_days` after the one before it.
    pub fn schedule(&self, items: &FollowUpSequence) -> Vec<ScheduledSend> {
        let mut day_offset: u64 = 0;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if index > 0 {
                    day_offset += u64::from(item.delay_days());
                }
                ScheduledSend {
                    index,
                    id: item.id().to_string(),
                    title: self.title_for(index, item),
                    condition: item.condition(),
                    delay_days: if index == 0 { 0 } else { item.delay_days() },
                    day_offset,
                }
            })
            .collect()
    }

    fn delay_for(&self, position: usize) -> Option<u32> {
        match self.policy {
            DelayPolicy::Uniform { spacing_days } => {
                let position = u32::try_from(position).unwrap_or(u32::MAX);
                Some(position.saturating_mul(spacing_days))
            }
            DelayPolicy::Preserve => None,
        }
    }

    /// Applies the delay policy to positions `1..`. Items whose delay
    /// already matches keep their allocation.
    fn renumber(&self, items: Vec<Arc<FollowUpItem>>) -> Vec<Arc<FollowUpItem>> {
        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                if idx == 0 {
                    return item;
                }
                match self.delay_for(idx) {
                    Some(delay) if delay != item.delay_days() => {
                        Arc::new((*item).clone().with_delay_days(delay))
                    }
                    _ => item,
                }
            })
            .collect()
    }
}
