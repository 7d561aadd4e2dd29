use std::collections::HashSet;
use std::sync::Arc;

use campaign_core::{CampaignError, CampaignResult, FollowUpItem};
use serde::{Deserialize, Serialize};

/// Ordered, non-empty list of follow-ups with unique ids.
///
/// Items are shared behind `Arc`: operations that leave an item untouched
/// hand back the same allocation, so consumers can detect changes with
/// [`Arc::ptr_eq`] instead of deep comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<FollowUpItem>", try_from = "Vec<FollowUpItem>")]
pub struct FollowUpSequence {
    items: Vec<Arc<FollowUpItem>>,
}

impl FollowUpSequence {
    /// Validates and wraps `items`. Fails on an empty list or duplicate ids.
    pub fn new(items: Vec<FollowUpItem>) -> CampaignResult<Self> {
        Self::from_shared(items.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(items: Vec<Arc<FollowUpItem>>) -> CampaignResult<Self> {
        if items.is_empty() {
            return Err(CampaignError::Validation(
                "a sequence needs at least the initial message".to_string(),
            ));
        }
        {
            let mut seen = HashSet::with_capacity(items.len());
            for item in &items {
                if !seen.insert(item.id()) {
                    return Err(CampaignError::Validation(format!(
                        "duplicate follow-up id '{}'",
                        item.id()
                    )));
                }
            }
        }
        Ok(Self { items })
    }

    /// Wraps items whose invariants the caller already upholds (a
    /// permutation or in-place edit of an existing sequence).
    pub(crate) fn from_validated(items: Vec<Arc<FollowUpItem>>) -> Self {
        debug_assert!(!items.is_empty());
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<FollowUpItem>> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Arc<FollowUpItem>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FollowUpItem>> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.id()).collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id() == id)
    }

    pub fn initial(&self) -> &Arc<FollowUpItem> {
        &self.items[0]
    }
}

impl TryFrom<Vec<FollowUpItem>> for FollowUpSequence {
    type Error = CampaignError;

    fn try_from(items: Vec<FollowUpItem>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<FollowUpSequence> for Vec<FollowUpItem> {
    fn from(seq: FollowUpSequence) -> Self {
        seq.items
            .into_iter()
            .map(|item| Arc::try_unwrap(item).unwrap_or_else(|shared| (*shared).clone()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str) -> FollowUpItem {
        FollowUpItem::new(id, format!("message {}", id)).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(FollowUpSequence::new(vec![]).is_err());
        assert!(FollowUpSequence::new(vec![item("a"), item("b"), item("a")]).is_err());
        let seq = FollowUpSequence::new(vec![item("a"), item("b")]).unwrap();
        assert_eq!(seq.ids(), vec!["a", "b"]);
        assert_eq!(seq.initial().id(), "a");
        assert!(seq.contains_id("b"));
        assert!(!seq.contains_id("c"));
    }

    #[test]
    fn test_json_array_round_trip() {
        let json = r#"[{"id":"a","message":"hi","delayDays":0},{"id":"b","message":"again","delayDays":3}]"#;
        let seq: FollowUpSequence = serde_json::from_str(json).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1).unwrap().delay_days(), 3);

        let back = serde_json::to_value(&seq).unwrap();
        assert_eq!(back[1]["id"], "b");
        assert!(serde_json::from_str::<FollowUpSequence>("[]").is_err());

        let reparsed: FollowUpSequence = serde_json::from_value(back).unwrap();
        assert_eq!(reparsed, seq);
    }

    #[test]
    fn test_json_rejects_drifted_item() {
        let json = r#"[{"id":"a","message":"hi","delayDays":0},{"id":"b","message":"again","delay_days":3}]"#;
        assert!(serde_json::from_str::<FollowUpSequence>(json).is_err());
    }
}
