use crate::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Gate that decides whether a follow-up is sent to a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FollowUpCondition {
    /// Only contacts that have not replied yet.
    #[default]
    #[serde(rename = "no-response")]
    NoResponse,
    /// Every contact in the campaign.
    #[serde(rename = "all")]
    All,
}

impl FollowUpCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoResponse => "no-response",
            Self::All => "all",
        }
    }
}

impl fmt::Display for FollowUpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowUpCondition {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "no-response" => Ok(Self::NoResponse),
            "all" => Ok(Self::All),
            other => Err(CampaignError::Validation(format!(
                "unknown follow-up condition '{}'",
                other
            ))),
        }
    }
}

/// One message of a campaign's follow-up sequence.
///
/// Position 0 of a sequence is the initial message sent at campaign start;
/// every later item is sent `delay_days` after the previous send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFollowUpItem")]
pub struct FollowUpItem {
    id: String,
    message: String,
    delay_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    condition: FollowUpCondition,
}

/// Wire shape accepted before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawFollowUpItem {
    id: String,
    message: String,
    delay_days: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    condition: FollowUpCondition,
}

impl TryFrom<RawFollowUpItem> for FollowUpItem {
    type Error = CampaignError;

    fn try_from(raw: RawFollowUpItem) -> Result<Self, Self::Error> {
        Ok(FollowUpItem::new(raw.id, raw.message)?
            .with_delay_days(raw.delay_days)
            .with_name_opt(raw.name)
            .with_condition(raw.condition))
    }
}

impl FollowUpItem {
    /// Creates an item with no delay, no name and the default condition.
    /// Fails when `id` is blank.
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> CampaignResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CampaignError::Validation(
                "follow-up id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            message: message.into(),
            delay_days: 0,
            name: None,
            condition: FollowUpCondition::default(),
        })
    }

    /// Creates an item with a freshly generated id.
    pub fn generate(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            delay_days: 0,
            name: None,
            condition: FollowUpCondition::default(),
        }
    }

    pub fn with_delay_days(mut self, delay_days: u32) -> Self {
        self.delay_days = delay_days;
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_name_opt(Some(name.into()))
    }

    fn with_name_opt(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_condition(mut self, condition: FollowUpCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn delay_days(&self) -> u32 {
        self.delay_days
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn condition(&self) -> FollowUpCondition {
        self.condition
    }

    /// Shallow merge: every field set on `patch` replaces the current value.
    pub fn patched(&self, patch: &FollowUpPatch) -> Self {
        let mut item = self.clone();
        if let Some(message) = &patch.message {
            item.message = message.clone();
        }
        if let Some(delay_days) = patch.delay_days {
            item.delay_days = delay_days;
        }
        if let Some(name) = &patch.name {
            item = item.with_name_opt(Some(name.clone()));
        }
        if let Some(condition) = patch.condition {
            item.condition = condition;
        }
        item
    }
}

/// Partial set of field overrides for a follow-up. A blank `name` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FollowUpCondition>,
}

impl FollowUpPatch {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn delay_days(mut self, delay_days: u32) -> Self {
        self.delay_days = Some(delay_days);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn condition(mut self, condition: FollowUpCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.delay_days.is_none()
            && self.name.is_none()
            && self.condition.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id_rejected() {
        assert!(FollowUpItem::new("  ", "hello").is_err());
        assert!(FollowUpItem::new("a", "").is_ok());
    }

    #[test]
    fn test_blank_name_is_none() {
        let item = FollowUpItem::new("a", "hi").unwrap().with_name("   ");
        assert_eq!(item.name(), None);
    }

    #[test]
    fn test_condition_parse() {
        assert_eq!(
            "no-response".parse::<FollowUpCondition>().unwrap(),
            FollowUpCondition::NoResponse
        );
        assert_eq!("all".parse::<FollowUpCondition>().unwrap(), FollowUpCondition::All);
        assert!("sometimes".parse::<FollowUpCondition>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let item: FollowUpItem = serde_json::from_str(
            r#"{"id":"f1","message":"Just checking in","delayDays":4,"name":"Nudge","condition":"all"}"#,
        )
        .unwrap();
        assert_eq!(item.id(), "f1");
        assert_eq!(item.delay_days(), 4);
        assert_eq!(item.name(), Some("Nudge"));
        assert_eq!(item.condition(), FollowUpCondition::All);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["delayDays"], 4);
        assert_eq!(json["condition"], "all");
    }

    #[test]
    fn test_json_rejects_bad_shapes() {
        let parse = |json: &str| serde_json::from_str::<FollowUpItem>(json);
        assert!(parse(r#"{"id":"","message":"x","delayDays":0}"#).is_err());
        assert!(parse(r#"{"id":"a","message":"x","delayDays":-1}"#).is_err());
        assert!(parse(r#"{"id":"a","message":"x","delayDays":1,"condition":"maybe"}"#).is_err());
        // required fields
        assert!(parse(r#"{"id":"a"}"#).is_err());
        assert!(parse(r#"{"id":"a","delayDays":2}"#).is_err());
        assert!(parse(r#"{"id":"a","message":"hi"}"#).is_err());
        // misspelled keys are not silently dropped
        assert!(parse(r#"{"id":"a","message":"hi","delay_days":5}"#).is_err());
        assert!(parse(r#"{"id":"a","message":"hi","delayDays":5,"nmae":"x"}"#).is_err());

        let minimal = parse(r#"{"id":"a","message":"hi","delayDays":5}"#).unwrap();
        assert_eq!(minimal.name(), None);
        assert_eq!(minimal.condition(), FollowUpCondition::NoResponse);
    }

    #[test]
    fn test_patched_merges_only_set_fields() {
        let item = FollowUpItem::new("a", "hello")
            .unwrap()
            .with_name("Intro")
            .with_delay_days(2);
        let patched = item.patched(&FollowUpPatch::default().message("updated"));
        assert_eq!(patched.message(), "updated");
        assert_eq!(patched.name(), Some("Intro"));
        assert_eq!(patched.delay_days(), 2);
        assert_eq!(patched.id(), "a");

        let cleared = item.patched(&FollowUpPatch::default().name(""));
        assert_eq!(cleared.name(), None);
    }

    #[test]
    fn test_generate_unique_ids() {
        let a = FollowUpItem::generate("x");
        let b = FollowUpItem::generate("x");
        assert_ne!(a.id(), b.id());
    }
}
