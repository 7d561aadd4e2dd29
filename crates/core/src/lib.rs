pub mod config;
pub mod error;
pub mod notifications;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use notifications::{Notification, Notifier};
pub use types::{FollowUpCondition, FollowUpItem, FollowUpPatch};
