use serde::Deserialize;

use crate::error::CampaignResult;

/// Root application configuration. Loaded from an optional
/// `campaign-express.toml` and environment variables with the prefix
/// `CAMPAIGN_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sequencing: SequencingConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

// ─── Sequencing Config ──────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct SequencingConfig {
    /// Days between consecutive follow-ups when delays are renumbered.
    #[serde(default = "default_spacing_days")]
    pub spacing_days: u32,
    /// Keep authored delays across moves instead of renumbering them.
    #[serde(default)]
    pub preserve_custom_delays: bool,
    #[serde(default = "default_initial_label")]
    pub initial_label: String,
    #[serde(default = "default_follow_up_label_prefix")]
    pub follow_up_label_prefix: String,
}

fn default_spacing_days() -> u32 { 3 }
fn default_initial_label() -> String { "Initial Message".to_string() }
fn default_follow_up_label_prefix() -> String { "Follow-up #".to_string() }

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            spacing_days: default_spacing_days(),
            preserve_custom_delays: false,
            initial_label: default_initial_label(),
            follow_up_label_prefix: default_follow_up_label_prefix(),
        }
    }
}

// ─── Notification Config ────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

fn default_notifications_enabled() -> bool { true }

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sequencing: SequencingConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment.
    pub fn load() -> CampaignResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("campaign-express").required(false))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_EXPRESS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
