use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Follow-up validation error: {0}")]
    Validation(String),

    #[error("Workflow error: {0}")]
    Workflow(String),
}
