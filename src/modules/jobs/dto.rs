use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Query string of a job submission. Both fields are optional at the
/// type level so a missing one is reported as a 400 rather than a rejection.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProcessQuery {
    /// Target color as RRGGBB hex, e.g. `FF0000`
    #[validate(custom(function = "validate_target_color"))]
    pub target_color: Option<String>,
    /// Non-negative integer color distance threshold
    #[validate(custom(function = "validate_threshold"))]
    pub threshold: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitJobResponse {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
}

pub fn normalize_color(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix('#').unwrap_or(value)
}

fn validate_target_color(value: &str) -> Result<(), ValidationError> {
    let hex = normalize_color(value);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("target_color")
            .with_message("targetColor must be a hex color in RRGGBB format".into()))
    }
}

fn validate_threshold(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("threshold")
            .with_message("threshold must be a non-negative integer".into())),
    }
}
