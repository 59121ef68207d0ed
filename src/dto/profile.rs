use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::ProfileRecord, dto::validation::validate_username};

/// Payload creating or replacing a display profile.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpsertProfileRequest {
    /// Public display name.
    #[validate(custom(function = validate_username))]
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Public projection of a stored profile.
pub struct ProfileSummary {
    /// Identity the profile describes.
    pub id: Uuid,
    /// Public display name.
    pub username: String,
}

impl From<ProfileRecord> for ProfileSummary {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
        }
    }
}
