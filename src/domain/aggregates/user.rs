//! User Profile Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Subject of the external identity provider.
    pub auth0_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Missing fields deserialize as empty so they surface as validation errors.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "Name must be string"))]
    pub name: String,
    #[validate(length(min = 1, message = "Number must be string"))]
    pub number: String,
    #[validate(length(min = 1, message = "AddressLine1 must be string"))]
    pub address_line1: String,
    #[validate(length(min = 1, message = "City must be string"))]
    pub city: String,
    #[validate(length(min = 1, message = "country must be string"))]
    pub country: String,
}

impl User {
    pub fn register(auth0_id: impl Into<String>, email: impl Into<String>, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(), auth0_id: auth0_id.into(), email: email.into(), profile_image_url: None,
            name, number: None, address_line1: None, city: None, country: None, created_at: now, updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        self.name = Some(update.name);
        self.number = Some(update.number);
        self.address_line1 = Some(update.address_line1);
        self.city = Some(update.city);
        self.country = Some(update.country);
        self.updated_at = Utc::now();
    }
}
