//! Address Book Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;
use crate::domain::value_objects::{validate_phone, validate_pincode, AddressId, UserId};

pub const DEFAULT_COUNTRY: &str = "India";

/// Shipping profile. Copied by value into orders so later edits never alter past orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Address line 1 is required"))]
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(custom = "validate_pincode")]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String { DEFAULT_COUNTRY.to_string() }

impl ShippingAddress {
    /// Trims every field, drops an empty second line and fills in the default country.
    pub fn normalized(self) -> Self {
        let country = self.country.trim().to_string();
        Self {
            full_name: self.full_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self.address_line2.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            country: if country.is_empty() { default_country() } else { country },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub id: AddressId,
    #[serde(flatten)]
    pub address: ShippingAddress,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBook {
    pub user: UserId,
    pub addresses: Vec<SavedAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AddressBook {
    pub fn new(user: UserId) -> Self {
        let now = Utc::now();
        Self { user, addresses: vec![], created_at: now, updated_at: now }
    }

    /// Appends an address. A new default demotes every other address.
    pub fn add(&mut self, address: ShippingAddress, is_default: bool) -> &SavedAddress {
        if is_default {
            for saved in &mut self.addresses { saved.is_default = false; }
        }
        self.addresses.push(SavedAddress { id: AddressId::new(), address, is_default });
        self.updated_at = Utc::now();
        &self.addresses[self.addresses.len() - 1]
    }

    pub fn default_address(&self) -> Option<&SavedAddress> {
        self.addresses.iter().find(|a| a.is_default)
    }
}

/// Accepts a JSON boolean or the string forms that HTML forms submit.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag { Bool(bool), Text(String) }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Ok(true),
            "false" | "off" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}
