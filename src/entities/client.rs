//! Client records

use crate::core::entity::Data;
use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

label_enum!(
    /// Relationship status of a client; free-form beyond the known labels
    ClientStatus {
        Active => "Active",
        Inactive => "Inactive",
    }
);

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Active
    }
}

/// A client of the agency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<ClientStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Status as displayed; an unset status reads as Active
    pub fn effective_status(&self) -> ClientStatus {
        self.status.clone().unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(ClientStatus::Active)
    }
}

/// Fields for a new client
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewClient {
    #[validate(custom(function = "crate::entities::not_blank"))]
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: ClientStatus,
}

impl NewClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_name: None,
            email: None,
            phone: None,
            status: ClientStatus::Active,
        }
    }

    pub fn contact_name(mut self, contact_name: impl Into<String>) -> Self {
        self.contact_name = Some(contact_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update of a client
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<ClientStatus>>,
}

crate::impl_entity!(
    Client,
    table: "clients",
    singular: "client",
    draft: NewClient,
    patch: ClientPatch { name, contact_name, email, phone, status },
);

impl Data for Client {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["name", "contact_name"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "contact_name" => Some(FieldValue::from_optional_str(self.contact_name.as_deref())),
            "email" => Some(FieldValue::from_optional_str(self.email.as_deref())),
            "phone" => Some(FieldValue::from_optional_str(self.phone.as_deref())),
            "status" => Some(FieldValue::String(self.effective_status().label().to_string())),
            "created_at" => Some(FieldValue::DateTime(self.created_at)),
            _ => None,
        }
    }
}
