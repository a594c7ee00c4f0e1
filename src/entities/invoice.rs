//! Invoice records

use crate::core::entity::Data;
use crate::core::field::FieldValue;
use crate::core::query::Embed;
use crate::entities::RelatedName;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

label_enum!(
    /// Billing state of an invoice
    InvoiceStatus {
        Draft => "Draft",
        Pending => "Pending",
        Paid => "Paid",
        Overdue => "Overdue",
    }
);

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl InvoiceStatus {
    /// Paid invoices are never overdue
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

/// Related tables embedded on every invoice read
pub const INVOICE_EMBEDS: &[Embed] = &[
    Embed::new("clients", "client_id", &["name"]),
    Embed::new("projects", "project_id", &["name"]),
];

/// Human-facing invoice numbers
pub struct InvoiceNumber;

impl InvoiceNumber {
    /// `INV-` followed by the last six digits of the epoch milliseconds
    ///
    /// Two numbers generated within the same millisecond, or exactly
    /// 10^6 ms apart, collide; nothing downstream enforces uniqueness.
    pub fn generate(now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().rem_euclid(1_000_000);
        format!("INV-{:06}", millis)
    }
}

/// A bill sent to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_number: String,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Embedded `clients(name)`
    #[serde(rename = "clients", default, skip_serializing_if = "Option::is_none")]
    pub client: Option<RelatedName>,

    /// Embedded `projects(name)`
    #[serde(rename = "projects", default, skip_serializing_if = "Option::is_none")]
    pub project: Option<RelatedName>,
}

impl Invoice {
    /// Status as displayed; an unset status reads as Draft
    pub fn effective_status(&self) -> InvoiceStatus {
        self.status.clone().unwrap_or_default()
    }

    pub fn has_status(&self, status: &InvoiceStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.name.as_str())
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Past its due date and not paid
    ///
    /// Derived from the due date alone; the stored `Overdue` label is not
    /// consulted. Like projects, an invoice is overdue on its due day.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due <= today && !self.effective_status().is_terminal(),
            None => false,
        }
    }
}

fn finite_non_negative(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("amount"))
    }
}

/// Fields for a new invoice
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewInvoice {
    #[validate(custom(function = "crate::entities::not_blank"))]
    pub invoice_number: String,
    #[validate(custom(function = "finite_non_negative"))]
    pub amount: f64,
    pub status: InvoiceStatus,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl NewInvoice {
    /// A draft invoice issued today
    pub fn new(invoice_number: impl Into<String>, amount: f64) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            amount,
            status: InvoiceStatus::Draft,
            client_id: None,
            project_id: None,
            issue_date: Some(Utc::now().date_naive()),
            due_date: None,
        }
    }

    /// A draft invoice with a generated number
    pub fn numbered(amount: f64) -> Self {
        Self::new(InvoiceNumber::generate(Utc::now()), amount)
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn issued(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = Some(issue_date);
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update of an invoice
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<InvoiceStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl InvoicePatch {
    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(Some(status)),
            ..Default::default()
        }
    }
}

crate::impl_entity!(
    Invoice,
    table: "invoices",
    singular: "invoice",
    draft: NewInvoice,
    patch: InvoicePatch {
        invoice_number,
        amount,
        status,
        client_id,
        project_id,
        issue_date,
        due_date,
    },
    embeds: INVOICE_EMBEDS,
);

impl Data for Invoice {
    fn name(&self) -> &str {
        &self.invoice_number
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["client_name", "invoice_number", "project_name"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "invoice_number" => Some(FieldValue::String(self.invoice_number.clone())),
            "amount" => Some(FieldValue::Float(self.amount)),
            "status" => Some(FieldValue::String(self.effective_status().label().to_string())),
            "client_id" => Some(self.client_id.map_or(FieldValue::Null, FieldValue::Uuid)),
            "project_id" => Some(self.project_id.map_or(FieldValue::Null, FieldValue::Uuid)),
            "client_name" => Some(FieldValue::from_optional_str(self.client_name())),
            "project_name" => Some(FieldValue::from_optional_str(self.project_name())),
            "issue_date" => Some(self.issue_date.map_or(FieldValue::Null, FieldValue::Date)),
            "due_date" => Some(self.due_date.map_or(FieldValue::Null, FieldValue::Date)),
            "created_at" => Some(FieldValue::DateTime(self.created_at)),
            _ => None,
        }
    }
}
