//! Project records

use crate::core::entity::Data;
use crate::core::field::FieldValue;
use crate::core::query::Embed;
use crate::entities::RelatedName;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

label_enum!(
    /// Delivery stage of a project
    ProjectStatus {
        Planning => "Planning",
        InProgress => "In Progress",
        Review => "Review",
        Completed => "Completed",
        OnHold => "On Hold",
    }
);

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

impl ProjectStatus {
    /// Completed projects are never overdue
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed)
    }
}

/// Related tables embedded on every project read
pub const PROJECT_EMBEDS: &[Embed] = &[Embed::new("clients", "client_id", &["name"])];

/// A piece of client work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spent: Option<f64>,
    #[serde(default)]
    pub progress: Option<i32>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Embedded `clients(name)`; stale after a `client_id` change until refetched
    #[serde(rename = "clients", default, skip_serializing_if = "Option::is_none")]
    pub client: Option<RelatedName>,
}

impl Project {
    /// Status as displayed; an unset status reads as Planning
    pub fn effective_status(&self) -> ProjectStatus {
        self.status.clone().unwrap_or_default()
    }

    /// Embedded client name, if the project references a client
    pub fn client_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.name.as_str())
    }

    /// Past its due date and not completed
    ///
    /// A due date means midnight UTC at the start of that day, so a project
    /// is overdue from the first moment of its due day. `today` is the
    /// current UTC date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due <= today && !self.effective_status().is_terminal(),
            None => false,
        }
    }
}

/// Fields for a new project
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewProject {
    #[validate(custom(function = "crate::entities::not_blank"))]
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub client_id: Option<Uuid>,
    pub budget: Option<f64>,
    pub spent: f64,
    #[validate(range(min = 0, max = 100))]
    pub progress: i32,
    pub due_date: Option<NaiveDate>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: ProjectStatus::Planning,
            client_id: None,
            budget: None,
            spent: 0.0,
            progress: 0,
            due_date: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn progress(mut self, progress: i32) -> Self {
        self.progress = progress;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update of a project
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<ProjectStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl ProjectPatch {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(Some(status)),
            ..Default::default()
        }
    }
}

crate::impl_entity!(
    Project,
    table: "projects",
    singular: "project",
    draft: NewProject,
    patch: ProjectPatch {
        name,
        description,
        status,
        client_id,
        budget,
        spent,
        progress,
        due_date,
    },
    embeds: PROJECT_EMBEDS,
);

impl Data for Project {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["name", "client_name"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "description" => Some(FieldValue::from_optional_str(self.description.as_deref())),
            "status" => Some(FieldValue::String(self.effective_status().label().to_string())),
            "client_id" => Some(self.client_id.map_or(FieldValue::Null, FieldValue::Uuid)),
            "client_name" => Some(FieldValue::from_optional_str(self.client_name())),
            "budget" => Some(self.budget.map_or(FieldValue::Null, FieldValue::Float)),
            "spent" => Some(FieldValue::Float(self.spent.unwrap_or(0.0))),
            "progress" => Some(FieldValue::Integer(i64::from(self.progress.unwrap_or(0)))),
            "due_date" => Some(self.due_date.map_or(FieldValue::Null, FieldValue::Date)),
            "created_at" => Some(FieldValue::DateTime(self.created_at)),
            _ => None,
        }
    }
}
