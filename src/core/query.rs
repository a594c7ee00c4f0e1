//! Query descriptions sent to a table store

use serde_json::{Map, Value};
use uuid::Uuid;

/// A single table row as exchanged with the remote store
pub type Row = Map<String, Value>;

/// Column holding the owner identity on every table
pub const OWNER_COLUMN: &str = "user_id";

/// A related table eagerly attached to each returned row
///
/// `clients(name)` on the `projects` table reads `projects.client_id`, looks up
/// the matching client and embeds `{"name": ...}` under the `clients` key, or
/// `null` when the reference is unset or dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embed {
    /// Related table name, also the key the embedded object lands under
    pub relation: &'static str,

    /// Column on the queried table referencing the related row's id
    pub foreign_key: &'static str,

    /// Columns of the related row to embed
    pub columns: &'static [&'static str],
}

impl Embed {
    pub const fn new(
        relation: &'static str,
        foreign_key: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            relation,
            foreign_key,
            columns,
        }
    }

    /// Render as a select fragment, e.g. `clients(name)`
    pub fn select_fragment(&self) -> String {
        format!("{}({})", self.relation, self.columns.join(","))
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Newest rows first
    #[default]
    CreatedDesc,
    /// Oldest rows first
    CreatedAsc,
}

impl Order {
    /// Render as an `order=` query value
    pub fn as_param(&self) -> &'static str {
        match self {
            Order::CreatedDesc => "created_at.desc",
            Order::CreatedAsc => "created_at.asc",
        }
    }
}

/// Read of every row a given identity owns in one table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: &'static str,
    pub owner: Uuid,
    pub embeds: &'static [Embed],
    pub order: Order,
}

impl SelectQuery {
    /// Select all owned rows, newest first
    pub fn owned(table: &'static str, owner: Uuid) -> Self {
        Self {
            table,
            owner,
            embeds: &[],
            order: Order::default(),
        }
    }

    /// Attach related tables
    pub fn with_embeds(mut self, embeds: &'static [Embed]) -> Self {
        self.embeds = embeds;
        self
    }

    /// Override the ordering
    pub fn ordered(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Render the column list, e.g. `*,clients(name),projects(name)`
    pub fn select_param(&self) -> String {
        select_param(self.embeds)
    }
}

/// Render the column list for a set of embeds
pub fn select_param(embeds: &[Embed]) -> String {
    let mut select = String::from("*");
    for embed in embeds {
        select.push(',');
        select.push_str(&embed.select_fragment());
    }
    select
}
