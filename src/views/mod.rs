//! Presentation-side derivations over the synced collections

pub mod dashboard;
pub mod filter;
pub mod notice;
pub mod workspace;

pub use dashboard::{
    ClientStats, Dashboard, DashboardStats, InvoiceStats, PendingInvoice, ProjectStats,
    RecentProject,
};
pub use filter::{ALL_STATUSES, ClientFilter, InvoiceFilter, ProjectFilter, RecordFilter};
pub use notice::{Notice, NoticeLevel};
pub use workspace::Workspace;
