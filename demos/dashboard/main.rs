//! Dashboard demo against the in-memory store
//!
//! Run with `cargo run --example dashboard [config.yaml]`. Set `AGENCY_LOG`
//! to change the log filter.

use agency_sync::prelude::*;
use agency_sync::views::{PendingInvoice, RecentProject};
use anyhow::Result;
use chrono::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    config.init_tracing();

    let store = Arc::new(InMemoryTableStore::new());
    let auth = AuthContext::new();
    let workspace = Workspace::new(store, auth.clone()).with_recent_limit(config.recent_limit);

    let mut events = workspace.subscribe();
    let notices = tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            if let Some(notice) = Notice::from_event(&envelope.event) {
                println!("  [{}]", notice);
            }
        }
    });

    auth.sign_in(Identity::new(Uuid::new_v4()).with_email("owner@agency.example"));
    workspace.resync_all().await?;

    let today = Utc::now().date_naive();

    println!("Seeding workspace");
    let acme = workspace
        .clients()
        .add(
            NewClient::new("Acme Corp")
                .contact_name("Jane Doe")
                .email("jane@acme.example"),
        )
        .await?;
    workspace
        .clients()
        .add(NewClient::new("Beta Studio").status(ClientStatus::Inactive))
        .await?;

    let site = workspace
        .projects()
        .add(
            NewProject::new("Website relaunch")
                .client(acme.id)
                .status(ProjectStatus::InProgress)
                .budget(12_000.0)
                .progress(60)
                .due(today - Duration::days(2)),
        )
        .await?;
    workspace
        .projects()
        .add(NewProject::new("Brand refresh").progress(10))
        .await?;

    workspace
        .invoices()
        .add(
            NewInvoice::numbered(4_000.0)
                .client(acme.id)
                .project(site.id)
                .status(InvoiceStatus::Paid),
        )
        .await?;
    workspace
        .invoices()
        .add(
            NewInvoice::numbered(2_500.0)
                .client(acme.id)
                .status(InvoiceStatus::Pending)
                .due(today - Duration::days(1)),
        )
        .await?;

    if let Err(e) = workspace.projects().add(NewProject::new("  ")).await {
        println!("  rejected: {}", e);
    }

    workspace
        .projects()
        .update(site.id, ProjectPatch::status(ProjectStatus::Review))
        .await?;

    let dashboard = workspace.dashboard(today);
    print_dashboard(&dashboard);

    let stats = workspace.project_stats(today);
    println!(
        "\nProjects: {} total, {} in progress, {} completed, {} overdue",
        stats.total, stats.in_progress, stats.completed, stats.overdue
    );

    let invoices = workspace.invoices().items();
    let paid = InvoiceFilter::default().status("paid").apply(&invoices);
    println!("Paid invoices: {}", paid.len());

    println!("\nSigning out");
    auth.sign_out();
    workspace.resync_all().await?;
    println!("Clients after sign-out: {}", workspace.clients().len());

    notices.abort();
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let stats = &dashboard.stats;
    println!("\nDashboard");
    println!("  clients:          {}", stats.total_clients);
    println!("  active projects:  {}", stats.active_projects);
    println!("  pending invoices: {}", stats.pending_invoices);
    println!("  revenue:          {:.2}", stats.total_revenue);

    println!("Recent projects");
    for RecentProject {
        name,
        client,
        status,
        progress,
        ..
    } in &dashboard.recent_projects
    {
        println!("  {} ({}) {} {}%", name, client, status, progress);
    }

    println!("Pending invoices");
    for PendingInvoice {
        client,
        amount,
        overdue,
        ..
    } in &dashboard.pending_invoices
    {
        let flag = if *overdue { " OVERDUE" } else { "" };
        println!("  {} {:.2}{}", client, amount, flag);
    }
}
