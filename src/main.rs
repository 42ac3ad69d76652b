use capex_flow::{
    config::{database, seed},
    core::{
        evaluation::evaluation_report,
        realization::{
            CategoryAttribution, Snapshot, category_year_summary, dashboard_metrics,
            realization_report, top_projects,
        },
        report,
    },
    errors::Result,
};
use chrono::{Datelike, Local};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Connected to {}", database::get_database_url()))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 4. Seed the store
    let seed_path = seed::get_seed_path();
    let seed_data = seed::load_seed(&seed_path)
        .inspect_err(|e| error!("Failed to load seed data from {}: {}", seed_path, e))?;
    seed::seed_if_empty(&db, &seed_data).await?;

    // 5. Report
    let snapshot = Snapshot::load(&db).await?;
    let metrics = dashboard_metrics(&snapshot);
    info!(
        "{} budget plan(s), {} purchase request(s), {} project(s)",
        snapshot.budgets.len(),
        snapshot.purchase_requests.len(),
        snapshot.projects.len()
    );

    let year = Local::now().year();
    let categories = category_year_summary(&snapshot, year, CategoryAttribution::default());

    println!("== Dashboard (fiscal year {year}) ==");
    print!("{}", report::format_dashboard(&metrics, &categories));
    for project in top_projects(&snapshot, 5) {
        println!(
            "  {} {} {}",
            project.code,
            project.name,
            report::format_idr_compact(project.budget_allocation.unwrap_or(0.0))
        );
    }

    println!("\n== Realization ==");
    print!("{}", report::format_realization_report(&realization_report(&snapshot)));

    println!("\n== Evaluation ==");
    print!("{}", report::format_evaluation(&evaluation_report(&snapshot)));

    Ok(())
}
