mod config;
mod database;
mod models;
mod pipeline;
mod seeds;
mod tasks;
mod utils;

use config::AppConfig;
use dotenv::dotenv;
use tasks::Task;
use utils::AppError;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = run().await {
        log::error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    log::info!("🚀 Starting catalog runner...");
    log::info!("📊 Database: {}", config.database.name);

    // Connection failures abort before any operation runs
    let db = database::MongoDB::connect(&config.database).await?;

    if config.seed_sample_data {
        log::info!("🌱 Seeding sample data...");
        match seeds::sample_data_seed::seed_sample_data(&db).await {
            Ok(summary) => log::info!(
                "✅ Seed finished: {} users, {} students inserted",
                summary.users,
                summary.students
            ),
            Err(e) => log::error!("❌ Seed failed: {}", e),
        }
    }

    if config.run_users_overview {
        match tasks::users::users_overview(&db).await {
            Ok(overview) => {
                log::info!(
                    "👥 Users overview: {} users, first = {:?}",
                    overview.all_users.len(),
                    overview.first_user.as_ref().and_then(|u| u.get_str("firstName").ok())
                );
                match serde_json::to_string(&overview) {
                    Ok(json) => log::debug!("   overview: {}", json),
                    Err(e) => log::debug!("   overview not serializable: {}", e),
                }
            }
            Err(e) => log::error!("❌ usersOverview: {}", e),
        }
    }

    let report = tasks::run_catalog(&db, &Task::ALL).await;

    log::info!(
        "🏁 Run {} (started {}) done against {}",
        report.run_id,
        report.started_at.to_rfc3339(),
        db.database().name()
    );

    db.close().await;

    Ok(())
}
