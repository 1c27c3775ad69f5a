use sqlx::migrate::Migrator;

/// Embedded schema migrations, run once at startup.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
