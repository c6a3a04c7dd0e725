//! Database configuration module for Kosmo.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! Creation uses `IF NOT EXISTS` and is safe to run on every startup.

use crate::entities::{CountingData, CountingSettings, HaikuSettings};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/kosmo.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
///
/// `SQLite` creates the database file itself but not its directory, so that is created
/// here first.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");

    if let Some(parent) = sqlite_file_directory(&database_url) {
        std::fs::create_dir_all(parent)?;
    }

    Database::connect(&database_url).await.map_err(Into::into)
}

fn sqlite_file_directory(database_url: &str) -> Option<&Path> {
    let location = database_url.strip_prefix("sqlite://")?;
    let file = location.split('?').next().unwrap_or(location);
    Path::new(file)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Creates every table the bot needs if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, CountingSettings).await?;
    create_table(db, &schema, CountingData).await?;
    create_table(db, &schema, HaikuSettings).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}
