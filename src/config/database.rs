//! Database connection and schema creation.
//!
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation is idempotent.

use crate::entities::{
    City, Distributor, Document, Goal, Leaflet, LeafletOrder, Log, Order, RefreshToken, User,
    Worker,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/leaflet_admin.sqlite?mode=rwc";

/// Connects to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(path) = database_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        .map(std::path::Path::new)
        .and_then(std::path::Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(path).await?;
    }

    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    db.execute(builder.build(statement.if_not_exists())).await?;
    Ok(())
}

/// Creates every table that does not exist yet. Referenced tables come first.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, RefreshToken).await?;
    create_table(db, &schema, City).await?;
    create_table(db, &schema, Leaflet).await?;
    create_table(db, &schema, Distributor).await?;
    create_table(db, &schema, Worker).await?;
    create_table(db, &schema, LeafletOrder).await?;
    create_table(db, &schema, Document).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, Goal).await?;
    create_table(db, &schema, Log).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist and are queryable
        let _ = Leaflet::find().limit(1).all(&db).await?;
        let _ = LeafletOrder::find().limit(1).all(&db).await?;
        let _ = Order::find().limit(1).all(&db).await?;
        let _ = Log::find().limit(1).all(&db).await?;
        let _ = RefreshToken::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
