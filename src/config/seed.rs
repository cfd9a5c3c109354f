//! Reference data seeding from `config.toml`.
//!
//! The seed file lists the cities served and the leaflet templates with their starting
//! stock. Seeding only inserts names that are missing, so it runs on every start.

use crate::{
    core::{city, leaflet},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

const SEED_USER: &str = "system";

/// Contents of the seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub leaflets: Vec<LeafletSeed>,
}

/// One leaflet template to seed.
#[derive(Debug, Clone, Deserialize)]
pub struct LeafletSeed {
    pub name: String,
    #[serde(default)]
    pub stock: i64,
}

/// Loads the seed file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Counts of rows inserted by [`apply_seed`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub cities: usize,
    pub leaflets: usize,
}

/// Inserts every seeded city and leaflet whose name is not in the database yet.
pub async fn apply_seed(db: &DatabaseConnection, seed: &SeedConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for name in &seed.cities {
        if city::get_city_by_name(db, name.trim()).await?.is_none() {
            city::create_city(db, name.clone(), SEED_USER).await?;
            report.cities += 1;
        }
    }

    for entry in &seed.leaflets {
        if leaflet::get_leaflet_by_name(db, entry.name.trim()).await?.is_none() {
            leaflet::create_leaflet(db, entry.name.clone(), entry.stock, SEED_USER).await?;
            report.leaflets += 1;
        }
    }

    info!(
        "Seeded {} cities and {} leaflets",
        report.cities, report.leaflets
    );
    Ok(report)
}

/// Loads and applies the seed file if it exists.
pub async fn seed_from_file(db: &DatabaseConnection, path: &Path) -> Result<()> {
    if !path.exists() {
        warn!("Seed file {} not found, skipping", path.display());
        return Ok(());
    }
    let seed = load_seed(path)?;
    apply_seed(db, &seed).await?;
    Ok(())
}
