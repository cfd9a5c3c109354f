/// Database connection and schema creation
pub mod database;

/// Reference data seeding from config.toml
pub mod seed;

/// Environment-driven settings for the server and the bot
pub mod settings;
