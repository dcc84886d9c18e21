// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::Settings;

/// Loads the service configuration from the process environment.
///
/// This function is the primary entry point for this crate. It reads the
/// recognized `DB_*` variables (or a single `DATABASE_URL`), deserializes them
/// into our strongly-typed `Settings` struct, and validates that the mandatory
/// connection parameters are present. A service with an incomplete
/// configuration must fail here, before it ever accepts traffic.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::Environment::default())
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;

    // Fail fast on missing host/password rather than at first query.
    settings.connection_url()?;

    Ok(settings)
}
