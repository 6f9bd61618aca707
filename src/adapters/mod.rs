//! External system integrations for bpagen.
//!
//! - [`database`] - storage traits for the staging table and the address cache
//! - [`postgresql`] - PostgreSQL implementation of both
//! - [`memory`] - in-memory implementation, used for tests
//! - [`cep`] - HTTP postal-code providers
//!
//! ```rust,no_run
//! use bpagen::adapters::database::create_stores;
//! use bpagen::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bpagen.toml")?;
//! let (staging, _cache) = create_stores(&config).await?;
//! staging.test_connection().await?;
//! let records = staging.load_records().await?;
//! println!("{} staged rows", records.len());
//! # Ok(())
//! # }
//! ```

pub mod cep;
pub mod database;
pub mod memory;
pub mod postgresql;
