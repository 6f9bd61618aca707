//! PostgreSQL integration
//!
//! Staging table `tb_bpa` plus the local address tables `correios_ceps`
//! and `tb_ibge`. The schema lives in `migrations/001_initial_schema.sql`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
