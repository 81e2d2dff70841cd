//! Loads job vacancies for a fixed set of employers from the hh.ru API into
//! PostgreSQL and reports on them.
//!
//! - [`source`] talks to the provider: employer lookup and vacancy pages.
//! - [`store`] owns the database lifecycle and the write path.
//! - [`query`] runs the read-only reports over a loaded database.
//! - [`runner`] wires source and store into a single load.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod report;
pub mod runner;
pub mod source;
pub mod store;
pub mod telemetry;

pub use error::AppError;
