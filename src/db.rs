use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use crate::error::AppError;

/// Administrative database used to drop and create the vacancy database.
pub const ADMIN_DATABASE: &str = "postgres";

/// Longest identifier PostgreSQL keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Server coordinates shared by the store and the query service.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl DbSettings {
    pub fn connect_options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(database)
    }

    /// Open a single, unpooled connection to `database`.
    pub async fn connect(&self, database: &str) -> Result<PgConnection, AppError> {
        let conn = PgConnection::connect_with(&self.connect_options(database)).await?;
        Ok(conn)
    }
}

/// Validate a database name and return it double-quoted for use in DDL.
pub fn quoted_identifier(name: &str) -> Result<String, AppError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidArgument(format!(
            "'{name}' is not a valid database name"
        )));
    }
    Ok(format!("\"{name}\""))
}
