#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl AppError {
    /// True when the database server rejected a statement because the named
    /// database does not exist (SQLSTATE 3D000).
    pub fn is_missing_database(&self) -> bool {
        if let AppError::StoreUnavailable(sqlx::Error::Database(db_err)) = self
            && db_err.code().as_deref() == Some("3D000")
        {
            return true;
        }
        false
    }
}
