use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("{what} not found")]
    NotFound { what: String },
}

impl CatalogError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CatalogError::NotFound { what: what.into() }
    }

    /// Archiving an anomaly that is not active reports `NotFound`; callers
    /// treating recovery as idempotent check for it with this.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}
