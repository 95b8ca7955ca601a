// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Storage-layer failures, and their mapping onto the shared error taxonomy.

use gateway_core::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => GatewayError::NotFound("resource not found".to_string()),
            StorageError::Conflict(detail) => GatewayError::Conflict(detail),
            StorageError::Database(source) => {
                tracing::error!(error = %source, "database error");
                GatewayError::Internal("database error".to_string())
            }
            StorageError::Migration(source) => {
                tracing::error!(error = %source, "migration error");
                GatewayError::Internal("migration error".to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
