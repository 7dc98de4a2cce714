use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use sqlx::error::ErrorKind;

use crate::config::AppConfig;
use crate::error::AppError;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Maps an INSERT failure onto the error taxonomy. A UNIQUE hit becomes a
/// conflict carrying `conflict`; a missing owning user (FOREIGN KEY hit,
/// e.g. the account was removed after the token was issued) becomes an auth
/// failure. Anything else stays a database error.
pub(crate) fn map_write_error(err: sqlx::Error, conflict: &str) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db_err) => Some(db_err.kind()),
        _ => None,
    };
    match kind {
        Some(ErrorKind::UniqueViolation) => AppError::conflict(conflict),
        Some(ErrorKind::ForeignKeyViolation) => AppError::auth("User no longer exists"),
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;
    use std::fmt;

    use axum::http::StatusCode;
    use sqlx::error::DatabaseError;

    use super::*;

    #[derive(Debug)]
    struct PgFailure(ErrorKind);

    impl fmt::Display for PgFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint failed: {:?}", self.0)
        }
    }

    impl StdError for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "constraint failed"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn failure(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgFailure(kind)))
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = map_write_error(failure(ErrorKind::UniqueViolation), "taken");
        assert!(matches!(&err, AppError::Conflict(m) if m == "taken"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_owner_is_unauthorized_not_500() {
        let err = map_write_error(failure(ErrorKind::ForeignKeyViolation), "taken");
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err = map_write_error(failure(ErrorKind::Other), "taken");
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = map_write_error(sqlx::Error::RowNotFound, "taken");
        assert!(matches!(err, AppError::Database(_)));
    }
}
