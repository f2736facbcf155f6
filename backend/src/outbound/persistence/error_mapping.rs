//! Shared Diesel error mapping for stores with basic query semantics.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a store-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Captures the mapping repeated across stores where `NotFound` and
/// query-builder failures should surface as query errors.
pub(crate) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_map_to_connection_variants() {
        let mapped = map_pool_error(PoolError::checkout("pool drained"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("pool drained".to_owned()));
    }

    #[rstest]
    fn not_found_maps_to_a_query_error() {
        let mapped = map_diesel_error(diesel::result::Error::NotFound, Mapped::Query, |m| {
            Mapped::Connection(m.to_owned())
        });
        assert_eq!(mapped, Mapped::Query("record not found"));
    }
}
