// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic abstraction to access different database systems.
//!
//! The facilities in this module provide an abstraction over different database systems such as
//! PostgreSQL and SQLite.  The PostgreSQL backend is for production use and the SQLite backend is
//! primarily intended to support unit tests.
//!
//! Services implement their persistence layer as free functions that take an `&mut Executor` and
//! match on its variants to issue the backend-specific queries.  The same function can then be
//! used against a pooled connection (via `Db::ex`) or against an open transaction (via
//! `Db::begin` and `TxExecutor::ex`).

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Converts a row count as returned by `COUNT(*)` into a `usize`.
pub fn count_as_usize(count: i64) -> DbResult<usize> {
    usize::try_from(count)
        .map_err(|e| DbError::DataIntegrityError(format!("Invalid count {}: {}", count, e)))
}

/// Ensures that an insertion or update touched exactly one row.
pub fn ensure_one_upsert(rows_affected: u64) -> DbResult<()> {
    match rows_affected {
        1 => Ok(()),
        0 => Err(DbError::BackendError("Upsert did not affect any row".to_owned())),
        n => Err(DbError::BackendError(format!("Upsert affected {} rows instead of one", n))),
    }
}

/// A database executor that can talk to multiple database implementations.
///
/// This type provides a generic mechanism to access a typed instance of a database, which is needed
/// by sqlx to offer type safety guarantees during query compilation.  Users of this type are forced
/// to destructure it and issue different calls for each database.
///
/// Note that this can wrap an executor that talks directly to a pool or to an open transaction.
pub enum Executor {
    /// A PostgreSQL executor that can be used in `sqlx` operations.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// A SQLite executor that can be used in `sqlx` operations.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// A wrapper for a database executor backed by an open transaction.
pub struct TxExecutor(Executor);

impl TxExecutor {
    /// Returns the executor wrapped by this transaction.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    pub fn ex(&mut self) -> &mut Executor {
        &mut self.0
    }

    /// Commits the transaction.
    pub async fn commit(self) -> DbResult<()> {
        match self.0 {
            #[cfg(feature = "postgres")]
            Executor::Postgres(e) => e.commit().await,

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(e) => e.commit().await,
        }
    }
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor for direct access to the pool.
    ///
    /// The executor holds a connection checked out of the pool, which is returned to the pool
    /// once the executor is dropped.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Begins a transaction.
    ///
    /// It is the responsibility of the caller to call `commit` on the returned executor.  Otherwise
    /// the transaction is rolled back on drop.
    async fn begin(&self) -> DbResult<TxExecutor>;

    /// Closes the connection pool, waiting for any checked out connections to be returned.
    async fn close(&self);
}

/// Macros to help instantiate tests for multiple database systems.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Instantiates the `module::name` test for the database configured by `setup`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Instantiates a collection of tests for a specific database system.
    ///
    /// The database implementation to run the tests against is determined by the `setup`
    /// expression, which needs to return a database object.  The returned database should also
    /// have been initialized with the desired schema.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_as_usize() {
        assert_eq!(Ok(0), count_as_usize(0));
        assert_eq!(Ok(123), count_as_usize(123));
        match count_as_usize(-1) {
            Err(DbError::DataIntegrityError(msg)) => assert!(msg.contains("Invalid count -1")),
            e => panic!("Unexpected result: {:?}", e),
        }
    }

    #[test]
    fn test_ensure_one_upsert() {
        assert_eq!(Ok(()), ensure_one_upsert(1));
        match ensure_one_upsert(0) {
            Err(DbError::BackendError(msg)) => assert!(msg.contains("did not affect")),
            e => panic!("Unexpected result: {:?}", e),
        }
        match ensure_one_upsert(2) {
            Err(DbError::BackendError(msg)) => assert!(msg.contains("2 rows")),
            e => panic!("Unexpected result: {:?}", e),
        }
    }
}

#[cfg(all(test, any(feature = "postgres", feature = "sqlite")))]
pub(crate) mod backend_tests {
    use super::*;
    use sqlx::Row;
    use std::sync::Arc;

    /// Runs a `query` on `ex` and does not care about its results.  The `query` must be valid for
    /// all possible database implementations.
    async fn exec(ex: &mut Executor, query: &str) {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                let _result = sqlx::query(query).execute(ex).await.unwrap();
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                let _result = sqlx::query(query).execute(ex).await.unwrap();
            }
        }
    }

    /// Runs a `query` on `ex` that fetches a single row with an `i64` value on `column` and returns
    /// that value.  The `query` must be valid for all possible database implementations.
    async fn query_i64(ex: &mut Executor, column: &str, query: &str) -> i64 {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                let row = sqlx::query(query).fetch_one(ex).await.unwrap();
                row.try_get(column).unwrap()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                let row = sqlx::query(query).fetch_one(ex).await.unwrap();
                row.try_get(column).unwrap()
            }
        }
    }

    pub(crate) async fn test_direct_execution(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;
        exec(&mut db.ex().await.unwrap(), "INSERT INTO test (i) VALUES (3)").await;
        assert_eq!(
            1,
            query_i64(&mut db.ex().await.unwrap(), "count", "SELECT COUNT(*) AS count FROM test")
                .await
        );
    }

    pub(crate) async fn test_tx_commit(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;

        let mut tx = db.begin().await.unwrap();
        exec(tx.ex(), "INSERT INTO test (i) VALUES (3)").await;
        tx.commit().await.unwrap();

        assert_eq!(
            1,
            query_i64(&mut db.ex().await.unwrap(), "count", "SELECT COUNT(*) AS count FROM test")
                .await
        );
    }

    pub(crate) async fn test_tx_rollback_on_drop(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;

        {
            let mut tx = db.begin().await.unwrap();
            exec(tx.ex(), "INSERT INTO test (i) VALUES (3)").await;
        }

        assert_eq!(
            0,
            query_i64(&mut db.ex().await.unwrap(), "count", "SELECT COUNT(*) AS count FROM test")
                .await
        );
    }

    pub(crate) async fn test_multiple_txs(db: Arc<dyn Db + Send + Sync>) {
        let tx1 = db.begin().await.unwrap();
        let tx2 = db.begin().await.unwrap();
        tx1.commit().await.unwrap();
        tx2.commit().await.unwrap();
    }

    pub(crate) async fn test_begin_tx_after_drop(db: Arc<dyn Db + Send + Sync>) {
        let tx1 = db.clone().begin().await.unwrap();
        tx1.commit().await.unwrap();

        let tx2 = db.begin().await.unwrap();
        tx2.commit().await.unwrap();
    }

    /// Instantiates tests that need concurrent access to the database.  These tests cannot write
    /// to the database.
    macro_rules! generate_db_ro_concurrent_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::backend_tests,
                test_multiple_txs,
                test_begin_tx_after_drop
            );
        }
    ];

    pub(crate) use generate_db_ro_concurrent_tests;

    /// Instantiates tests that need write access to the test database.
    macro_rules! generate_db_rw_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::backend_tests,
                test_direct_execution,
                test_tx_commit,
                test_tx_rollback_on_drop
            );
        }
    ];

    pub(crate) use generate_db_rw_tests;
}
