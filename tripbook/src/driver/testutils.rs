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

//! Test utilities for the business layer.

use crate::db::{self, init_schema};
use crate::driver::Driver;
use crate::model::{ClientId, TripId};
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;
use tripbook_core::clocks::testutils::SettableClock;
use tripbook_core::db::{Db, Executor};

/// Instant the clock of every test context starts at.
pub(crate) const TEST_NOW: OffsetDateTime = datetime!(2024-05-17 10:30:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<SettableClock>,
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver backed by an in-memory database and a fake clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(tripbook_core::db::sqlite::testutils::setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(TEST_NOW));
        let driver = Driver::new(db.clone(), clock.clone());
        Self { db, clock, driver }
    }

    /// Obtains a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Obtains the fake clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Obtains a new driver for one operation.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Creates a trip that can accept up to `max_people` registrations.
    pub(crate) async fn put_trip(&self, name: &str, max_people: u32) -> TripId {
        db::put_trip(
            &mut self.ex().await,
            name,
            datetime!(2024-07-01 08:00:00 UTC),
            datetime!(2024-07-08 18:30:00 UTC),
            max_people,
        )
        .await
        .unwrap()
    }

    /// Creates a client whose details derive from `first` and `last`.
    pub(crate) async fn put_client(&self, first: &str, last: &str) -> ClientId {
        let details = crate::model::testutils::client_details(first, last);
        *db::create_client(&mut self.ex().await, details).await.unwrap().id()
    }
}
