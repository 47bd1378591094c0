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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::testutils::client_details;
use crate::model::{ClientId, ClientTrip, TripId};
use crate::rest::app;
use axum::Router;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;
use tripbook_core::clocks::testutils::SettableClock;
use tripbook_core::db::{Db, Executor};

/// Instant the clock of every test context is frozen at.
pub(crate) const TEST_NOW: OffsetDateTime = datetime!(2024-05-17 10:30:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    /// Initializes the app backed by an in-memory database and a frozen clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(tripbook_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(TEST_NOW));
        let driver = Driver::new(db.clone(), clock);
        let app = app(driver);
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    pub(crate) async fn put_client(&self, first: &str, last: &str) -> ClientId {
        *db::create_client(&mut self.ex().await, client_details(first, last)).await.unwrap().id()
    }

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

    pub(crate) async fn put_trip_country(&self, trip_id: TripId, name: &str) {
        db::put_trip_country(&mut self.ex().await, trip_id, name).await.unwrap()
    }

    pub(crate) async fn register(&self, client_id: ClientId, trip_id: TripId) {
        let day = crate::model::Day::from(TEST_NOW.date());
        db::put_registration(&mut self.ex().await, client_id, trip_id, day).await.unwrap()
    }

    pub(crate) async fn is_registered(&self, client_id: ClientId, trip_id: TripId) -> bool {
        db::registration_exists(&mut self.ex().await, client_id, trip_id).await.unwrap()
    }

    pub(crate) async fn count_registrations(&self, trip_id: TripId) -> usize {
        db::count_registrations(&mut self.ex().await, trip_id).await.unwrap()
    }

    pub(crate) async fn get_client_trips(&self, client_id: ClientId) -> Vec<ClientTrip> {
        db::get_client_trips(&mut self.ex().await, client_id).await.unwrap()
    }

    pub(crate) async fn client_exists(&self, client_id: ClientId) -> bool {
        db::client_exists(&mut self.ex().await, client_id).await.unwrap()
    }
}
