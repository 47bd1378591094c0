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

//! Operations on clients.

use crate::db;
use crate::driver::Driver;
use crate::model::{Client, ClientDetails, ClientId, ClientTrip};
use log::info;
use tripbook_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Creates a new client with the given `details`.
    pub(crate) async fn create_client(self, details: ClientDetails) -> DriverResult<Client> {
        let client = db::create_client(&mut self.db.ex().await?, details).await?;
        info!("Created client {}", client.id().as_i32());
        Ok(client)
    }

    /// Gets all trips that `client_id` is registered for.
    ///
    /// A client without registrations is indistinguishable from a client that doesn't exist:
    /// both yield `NotFound`.
    pub(crate) async fn get_client_trips(
        self,
        client_id: ClientId,
    ) -> DriverResult<Vec<ClientTrip>> {
        let trips = db::get_client_trips(&mut self.db.ex().await?, client_id).await?;
        if trips.is_empty() {
            return Err(DriverError::NotFound(
                "Client not found or has no trips associated with it".to_owned(),
            ));
        }
        Ok(trips)
    }
}
