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

//! Operations to register clients for trips and to cancel those registrations.

use crate::db;
use crate::driver::Driver;
use crate::model::{ClientId, Day, TripId};
use log::info;
use tripbook_core::db::{DbError, DbResult, Executor};
use tripbook_core::driver::{DriverError, DriverResult};

/// Outcome of evaluating whether a client can register for a trip.
#[derive(Debug, PartialEq)]
enum RegistrationVerdict {
    /// The registration can proceed.
    Allowed,

    /// The client does not exist.
    ClientNotFound,

    /// The trip does not exist.
    TripNotFound,

    /// The client is already registered for the trip.
    AlreadyRegistered,

    /// The trip has no room left.
    TripFull,
}

impl RegistrationVerdict {
    /// Converts the verdict into the error to return to the caller, if any.
    fn into_result(self) -> DriverResult<()> {
        match self {
            RegistrationVerdict::Allowed => Ok(()),
            RegistrationVerdict::ClientNotFound => {
                Err(DriverError::NotFound("Client doesn't exist".to_owned()))
            }
            RegistrationVerdict::TripNotFound => {
                Err(DriverError::NotFound("Trip doesn't exist".to_owned()))
            }
            RegistrationVerdict::AlreadyRegistered => Err(DriverError::AlreadyExists(
                "Client already registered for this trip".to_owned(),
            )),
            RegistrationVerdict::TripFull => {
                Err(DriverError::CapacityExceeded("Trip is full".to_owned()))
            }
        }
    }
}

/// Evaluates whether `client_id` can register for `trip_id`.
///
/// The checks run in a fixed order and the first one that fails determines the verdict.
async fn check_registration(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
) -> DbResult<RegistrationVerdict> {
    if !db::client_exists(ex, client_id).await? {
        return Ok(RegistrationVerdict::ClientNotFound);
    }

    let max_people = match db::get_trip_capacity(ex, trip_id).await? {
        Some(max_people) => max_people,
        None => return Ok(RegistrationVerdict::TripNotFound),
    };

    if db::registration_exists(ex, client_id, trip_id).await? {
        return Ok(RegistrationVerdict::AlreadyRegistered);
    }

    let registered = db::count_registrations(ex, trip_id).await?;
    if registered >= usize::try_from(max_people).unwrap_or(usize::MAX) {
        return Ok(RegistrationVerdict::TripFull);
    }

    Ok(RegistrationVerdict::Allowed)
}

impl Driver {
    /// Registers `client_id` for `trip_id` as of today.
    pub(crate) async fn register_client_to_trip(
        self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;

        let verdict = check_registration(tx.ex(), client_id, trip_id).await?;
        if verdict != RegistrationVerdict::Allowed {
            info!(
                "Rejected registration of client {} for trip {}: {:?}",
                client_id.as_i32(),
                trip_id.as_i32(),
                verdict
            );
        }
        verdict.into_result()?;

        let today = Day::from(self.clock.today_utc());
        db::put_registration(tx.ex(), client_id, trip_id, today).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Cancels the registration of `client_id` for `trip_id`.
    pub(crate) async fn delete_registration(
        self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> DriverResult<()> {
        match db::delete_registration(&mut self.db.ex().await?, client_id, trip_id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(DriverError::NotFound(
                "Client to trip registration not found".to_owned(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
