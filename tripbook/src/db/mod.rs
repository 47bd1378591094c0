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

//! Database abstraction to manipulate clients, trips and registrations.

use crate::model::{
    Client, ClientDetails, ClientId, ClientTrip, Day, PersonName, Pesel, PhoneNumber, Trip, TripId,
};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
#[cfg(any(feature = "postgres", test))]
use time::OffsetDateTime;
#[cfg(feature = "postgres")]
use tripbook_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use tripbook_core::db::sqlite::{self, build_timestamp};
use tripbook_core::db::{DbError, DbResult, Executor, count_as_usize, ensure_one_upsert};
use tripbook_core::model::EmailAddress;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Converts the raw `max_people` column into its model representation.
fn max_people_from_row(raw: i32) -> DbResult<u32> {
    u32::try_from(raw)
        .map_err(|_| DbError::DataIntegrityError(format!("Invalid max_people {} in trip", raw)))
}

/// Converts a `max_people` count into the representation used by the database.
#[cfg(test)]
fn max_people_to_row(max_people: u32) -> DbResult<i32> {
    i32::try_from(max_people)
        .map_err(|_| DbError::BackendError(format!("max_people {} is too big", max_people)))
}

/// Converts the raw `yyyymmdd` column named `column` into a `Day`.
fn day_from_row(column: &str, raw: i32) -> DbResult<Day> {
    Day::from_i32(raw).map_err(|e| DbError::DataIntegrityError(format!("{}: {}", column, e)))
}

#[cfg(feature = "postgres")]
impl TryFrom<&PgRow> for Trip {
    type Error = DbError;

    fn try_from(row: &PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id_trip").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let date_from: OffsetDateTime =
            row.try_get("date_from").map_err(postgres::map_sqlx_error)?;
        let date_to: OffsetDateTime = row.try_get("date_to").map_err(postgres::map_sqlx_error)?;
        let max_people: i32 = row.try_get("max_people").map_err(postgres::map_sqlx_error)?;

        Ok(Trip::new(
            TripId::new(id),
            name,
            description,
            date_from,
            date_to,
            max_people_from_row(max_people)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<&PgRow> for ClientTrip {
    type Error = DbError;

    fn try_from(row: &PgRow) -> DbResult<Self> {
        let trip = Trip::try_from(row)?;
        let registered_at: i32 = row.try_get("registered_at").map_err(postgres::map_sqlx_error)?;
        let payment_date: Option<i32> =
            row.try_get("payment_date").map_err(postgres::map_sqlx_error)?;

        Ok(ClientTrip::new(
            trip,
            day_from_row("registered_at", registered_at)?,
            payment_date.map(|raw| day_from_row("payment_date", raw)).transpose()?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<&PgRow> for Client {
    type Error = DbError;

    fn try_from(row: &PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id_client").map_err(postgres::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(postgres::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let telephone: String = row.try_get("telephone").map_err(postgres::map_sqlx_error)?;
        let pesel: String = row.try_get("pesel").map_err(postgres::map_sqlx_error)?;

        let details = ClientDetails::new(
            PersonName::new(first_name)?,
            PersonName::new(last_name)?,
            EmailAddress::new(email)?,
            PhoneNumber::new(telephone)?,
            Pesel::new(pesel)?,
        );
        Ok(Client::new(ClientId::new(id), details))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<&SqliteRow> for Trip {
    type Error = DbError;

    fn try_from(row: &SqliteRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id_trip").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let date_from_secs: i64 = row.try_get("date_from_secs").map_err(sqlite::map_sqlx_error)?;
        let date_from_nsecs: i64 =
            row.try_get("date_from_nsecs").map_err(sqlite::map_sqlx_error)?;
        let date_to_secs: i64 = row.try_get("date_to_secs").map_err(sqlite::map_sqlx_error)?;
        let date_to_nsecs: i64 = row.try_get("date_to_nsecs").map_err(sqlite::map_sqlx_error)?;
        let max_people: i32 = row.try_get("max_people").map_err(sqlite::map_sqlx_error)?;

        Ok(Trip::new(
            TripId::new(id),
            name,
            description,
            build_timestamp(date_from_secs, date_from_nsecs)?,
            build_timestamp(date_to_secs, date_to_nsecs)?,
            max_people_from_row(max_people)?,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<&SqliteRow> for ClientTrip {
    type Error = DbError;

    fn try_from(row: &SqliteRow) -> DbResult<Self> {
        let trip = Trip::try_from(row)?;
        let registered_at: i32 = row.try_get("registered_at").map_err(sqlite::map_sqlx_error)?;
        let payment_date: Option<i32> =
            row.try_get("payment_date").map_err(sqlite::map_sqlx_error)?;

        Ok(ClientTrip::new(
            trip,
            day_from_row("registered_at", registered_at)?,
            payment_date.map(|raw| day_from_row("payment_date", raw)).transpose()?,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<&SqliteRow> for Client {
    type Error = DbError;

    fn try_from(row: &SqliteRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id_client").map_err(sqlite::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(sqlite::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let telephone: String = row.try_get("telephone").map_err(sqlite::map_sqlx_error)?;
        let pesel: String = row.try_get("pesel").map_err(sqlite::map_sqlx_error)?;

        let details = ClientDetails::new(
            PersonName::new(first_name)?,
            PersonName::new(last_name)?,
            EmailAddress::new(email)?,
            PhoneNumber::new(telephone)?,
            Pesel::new(pesel)?,
        );
        Ok(Client::new(ClientId::new(id), details))
    }
}

/// Gets all trips, sorted by their identifier.
pub(crate) async fn get_trips(ex: &mut Executor) -> DbResult<Vec<Trip>> {
    let mut trips = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id_trip, name, description, date_from, date_to, max_people
                FROM Trip
                ORDER BY id_trip";
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                trips.push(Trip::try_from(&row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT
                    id_trip, name, description,
                    date_from_secs, date_from_nsecs, date_to_secs, date_to_nsecs,
                    max_people
                FROM Trip
                ORDER BY id_trip";
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                trips.push(Trip::try_from(&row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(trips)
}

/// Gets the names of the countries visited by every trip, keyed by trip.
///
/// Trips that visit no countries are not present in the returned map.  The country names of each
/// trip are sorted alphabetically.
pub(crate) async fn get_trip_countries(
    ex: &mut Executor,
) -> DbResult<HashMap<TripId, Vec<String>>> {
    let query_str = "
        SELECT ct.id_trip AS id_trip, c.name AS name
        FROM Country_Trip ct JOIN Country c ON c.id_country = ct.id_country
        ORDER BY ct.id_trip, c.name";

    let mut countries: HashMap<TripId, Vec<String>> = HashMap::new();
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let id: i32 = row.try_get("id_trip").map_err(postgres::map_sqlx_error)?;
                let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
                countries.entry(TripId::new(id)).or_default().push(name);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let id: i32 = row.try_get("id_trip").map_err(sqlite::map_sqlx_error)?;
                let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
                countries.entry(TripId::new(id)).or_default().push(name);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(countries)
}

/// Gets all trips `client_id` is registered for, along with the registration details.
///
/// Returns an empty list both if the client does not exist and if it has no registrations.
pub(crate) async fn get_client_trips(
    ex: &mut Executor,
    client_id: ClientId,
) -> DbResult<Vec<ClientTrip>> {
    let mut trips = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT
                    t.id_trip AS id_trip, t.name AS name, t.description AS description,
                    t.date_from AS date_from, t.date_to AS date_to, t.max_people AS max_people,
                    ct.registered_at AS registered_at, ct.payment_date AS payment_date
                FROM Trip t
                    JOIN Client_Trip ct ON t.id_trip = ct.id_trip
                    JOIN Client c ON c.id_client = ct.id_client
                WHERE c.id_client = $1
                ORDER BY t.id_trip";
            let mut rows = sqlx::query(query_str).bind(client_id.as_i32()).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                trips.push(ClientTrip::try_from(&row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT
                    t.id_trip AS id_trip, t.name AS name, t.description AS description,
                    t.date_from_secs AS date_from_secs, t.date_from_nsecs AS date_from_nsecs,
                    t.date_to_secs AS date_to_secs, t.date_to_nsecs AS date_to_nsecs,
                    t.max_people AS max_people,
                    ct.registered_at AS registered_at, ct.payment_date AS payment_date
                FROM Trip t
                    JOIN Client_Trip ct ON t.id_trip = ct.id_trip
                    JOIN Client c ON c.id_client = ct.id_client
                WHERE c.id_client = ?
                ORDER BY t.id_trip";
            let mut rows = sqlx::query(query_str).bind(client_id.as_i32()).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                trips.push(ClientTrip::try_from(&row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(trips)
}

/// Creates a new client with the given `details` and returns it with its assigned identifier.
///
/// Clients are not deduplicated: creating two clients with the same details yields two entries.
pub(crate) async fn create_client(ex: &mut Executor, details: ClientDetails) -> DbResult<Client> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO Client (first_name, last_name, email, telephone, pesel)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id_client";
            let row = sqlx::query(query_str)
                .bind(details.first_name().as_str())
                .bind(details.last_name().as_str())
                .bind(details.email().as_str())
                .bind(details.telephone().as_str())
                .bind(details.pesel().as_str())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            let id: i32 = row.try_get("id_client").map_err(postgres::map_sqlx_error)?;
            id
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO Client (first_name, last_name, email, telephone, pesel)
                VALUES (?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(details.first_name().as_str())
                .bind(details.last_name().as_str())
                .bind(details.email().as_str())
                .bind(details.telephone().as_str())
                .bind(details.pesel().as_str())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            ensure_one_upsert(done.rows_affected())?;
            i32::try_from(done.last_insert_rowid()).map_err(|e| {
                DbError::BackendError(format!("Client identifier out of range: {}", e))
            })?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(Client::new(ClientId::new(id), details))
}

/// Checks whether the client `client_id` exists.
pub(crate) async fn client_exists(ex: &mut Executor, client_id: ClientId) -> DbResult<bool> {
    let row = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT 1 FROM Client WHERE id_client = $1";
            sqlx::query(query_str)
                .bind(client_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .map(|_| ())
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT 1 FROM Client WHERE id_client = ?";
            sqlx::query(query_str)
                .bind(client_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .map(|_| ())
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(row.is_some())
}

/// Gets the maximum number of people that can register for `trip_id`, or `None` if the trip does
/// not exist.
///
/// On PostgreSQL, this locks the trip's row until the end of the transaction so that concurrent
/// registrations for the same trip are serialized.
pub(crate) async fn get_trip_capacity(
    ex: &mut Executor,
    trip_id: TripId,
) -> DbResult<Option<u32>> {
    let max_people: Option<i32> = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT max_people FROM Trip WHERE id_trip = $1 FOR UPDATE";
            let row = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            match row {
                Some(row) => Some(row.try_get("max_people").map_err(postgres::map_sqlx_error)?),
                None => None,
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT max_people FROM Trip WHERE id_trip = ?";
            let row = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            match row {
                Some(row) => Some(row.try_get("max_people").map_err(sqlite::map_sqlx_error)?),
                None => None,
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    max_people.map(max_people_from_row).transpose()
}

/// Checks whether `client_id` is registered for `trip_id`.
pub(crate) async fn registration_exists(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
) -> DbResult<bool> {
    let row = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT 1 FROM Client_Trip WHERE id_client = $1 AND id_trip = $2";
            sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .map(|_| ())
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT 1 FROM Client_Trip WHERE id_client = ? AND id_trip = ?";
            sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .map(|_| ())
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(row.is_some())
}

/// Counts how many clients are registered for `trip_id`.
pub(crate) async fn count_registrations(ex: &mut Executor, trip_id: TripId) -> DbResult<usize> {
    let total: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM Client_Trip WHERE id_trip = $1";
            let row = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM Client_Trip WHERE id_trip = ?";
            let row = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("total").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_as_usize(total)
}

/// Registers `client_id` for `trip_id` on `registered_at`, without a payment date.
///
/// Fails with `AlreadyExists` if the registration exists and with `NotFound` if either the client
/// or the trip do not exist.
pub(crate) async fn put_registration(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
    registered_at: Day,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO Client_Trip (id_client, id_trip, registered_at) VALUES ($1, $2, $3)";
            let done = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .bind(registered_at.as_i32())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO Client_Trip (id_client, id_trip, registered_at) VALUES (?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .bind(registered_at.as_i32())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    ensure_one_upsert(rows_affected)
}

/// Deletes the registration of `client_id` for `trip_id`.
///
/// Fails with `NotFound` if there was no such registration.
pub(crate) async fn delete_registration(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM Client_Trip WHERE id_client = $1 AND id_trip = $2";
            let done = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM Client_Trip WHERE id_client = ? AND id_trip = ?";
            let done = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        n => Err(DbError::BackendError(format!("Deletion affected {} rows instead of one", n))),
    }
}

/// Gets the client `client_id`.
#[cfg(test)]
pub(crate) async fn get_client(ex: &mut Executor, client_id: ClientId) -> DbResult<Client> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM Client WHERE id_client = $1";
            let row = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Client::try_from(&row)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM Client WHERE id_client = ?";
            let row = sqlx::query(query_str)
                .bind(client_id.as_i32())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Client::try_from(&row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Creates a new trip and returns its assigned identifier.
#[cfg(test)]
pub(crate) async fn put_trip(
    ex: &mut Executor,
    name: &str,
    date_from: OffsetDateTime,
    date_to: OffsetDateTime,
    max_people: u32,
) -> DbResult<TripId> {
    let description = format!("Description of {}", name);
    let max_people = max_people_to_row(max_people)?;
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO Trip (name, description, date_from, date_to, max_people)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id_trip";
            let row = sqlx::query(query_str)
                .bind(name)
                .bind(description)
                .bind(date_from)
                .bind(date_to)
                .bind(max_people)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            let id: i32 = row.try_get("id_trip").map_err(postgres::map_sqlx_error)?;
            id
        }

        Executor::Sqlite(ex) => {
            let (date_from_secs, date_from_nsecs) = sqlite::unpack_timestamp(date_from)?;
            let (date_to_secs, date_to_nsecs) = sqlite::unpack_timestamp(date_to)?;

            let query_str = "
                INSERT INTO Trip (
                    name, description,
                    date_from_secs, date_from_nsecs, date_to_secs, date_to_nsecs,
                    max_people
                )
                VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(description)
                .bind(date_from_secs)
                .bind(date_from_nsecs)
                .bind(date_to_secs)
                .bind(date_to_nsecs)
                .bind(max_people)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            i32::try_from(done.last_insert_rowid()).map_err(|e| {
                DbError::BackendError(format!("Trip identifier out of range: {}", e))
            })?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(TripId::new(id))
}

/// Associates the country `name` with `trip_id`, creating the country if it doesn't exist yet.
#[cfg(test)]
pub(crate) async fn put_trip_country(
    ex: &mut Executor,
    trip_id: TripId,
    name: &str,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "INSERT INTO Country (name) VALUES ($1) ON CONFLICT (name) DO NOTHING";
            sqlx::query(query_str)
                .bind(name)
                .execute(&mut *ex)
                .await
                .map_err(postgres::map_sqlx_error)?;

            let query_str = "
                INSERT INTO Country_Trip (id_country, id_trip)
                SELECT id_country, $1 FROM Country WHERE name = $2";
            let done = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .bind(name)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO Country (name) VALUES (?) ON CONFLICT (name) DO NOTHING";
            sqlx::query(query_str)
                .bind(name)
                .execute(&mut *ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;

            let query_str = "
                INSERT INTO Country_Trip (id_country, id_trip)
                SELECT id_country, ? FROM Country WHERE name = ?";
            let done = sqlx::query(query_str)
                .bind(trip_id.as_i32())
                .bind(name)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    ensure_one_upsert(rows_affected)
}

/// Records that the registration of `client_id` for `trip_id` was paid on `payment_date`.
#[cfg(test)]
pub(crate) async fn set_payment_date(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
    payment_date: Day,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE Client_Trip SET payment_date = $1 WHERE id_client = $2 AND id_trip = $3";
            let done = sqlx::query(query_str)
                .bind(payment_date.as_i32())
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE Client_Trip SET payment_date = ? WHERE id_client = ? AND id_trip = ?";
            let done = sqlx::query(query_str)
                .bind(payment_date.as_i32())
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    ensure_one_upsert(rows_affected)
}

/// Corrupts the registration day of `client_id` for `trip_id` by storing a raw value in it.
#[cfg(test)]
pub(crate) async fn set_raw_registered_at(
    ex: &mut Executor,
    client_id: ClientId,
    trip_id: TripId,
    raw: i32,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE Client_Trip SET registered_at = $1 WHERE id_client = $2 AND id_trip = $3";
            let done = sqlx::query(query_str)
                .bind(raw)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE Client_Trip SET registered_at = ? WHERE id_client = ? AND id_trip = ?";
            let done = sqlx::query(query_str)
                .bind(raw)
                .bind(client_id.as_i32())
                .bind(trip_id.as_i32())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    ensure_one_upsert(rows_affected)
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_max_people_from_row() {
        assert_eq!(Ok(0), max_people_from_row(0));
        assert_eq!(Ok(25), max_people_from_row(25));
        match max_people_from_row(-1) {
            Err(DbError::DataIntegrityError(msg)) => assert!(msg.contains("-1")),
            e => panic!("Unexpected result: {:?}", e),
        }
    }

    #[test]
    fn test_max_people_to_row() {
        assert_eq!(Ok(12), max_people_to_row(12));
        assert!(max_people_to_row(u32::MAX).is_err());
    }

    #[test]
    fn test_day_from_row() {
        assert_eq!(20240517, day_from_row("col", 20240517).unwrap().as_i32());
        match day_from_row("payment_date", 20241301) {
            Err(DbError::DataIntegrityError(msg)) => assert!(msg.starts_with("payment_date: ")),
            e => panic!("Unexpected result: {:?}", e),
        }
    }
}
