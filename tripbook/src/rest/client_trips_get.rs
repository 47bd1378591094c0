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

//! API to list the trips a client is registered for.

use crate::driver::Driver;
use crate::model::{ClientId, ClientTrip};
use axum::Json;
use axum::extract::{Path, State};
use tripbook_core::rest::{EmptyBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(client_id): Path<ClientId>,
    _: EmptyBody,
) -> Result<Json<Vec<ClientTrip>>, RestError> {
    let trips = driver.get_client_trips(client_id).await?;
    Ok(Json(trips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use tripbook_core::rest::testutils::*;

    fn route(client_id: ClientId) -> (http::Method, String) {
        (http::Method::GET, format!("/api/clients/{}/trips", client_id.as_i32()))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let client = context.put_client("Ann", "Lee").await;
        let other = context.put_client("John", "Doe").await;
        let alps = context.put_trip("Alps", 10).await;
        let baltic = context.put_trip("Baltic", 10).await;
        context.register(client, alps).await;
        context.register(other, baltic).await;

        let response = OneShotBuilder::new(context.app(), route(client))
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(
            serde_json::json!([
                {
                    "id": alps,
                    "name": "Alps",
                    "description": "Description of Alps",
                    "dateFrom": "2024-07-01T08:00:00Z",
                    "dateTo": "2024-07-08T18:30:00Z",
                    "maxPeople": 10,
                    "registeredAt": 20240517,
                    "paymentDate": null,
                },
            ]),
            response
        );
    }

    #[tokio::test]
    async fn test_matches_database() {
        let context = TestContext::setup().await;

        let client = context.put_client("Ann", "Lee").await;
        let alps = context.put_trip("Alps", 10).await;
        let baltic = context.put_trip("Baltic", 10).await;
        context.register(client, baltic).await;
        context.register(client, alps).await;

        let response = OneShotBuilder::new(context.app(), route(client))
            .send_empty()
            .await
            .expect_json::<Vec<ClientTrip>>()
            .await;
        assert_eq!(context.get_client_trips(client).await, response);
        assert_eq!(alps, *response[0].trip().id());
        assert_eq!(baltic, *response[1].trip().id());
    }

    #[tokio::test]
    async fn test_client_without_trips() {
        let context = TestContext::setup().await;

        let client = context.put_client("Ann", "Lee").await;
        let _trip = context.put_trip("Alps", 10).await;

        OneShotBuilder::new(context.app(), route(client))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Client not found or has no trips")
            .await;
    }

    #[tokio::test]
    async fn test_missing_client() {
        let context = TestContext::setup().await;

        let client = ClientId::new(42);
        assert!(!context.client_exists(client).await);

        OneShotBuilder::new(context.app(), route(client))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Client not found or has no trips")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(ClientId::new(1)));
}
