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

//! API to list all trips on offer.

use crate::driver::Driver;
use crate::model::TripWithCountries;
use axum::Json;
use axum::extract::State;
use tripbook_core::rest::{EmptyBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    _: EmptyBody,
) -> Result<Json<Vec<TripWithCountries>>, RestError> {
    let trips = driver.get_trips().await?;
    Ok(Json(trips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use time::macros::datetime;
    use tripbook_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/trips".to_owned())
    }

    #[tokio::test]
    async fn test_empty() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<TripWithCountries>>()
            .await;
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_some() {
        let context = TestContext::setup().await;

        let alps = context.put_trip("Alps", 20).await;
        let local = context.put_trip("Local", 0).await;
        context.put_trip_country(alps, "Switzerland").await;
        context.put_trip_country(alps, "Italy").await;

        let response = OneShotBuilder::new(context.app(), route())
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
                    "maxPeople": 20,
                    "countries": ["Italy", "Switzerland"],
                },
                {
                    "id": local,
                    "name": "Local",
                    "description": "Description of Local",
                    "dateFrom": "2024-07-01T08:00:00Z",
                    "dateTo": "2024-07-08T18:30:00Z",
                    "maxPeople": 0,
                    "countries": [],
                },
            ]),
            response
        );
    }

    #[tokio::test]
    async fn test_typed_response() {
        let context = TestContext::setup().await;

        let alps = context.put_trip("Alps", 20).await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<TripWithCountries>>()
            .await;
        assert_eq!(1, response.len());
        assert_eq!(alps, *response[0].trip().id());
        assert_eq!(datetime!(2024-07-01 08:00:00 UTC), *response[0].trip().date_from());
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
