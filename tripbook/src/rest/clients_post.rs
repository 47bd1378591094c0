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

//! API to create a new client.

use crate::driver::Driver;
use crate::model::ClientDetails;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::{Json, http};
use tripbook_core::rest::RestError;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    payload: Result<Json<ClientDetails>, JsonRejection>,
) -> Result<impl IntoResponse, RestError> {
    let Json(details) = payload?;

    let client = driver.create_client(details).await?;
    let location = format!("/api/clients/{}", client.id().as_i32());
    Ok((http::StatusCode::CREATED, [(http::header::LOCATION, location)], Json(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Client;
    use crate::rest::testutils::*;
    use serde_json::json;
    use tripbook_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/clients".to_owned())
    }

    fn ann_lee() -> serde_json::Value {
        json!({
            "firstName": "Ann",
            "lastName": "Lee",
            "email": "a@x.com",
            "telephone": "123456789",
            "pesel": "12345678901",
        })
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(ann_lee())
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<serde_json::Value>()
            .await;

        let id = response["id"].as_i64().unwrap();
        assert!(id > 0);
        let mut exp_response = ann_lee();
        exp_response["id"] = json!(id);
        assert_eq!(exp_response, response);
    }

    #[tokio::test]
    async fn test_location_header() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(ann_lee())
            .await
            .expect_status(http::StatusCode::CREATED)
            .take_response()
            .await;

        let location =
            response.headers().get(http::header::LOCATION).unwrap().to_str().unwrap().to_owned();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let client: Client = serde_json::from_slice(&body).unwrap();
        assert_eq!(format!("/api/clients/{}", client.id().as_i32()), location);
        assert!(context.client_exists(*client.id()).await);
    }

    #[tokio::test]
    async fn test_duplicates_get_unique_ids() {
        let context = TestContext::setup().await;

        let mut ids = vec![];
        for _ in 0..3 {
            let client = OneShotBuilder::new(context.app(), route())
                .send_json(ann_lee())
                .await
                .expect_status(http::StatusCode::CREATED)
                .expect_json::<Client>()
                .await;
            ids.push(client.id().as_i32());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(3, ids.len());
    }

    #[tokio::test]
    async fn test_invalid_fields() {
        let context = TestContext::setup().await;

        for (field, value, exp_error) in [
            ("firstName", "", "Name cannot be empty"),
            ("email", "not-an-email", "Email does not look like a valid address"),
            ("telephone", "phone", "Phone number 'phone' is not valid"),
            ("pesel", "123", "PESEL '123' must be exactly 11 digits"),
        ] {
            let mut request = ann_lee();
            request[field] = json!(value);

            OneShotBuilder::new(context.app(), route())
                .send_json(request)
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error(exp_error)
                .await;
        }
    }

    #[tokio::test]
    async fn test_missing_field() {
        let context = TestContext::setup().await;

        let mut request = ann_lee();
        request.as_object_mut().unwrap().remove("pesel");

        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("missing field `pesel`")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
