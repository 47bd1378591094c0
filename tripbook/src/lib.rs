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

//! REST service to register clients for trips.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use std::error::Error;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tripbook_core::clocks::SystemClock;
use tripbook_core::db::Db;
use tripbook_core::env::get_optional_var;

pub mod db;
mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Port to listen on when `TRIPBOOK_PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Computes the address to serve on from the `TRIPBOOK_*` environment variables.
///
/// The service listens on the loopback interface unless `TRIPBOOK_BIND_ALL` is true.
pub fn bind_addr_from_env() -> Result<SocketAddr, String> {
    let port = get_optional_var::<u16>("TRIPBOOK", "PORT")?.unwrap_or(DEFAULT_PORT);
    let bind_all = get_optional_var::<bool>("TRIPBOOK", "BIND_ALL")?.unwrap_or(false);
    let ip = if bind_all { Ipv4Addr::UNSPECIFIED } else { Ipv4Addr::LOCALHOST };
    Ok(SocketAddr::from((ip, port)))
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(db.clone(), Arc::new(SystemClock::default()));
    let app = app(driver);

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    let result = axum::serve(listener, app).await;

    db.close().await;
    Ok(result?)
}
