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

//! Entry point to the trip registration service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use std::error::Error;
use std::sync::Arc;
use tripbook::db::init_schema;
use tripbook::{bind_addr_from_env, serve};
use tripbook_core::db::Db;
use tripbook_core::db::postgres::{PostgresDb, PostgresOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let addr = bind_addr_from_env()?;

    let db_opts = PostgresOptions::from_env("PGSQL_PROD")?;
    let db = Arc::new(PostgresDb::connect(db_opts)?);
    init_schema(&mut db.ex().await?).await?;

    serve(addr, db).await
}
