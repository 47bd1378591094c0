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

//! Operations on the catalog of trips.

use crate::db;
use crate::driver::Driver;
use crate::model::TripWithCountries;
use tripbook_core::driver::DriverResult;

impl Driver {
    /// Gets all trips on offer along with the countries each one visits.
    pub(crate) async fn get_trips(self) -> DriverResult<Vec<TripWithCountries>> {
        let mut tx = self.db.begin().await?;
        let trips = db::get_trips(tx.ex()).await?;
        let mut countries = db::get_trip_countries(tx.ex()).await?;
        tx.commit().await?;

        Ok(trips
            .into_iter()
            .map(|trip| {
                let names = countries.remove(trip.id()).unwrap_or_default();
                TripWithCountries::new(trip, names)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_get_trips_empty() {
        let context = TestContext::setup().await;

        assert!(context.driver().get_trips().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_trips_with_and_without_countries() {
        let context = TestContext::setup().await;

        let alps = context.put_trip("Alps", 20).await;
        let local = context.put_trip("Local", 5).await;
        db::put_trip_country(&mut context.ex().await, alps, "Switzerland").await.unwrap();
        db::put_trip_country(&mut context.ex().await, alps, "Austria").await.unwrap();

        let trips = context.driver().get_trips().await.unwrap();
        assert_eq!(2, trips.len());

        assert_eq!(alps, *trips[0].trip().id());
        assert_eq!("Alps", trips[0].trip().name());
        assert_eq!(
            &["Austria".to_owned(), "Switzerland".to_owned()],
            trips[0].countries().as_slice()
        );

        assert_eq!(local, *trips[1].trip().id());
        assert_eq!(5, *trips[1].trip().max_people());
        assert!(trips[1].countries().is_empty());
    }
}
