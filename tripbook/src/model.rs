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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use time::{Date, Month, OffsetDateTime};
use tripbook_core::model::{EmailAddress, ModelError, ModelResult};

/// Maximum length of free-form client details, matching the schema.
const MAX_DETAIL_LENGTH: usize = 120;

/// Identifier of a client as assigned by the database.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct ClientId(i32);

impl ClientId {
    /// Creates a new client identifier from its raw value.
    pub(crate) fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the identifier as stored in the database.
    pub(crate) fn as_i32(&self) -> i32 {
        self.0
    }
}

/// Identifier of a trip as assigned by the database.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct TripId(i32);

impl TripId {
    /// Creates a new trip identifier from its raw value.
    pub(crate) fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the identifier as stored in the database.
    pub(crate) fn as_i32(&self) -> i32 {
        self.0
    }
}

/// Ensures that `s` is not longer than the maximum length allowed for client details.
fn check_length(what: &str, s: &str) -> ModelResult<()> {
    if s.chars().count() > MAX_DETAIL_LENGTH {
        return Err(ModelError(format!(
            "{} cannot be longer than {} characters",
            what, MAX_DETAIL_LENGTH
        )));
    }
    Ok(())
}

/// The first or last name of a person.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct PersonName(String);

impl PersonName {
    /// Creates a new name from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ModelError("Name cannot be empty".to_owned()));
        }
        check_length("Name", &s)?;
        Ok(Self(s))
    }

    /// Returns a string view of the name.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        Self::new(s)
    }
}

impl From<PersonName> for String {
    fn from(name: PersonName) -> Self {
        name.0
    }
}

/// Syntax of an acceptable telephone number.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9 ().-]+$").expect("Hardcoded regex must be valid")
});

/// A telephone number.
///
/// Numbers may start with a `+` and can contain spaces, dashes, dots and parenthesis to group
/// their digits, but at least one group needs to have three or more consecutive digits.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a new phone number from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ModelError("Phone number cannot be empty".to_owned()));
        }
        check_length("Phone number", &s)?;
        let has_digit_group = s.split(|c: char| !c.is_ascii_digit()).any(|group| group.len() >= 3);
        if !PHONE_RE.is_match(&s) || !has_digit_group {
            return Err(ModelError(format!("Phone number '{}' is not valid", s)));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the phone number.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        Self::new(s)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

/// A Polish national identification number.
///
/// Only the shape is validated (exactly 11 digits); the checksum digit is not verified.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct Pesel(String);

impl Pesel {
    /// Creates a new PESEL from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.len() != 11 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError(format!("PESEL '{}' must be exactly 11 digits", s)));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the PESEL.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Pesel {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        Self::new(s)
    }
}

impl From<Pesel> for String {
    fn from(pesel: Pesel) -> Self {
        pesel.0
    }
}

/// A calendar day, represented on the wire and in the database as a `yyyymmdd` integer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "i32", into = "i32")]
pub(crate) struct Day(Date);

impl Day {
    /// Creates a day from its `yyyymmdd` integer representation.
    pub(crate) fn from_i32(raw: i32) -> ModelResult<Self> {
        let invalid = |e: &dyn std::fmt::Display| ModelError(format!("Invalid day {}: {}", raw, e));

        if raw < 0 {
            return Err(invalid(&"must be positive"));
        }
        let year = raw / 10000;
        let month = u8::try_from(raw / 100 % 100).map_err(|e| invalid(&e))?;
        let day = u8::try_from(raw % 100).map_err(|e| invalid(&e))?;

        let month = Month::try_from(month).map_err(|e| invalid(&e))?;
        let date = Date::from_calendar_date(year, month, day).map_err(|e| invalid(&e))?;
        Ok(Self(date))
    }

    /// Returns the `yyyymmdd` integer representation of the day.
    pub(crate) fn as_i32(&self) -> i32 {
        self.0.year() * 10000 + i32::from(u8::from(self.0.month())) * 100 + i32::from(self.0.day())
    }
}

impl From<Date> for Day {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl TryFrom<i32> for Day {
    type Error = ModelError;

    fn try_from(raw: i32) -> ModelResult<Self> {
        Self::from_i32(raw)
    }
}

impl From<Day> for i32 {
    fn from(day: Day) -> Self {
        day.as_i32()
    }
}

/// Details of a client as provided by the user at creation time.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientDetails {
    /// The client's first name.
    first_name: PersonName,

    /// The client's last name.
    last_name: PersonName,

    /// The client's contact email.
    email: EmailAddress,

    /// The client's contact phone.
    telephone: PhoneNumber,

    /// The client's national identifier.
    pesel: Pesel,
}

/// A client as stored in the database.
#[derive(Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct Client {
    /// Database-assigned identifier.
    id: ClientId,

    /// All other details of the client.
    #[serde(flatten)]
    details: ClientDetails,
}

/// A trip on offer.
#[derive(Clone, Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Trip {
    /// Database-assigned identifier.
    id: TripId,

    /// Short name of the trip.
    name: String,

    /// Long description of the trip.
    description: String,

    /// When the trip starts.
    #[serde(with = "time::serde::rfc3339")]
    date_from: OffsetDateTime,

    /// When the trip ends.
    #[serde(with = "time::serde::rfc3339")]
    date_to: OffsetDateTime,

    /// Maximum number of clients that can register for the trip.
    max_people: u32,
}

/// A trip along with the names of the countries it visits.
#[derive(Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct TripWithCountries {
    /// The trip itself.
    #[serde(flatten)]
    trip: Trip,

    /// Names of the countries visited by the trip.
    countries: Vec<String>,
}

/// A trip a client has registered for, along with the details of the registration.
#[derive(Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientTrip {
    /// The trip the client registered for.
    #[serde(flatten)]
    trip: Trip,

    /// Day the registration happened.
    registered_at: Day,

    /// Day the trip was paid for, if it has been paid.
    payment_date: Option<Day>,
}

#[cfg(test)]
pub(crate) mod testutils {
    use super::*;

    /// Creates a `ClientDetails` from hardcoded values that must be valid.
    pub(crate) fn client_details(first: &str, last: &str) -> ClientDetails {
        ClientDetails::new(
            PersonName::new(first).unwrap(),
            PersonName::new(last).unwrap(),
            EmailAddress::new(format!("{}.{}@example.com", first, last).to_lowercase()).unwrap(),
            PhoneNumber::new("123456789").unwrap(),
            Pesel::new("12345678901").unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{Token, assert_de_tokens_error, assert_tokens};
    use time::macros::{date, datetime};

    #[test]
    fn test_person_name_ok() {
        assert_eq!("Ann", PersonName::new("Ann").unwrap().as_str());
        assert_eq!(" Lee ", PersonName::new(" Lee ").unwrap().as_str());
        assert!(PersonName::new("x".repeat(MAX_DETAIL_LENGTH)).is_ok());
    }

    #[test]
    fn test_person_name_errors() {
        assert_eq!(
            ModelError("Name cannot be empty".to_owned()),
            PersonName::new("  ").unwrap_err()
        );
        assert_eq!(
            ModelError("Name cannot be longer than 120 characters".to_owned()),
            PersonName::new("x".repeat(MAX_DETAIL_LENGTH + 1)).unwrap_err()
        );
    }

    #[test]
    fn test_person_name_length_is_in_characters() {
        assert!(PersonName::new("ż".repeat(MAX_DETAIL_LENGTH)).is_ok());
    }

    #[test]
    fn test_phone_number_ok() {
        for raw in ["123456789", "+48 123 456 789", "(22) 555-01.02", "112"] {
            assert_eq!(raw, PhoneNumber::new(raw).unwrap().as_str());
        }
    }

    #[test]
    fn test_phone_number_errors() {
        let invalid = [
            "",
            "12",
            "+",
            "call me",
            "123-abc",
            "++48123456",
            "48+123456",
            "1 2 3",
            "1-2-3-4",
            "(1).2.3",
        ];
        for raw in invalid {
            assert!(PhoneNumber::new(raw).is_err(), "{} should have been rejected", raw);
        }
        assert!(PhoneNumber::new("1".repeat(MAX_DETAIL_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_pesel() {
        assert_eq!("12345678901", Pesel::new("12345678901").unwrap().as_str());
        for raw in ["", "1234567890", "123456789012", "1234567890a", "١٢٣٤٥٦٧٨٩٠١"] {
            assert!(Pesel::new(raw).is_err(), "{} should have been rejected", raw);
        }
    }

    #[test]
    fn test_day_conversions() {
        let day = Day::from_i32(20240229).unwrap();
        assert_eq!(Day::from(date!(2024 - 02 - 29)), day);
        assert_eq!(20240229, day.as_i32());
        assert_eq!(20230101, Day::from(date!(2023 - 01 - 01)).as_i32());
    }

    #[test]
    fn test_day_errors() {
        for raw in [-20240101, 0, 20231301, 20230229, 20230100] {
            match Day::from_i32(raw) {
                Err(ModelError(msg)) => assert!(msg.starts_with("Invalid day"), "{}", msg),
                Ok(day) => panic!("{} should have been rejected but got {:?}", raw, day),
            }
        }
    }

    #[test]
    fn test_day_ser_de() {
        assert_tokens(&Day::from(date!(2024 - 05 - 17)), &[Token::I32(20240517)]);
        assert_de_tokens_error::<Day>(&[Token::I32(-5)], "Invalid day -5: must be positive");
    }

    #[test]
    fn test_newtypes_ser_de() {
        assert_tokens(&ClientId::new(5), &[Token::I32(5)]);
        assert_tokens(&PersonName::new("Ann").unwrap(), &[Token::String("Ann")]);
        assert_tokens(&Pesel::new("12345678901").unwrap(), &[Token::String("12345678901")]);
        assert_de_tokens_error::<Pesel>(
            &[Token::String("123")],
            "PESEL '123' must be exactly 11 digits",
        );
    }

    #[test]
    fn test_client_json() {
        let client = Client::new(ClientId::new(7), testutils::client_details("Ann", "Lee"));
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(
            serde_json::json!({
                "id": 7,
                "firstName": "Ann",
                "lastName": "Lee",
                "email": "ann.lee@example.com",
                "telephone": "123456789",
                "pesel": "12345678901",
            }),
            json
        );
    }

    #[test]
    fn test_client_trip_json() {
        let trip = Trip::new(
            TripId::new(3),
            "Alps".to_owned(),
            "Hiking".to_owned(),
            datetime!(2024-07-01 08:00:00 UTC),
            datetime!(2024-07-08 18:30:00 UTC),
            20,
        );
        let client_trip = ClientTrip::new(trip, Day::from(date!(2024 - 05 - 17)), None);
        let json = serde_json::to_value(&client_trip).unwrap();
        assert_eq!(
            serde_json::json!({
                "id": 3,
                "name": "Alps",
                "description": "Hiking",
                "dateFrom": "2024-07-01T08:00:00Z",
                "dateTo": "2024-07-08T18:30:00Z",
                "maxPeople": 20,
                "registeredAt": 20240517,
                "paymentDate": null,
            }),
            json
        );
    }
}
