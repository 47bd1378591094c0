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

//! Utilities to read typed configuration from environment variables.
//!
//! Variables are always named `<prefix>_<suffix>` so that a single service can consume several
//! independent groups of settings (such as `PGSQL_PROD_*` and `TRIPBOOK_*`).

use std::env;

/// Result type for environment errors.
type Result<T> = std::result::Result<T, String>;

/// Wrapper around an environment variable's value to support conversions to other types.
pub struct Value(String);

impl TryFrom<Value> for String {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Ok(value.0)
    }
}

/// Generates a `TryFrom<Value>` for a type that can be parsed by `FromStr`.
macro_rules! tryfrom_value_for_fromstr [
    ( $( $t:ty ),+ ) => {
        $(
            impl TryFrom<Value> for $t {
                type Error = String;

                fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
                    value.0.parse::<$t>().map_err(|e| format!("Invalid {}: {}", stringify!($t), e))
                }
            }
        )+
    }
];

tryfrom_value_for_fromstr!(bool, i16, i32, i64, u8, u16, u32, u64, usize);

/// Reads the raw variable `name`, returning `None` if it is not set.
fn lookup(name: &str) -> Result<Option<Value>> {
    match env::var(name) {
        Ok(value) => Ok(Some(Value(value))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(format!("Invalid value in environment variable {}", name))
        }
    }
}

/// Converts the `value` read from the variable `name` into the target type `T`.
fn convert<T: TryFrom<Value, Error = String>>(name: &str, value: Value) -> Result<T> {
    T::try_from(value).map_err(|e| format!("Invalid type in environment variable {}: {}", name, e))
}

/// Gets a required environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
pub fn get_required_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<T> {
    let name = format!("{}_{}", prefix, suffix);
    match lookup(&name)? {
        Some(value) => convert(&name, value),
        None => Err(format!("Required environment variable {} not present", name)),
    }
}

/// Gets an optional environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
///
/// A variable that is set but cannot be converted is an error, not an absent value.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>> {
    let name = format!("{}_{}", prefix, suffix);
    lookup(&name)?.map(|value| convert(&name, value)).transpose()
}
