pub mod errors;

use std::fmt::{Formatter, Result as FmtResult};

use serde::de::{Error, Visitor};

/// Visitor for newtypes that deserialize from a single string.
pub struct SingleStringVisitor;

impl<'de> Visitor<'de> for SingleStringVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a single string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where E: Error {
        Ok(String::from(value))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where E: Error {
        Ok(value)
    }
}
