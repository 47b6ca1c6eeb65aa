//! Field extraction from a request's `params` object.
//!
//! Numbers accept JSON numbers or numeric strings. `null` counts as absent.

use actl_protocol::CommandFailure;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientBool {
    Bool(bool),
    Text(String),
}

/// Borrowed view of the params object. Each field has a canonical name and
/// may also be sent under legacy aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct Params<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Params<'a> {
    pub fn new(map: Option<&'a Map<String, Value>>) -> Self {
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_none_or(Map::is_empty)
    }

    fn lookup(&self, name: &str, aliases: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        std::iter::once(name)
            .chain(aliases.iter().copied())
            .filter_map(|key| map.get(key))
            .find(|value| !value.is_null())
    }

    fn field<T: DeserializeOwned>(&self, name: &str, aliases: &[&str]) -> Result<Option<T>, CommandFailure> {
        self.lookup(name, aliases)
            .map(|value| {
                T::deserialize(value).map_err(|_| CommandFailure::invalid_param(name))
            })
            .transpose()
    }

    /// A required string; empty strings are accepted.
    pub fn string(&self, name: &str, aliases: &[&str]) -> Result<String, CommandFailure> {
        self.field::<String>(name, aliases)?
            .ok_or_else(|| CommandFailure::missing_param(name))
    }

    /// An optional number; non-finite values such as `"NaN"` are rejected.
    pub fn optional_number(&self, name: &str) -> Result<Option<f64>, CommandFailure> {
        let Some(raw) = self.field::<LenientNumber>(name, &[])? else {
            return Ok(None);
        };
        let number = match raw {
            LenientNumber::Number(n) => n,
            LenientNumber::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| CommandFailure::invalid_param(name))?,
        };
        if !number.is_finite() {
            return Err(CommandFailure::invalid_param(name));
        }
        Ok(Some(number))
    }

    /// A numeric field that defaults to 0 when absent.
    pub fn number_or_zero(&self, name: &str) -> Result<f64, CommandFailure> {
        Ok(self.optional_number(name)?.unwrap_or(0.0))
    }

    pub fn number(&self, name: &str) -> Result<f64, CommandFailure> {
        self.optional_number(name)?
            .ok_or_else(|| CommandFailure::missing_param(name))
    }

    /// A required boolean; `"true"`/`"false"` strings are accepted.
    pub fn boolean(&self, name: &str) -> Result<bool, CommandFailure> {
        match self.field::<LenientBool>(name, &[])? {
            Some(LenientBool::Bool(b)) => Ok(b),
            Some(LenientBool::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(CommandFailure::invalid_param(name)),
            },
            None => Err(CommandFailure::missing_param(name)),
        }
    }
}
