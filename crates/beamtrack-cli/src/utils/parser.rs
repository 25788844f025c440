use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Invalid {expected} value for '{key}': '{value}'")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Component '{component}' cannot be empty in key '{key}'.")]
    EmptyComponent { component: &'static str, key: String },
}

/// Splits a `KEY=VALUE` override at the first `=`. Surrounding whitespace is trimmed.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            key: pair.to_string(),
        });
    }
    Ok((key, value.trim()))
}

/// Parses an override value, naming the expected type in the error.
pub fn parse_value<T: FromStr>(key: &str, value: &str, expected: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

/// Splits `elements.<name>.<field>` into its element name and field.
pub fn parse_element_key(key: &str) -> Option<Result<(&str, &str), ParseError>> {
    let rest = key.strip_prefix("elements.")?;
    let parsed = match rest.rsplit_once('.') {
        Some((name, field)) if !name.is_empty() && !field.is_empty() => Ok((name, field)),
        Some((name, _)) if name.is_empty() => Err(ParseError::EmptyComponent {
            component: "element name",
            key: key.to_string(),
        }),
        _ => Err(ParseError::EmptyComponent {
            component: "element field",
            key: key.to_string(),
        }),
    };
    Some(parsed)
}
