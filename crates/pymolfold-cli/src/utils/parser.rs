use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE (e.g., 'nvcf.poll-seconds=120').")]
    InvalidKeyValue(String),

    #[error("Key cannot be empty in '{0}'.")]
    EmptyKey(String),

    #[error("Invalid HTTP status code '{value}' in list '{list}'.")]
    InvalidStatus { value: String, list: String },

    #[error("Invalid {kind} value for '{key}': '{value}'.")]
    InvalidValue {
        kind: &'static str,
        key: String,
        value: String,
    },
}

/// Splits `KEY=VALUE` at the first `=`; both sides are trimmed.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(pair.to_string()));
    }
    Ok((key, value.trim()))
}

/// Parses a comma separated list such as `400,401,500`.
pub fn parse_status_list(list: &str) -> Result<Vec<u16>, ParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Ok(code),
            _ => Err(ParseError::InvalidStatus {
                value: s.to_string(),
                list: list.to_string(),
            }),
        })
        .collect()
}

pub fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        kind: "integer",
        key: key.to_string(),
        value: value.to_string(),
    })
}
