use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected three comma-separated values (e.g., '3,1,2') but found {found} in '{input}'.")]
    WrongArity { input: String, found: usize },

    #[error("Component '{component}' of '{input}' is not a valid number.")]
    InvalidNumber { input: String, component: String },
}

/// Parses `"a,b,c"` (whitespace around components allowed) into three values.
pub fn parse_triple<T: FromStr>(input: &str) -> Result<[T; 3], ParseError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(ParseError::WrongArity {
            input: input.to_string(),
            found: parts.len(),
        });
    };
    let parse = |s: &str| {
        s.parse::<T>().map_err(|_| ParseError::InvalidNumber {
            input: input.to_string(),
            component: s.to_string(),
        })
    };
    Ok([parse(*a)?, parse(*b)?, parse(*c)?])
}
