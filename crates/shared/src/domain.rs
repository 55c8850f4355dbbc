use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who the logged-in user is acting as. Sent verbatim as `userType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[default]
    Customer,
    Tradesperson,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Customer => "CUSTOMER",
            UserType::Tradesperson => "TRADESPERSON",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Tradesperson => "tradesperson",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user type '{0}'")]
pub struct UnknownUserType(pub String);

impl std::str::FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(UserType::Customer),
            "TRADESPERSON" => Ok(UserType::Tradesperson),
            _ => Err(UnknownUserType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_screaming_case() {
        assert_eq!(
            serde_json::to_string(&UserType::Tradesperson).expect("json"),
            "\"TRADESPERSON\""
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("customer".parse::<UserType>(), Ok(UserType::Customer));
        assert_eq!(" Tradesperson ".parse::<UserType>(), Ok(UserType::Tradesperson));
        assert!("admin".parse::<UserType>().is_err());
    }
}
