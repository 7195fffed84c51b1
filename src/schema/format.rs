use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::MessageError;
use crate::utils::ValidationUtils;

/// Closed set of string formats a `string` field may enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Date,
    DateTime,
    Slug,
    Email,
    Hashtag,
    Ipv4,
    Ipv6,
    Hostname,
    Uri,
    Url,
    Uuid,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Slug => "slug",
            Self::Email => "email",
            Self::Hashtag => "hashtag",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Hostname => "hostname",
            Self::Uri => "uri",
            Self::Url => "url",
            Self::Uuid => "uuid",
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        match self {
            Self::Date => ValidationUtils::is_valid_date(value),
            Self::DateTime => ValidationUtils::is_valid_date_time(value),
            Self::Slug => ValidationUtils::is_valid_slug(value),
            Self::Email => ValidationUtils::is_valid_email(value),
            Self::Hashtag => ValidationUtils::is_valid_hashtag(value),
            Self::Ipv4 => ValidationUtils::is_valid_ipv4(value),
            Self::Ipv6 => ValidationUtils::is_valid_ipv6(value),
            Self::Hostname => ValidationUtils::is_valid_hostname(value),
            Self::Uri => ValidationUtils::is_valid_uri(value),
            Self::Url => ValidationUtils::is_valid_url(value),
            Self::Uuid => ValidationUtils::is_valid_uuid(value),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s {
            "date" => Self::Date,
            "date-time" => Self::DateTime,
            "slug" => Self::Slug,
            "email" => Self::Email,
            "hashtag" => Self::Hashtag,
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            "hostname" => Self::Hostname,
            "uri" => Self::Uri,
            "url" => Self::Url,
            "uuid" => Self::Uuid,
            other => {
                return Err(MessageError::assertion(format!("Unknown string format [{other}]")))
            }
        };
        Ok(format)
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_validate() {
        let email: Format = "email".parse().unwrap();
        assert!(email.is_valid("bart@simpsons.com"));
        assert!(!email.is_valid("bart"));
        assert!("phone".parse::<Format>().is_err());
        assert_eq!(Format::DateTime.to_string(), "date-time");
    }
}
