//! Users and external identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserKind {
    #[default]
    User,
    Org,
}

impl UserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Org => "ORG",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ORG" => Ok(Self::Org),
            other => Err(crate::Error::InvalidUserKind(other.to_string())),
        }
    }
}

/// A Leaflet account. The name is immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub kind: UserKind,
    pub full_name: String,
}

/// External identity as reported by an identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub provider: String,
    pub external_id: String,
}

impl Ident {
    pub fn new(provider: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.external_id)
    }
}

/// Link from an external identity to a user. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub ident: Ident,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_kind_round_trip() {
        assert_eq!("ORG".parse::<UserKind>().unwrap(), UserKind::Org);
        assert_eq!(UserKind::User.to_string(), "USER");
        assert!("admin".parse::<UserKind>().is_err());
    }

    #[test]
    fn test_ident_display() {
        assert_eq!(Ident::new("github", "42").to_string(), "github:42");
    }
}
