//! Destination parsing: `name*domain` federation addresses and raw account ids.

use std::fmt;
use std::str::FromStr;

use zion_common::strkey;

use crate::error::{AddressError, FederationError};

/// Separator between the name and domain parts of a federation address.
pub const SEPARATOR: char = '*';

/// A syntactically valid payment destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// A StrKey account id; needs no lookup.
    AccountId(String),
    /// `name*domain`, resolved through the domain's federation server.
    Federated { name: String, domain: String },
}

impl Address {
    pub fn parse(value: &str) -> Result<Self, FederationError> {
        let invalid = |reason| FederationError::InvalidAddress { address: value.to_owned(), reason };

        if !value.contains(SEPARATOR) {
            if !strkey::is_valid_account_id(value) {
                return Err(invalid(AddressError::InvalidAccountId));
            }
            return Ok(Address::AccountId(value.to_owned()));
        }

        let mut parts = value.split(SEPARATOR);
        let (Some(name), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid(AddressError::SeparatorCount));
        };
        if domain.is_empty() {
            return Err(invalid(AddressError::EmptyDomain));
        }
        if name.is_empty() {
            return Err(invalid(AddressError::EmptyName));
        }
        Ok(Address::Federated { name: name.to_owned(), domain: domain.to_owned() })
    }

    pub fn domain(&self) -> Option<&str> {
        match self {
            Address::AccountId(_) => None,
            Address::Federated { domain, .. } => Some(domain),
        }
    }
}

impl FromStr for Address {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::AccountId(id) => f.write_str(id),
            Address::Federated { name, domain } => write!(f, "{name}{SEPARATOR}{domain}"),
        }
    }
}
