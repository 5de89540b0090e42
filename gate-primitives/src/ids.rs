//! Action and rule identifier types.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 128;

/// Name of an action an agent may propose, e.g. `book_hotel`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionName(String);

impl ActionName {
    /// Creates an action name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidActionName`] if the name is empty, too long, or
    /// contains unsupported characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match check_identifier(&name) {
            Some(reason) => Err(Error::InvalidActionName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the action name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a rule, unique within the rule list of one action.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleName(String);

impl RuleName {
    /// Creates a rule name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleName`] if the name is empty, too long, or
    /// contains unsupported characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match check_identifier(&name) {
            Some(reason) => Err(Error::InvalidRuleName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the rule name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_name_traits {
    ($ty:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

impl_name_traits!(ActionName);
impl_name_traits!(RuleName);

/// Returns the rejection reason, or `None` when the identifier is acceptable.
fn check_identifier(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name cannot be empty".into());
    }

    if name.len() > MAX_NAME_LEN {
        return Some(format!("name length must be <= {MAX_NAME_LEN}"));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
    {
        return Some("name must contain ASCII alphanumeric, underscore, dash, dot, or colon".into());
    }

    None
}
