use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::CorectlError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A CoreOS release channel.
///
/// ## Examples
///
/// ```
/// use corectl::config::Channel;
///
/// assert_eq!("Beta".parse::<Channel>().unwrap(), Channel::Beta);
/// assert_eq!(Channel::Stable.to_string(), "stable");
/// assert!("nightly".parse::<Channel>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// The alpha channel.
    #[default]
    Alpha,

    /// The beta channel.
    Beta,

    /// The stable channel.
    Stable,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Channel {
    /// Returns the channel name as used in image paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Stable => "stable",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for Channel {
    type Err = CorectlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            "stable" => Ok(Self::Stable),
            _ => Err(CorectlError::custom(anyhow::anyhow!(
                "unknown channel: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
