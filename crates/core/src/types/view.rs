//! Screens the storefront can show.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The visible screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewState {
    /// Product grid. Initial screen.
    #[default]
    Shop,
    /// Inventory and settings management.
    Admin,
    /// Admin PIN prompt.
    Login,
    /// Customer account sign-in.
    UserLogin,
}

impl ViewState {
    /// Whether the navigation bar and footer are hidden on this screen.
    #[must_use]
    pub const fn hides_layout(self) -> bool {
        matches!(self, Self::Login | Self::UserLogin)
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shop => write!(f, "shop"),
            Self::Admin => write!(f, "admin"),
            Self::Login => write!(f, "login"),
            Self::UserLogin => write!(f, "user-login"),
        }
    }
}

impl core::str::FromStr for ViewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop" => Ok(Self::Shop),
            "admin" => Ok(Self::Admin),
            "login" => Ok(Self::Login),
            "user-login" => Ok(Self::UserLogin),
            _ => Err(format!("invalid view: {s}")),
        }
    }
}
