//! Named capabilities that gate actions on printer records.

use serde::{Deserialize, Serialize};

/// A permission that can be granted to a user directly or through a group.
///
/// Superusers implicitly hold every permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create printer records.
    AddPrinter,
    /// Modify printer records.
    ChangePrinter,
    /// Remove printer records.
    DeletePrinter,
    /// View the printer listing.
    ViewPrinter,
}

impl Permission {
    /// All known permissions.
    pub const ALL: [Self; 4] = [
        Self::AddPrinter,
        Self::ChangePrinter,
        Self::DeletePrinter,
        Self::ViewPrinter,
    ];

    /// Fully qualified codename as stored in the database.
    #[must_use]
    pub const fn codename(self) -> &'static str {
        match self {
            Self::AddPrinter => "printers.add_printer",
            Self::ChangePrinter => "printers.change_printer",
            Self::DeletePrinter => "printers.delete_printer",
            Self::ViewPrinter => "printers.view_printer",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codename())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    /// Accepts either the qualified codename (`printers.delete_printer`) or the
    /// bare action name (`delete_printer`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("printers.").unwrap_or(s);
        match bare {
            "add_printer" => Ok(Self::AddPrinter),
            "change_printer" => Ok(Self::ChangePrinter),
            "delete_printer" => Ok(Self::DeletePrinter),
            "view_printer" => Ok(Self::ViewPrinter),
            _ => Err(format!("invalid permission: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codename_round_trips_through_from_str() {
        for permission in Permission::ALL {
            let parsed: Permission = permission.codename().parse().unwrap();
            assert_eq!(parsed, permission);
        }
    }

    #[test]
    fn test_bare_name_is_accepted() {
        assert_eq!(
            "delete_printer".parse::<Permission>().unwrap(),
            Permission::DeletePrinter
        );
    }

    #[test]
    fn test_unknown_permission_is_rejected() {
        assert!("printers.launch_printer".parse::<Permission>().is_err());
    }
}
