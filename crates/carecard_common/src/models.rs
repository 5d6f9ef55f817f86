// --- File: crates/carecard_common/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role stored on a profile. Decides which portal a caller can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
    Franchise,
    Partner,
    CallCentre,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Franchise => "franchise",
            Role::Partner => "partner",
            Role::CallCentre => "call_centre",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            "franchise" => Ok(Role::Franchise),
            "partner" => Ok(Role::Partner),
            "call_centre" => Ok(Role::CallCentre),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [
            Role::Customer,
            Role::Admin,
            Role::Franchise,
            Role::Partner,
            Role::CallCentre,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
