//! Status enums stored as lowercase text.

/// Declares a text-backed status enum with `as_str`, `FromStr` and serde.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "invalid {} '{}', expected one of: {}",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

status_enum!(
    /// Lifecycle of an e-card membership.
    MembershipStatus {
        Active => "active",
        Expired => "expired",
        Cancelled => "cancelled",
    }
);

status_enum!(
    PaymentStatus {
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
);

status_enum!(
    ServiceRequestStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

status_enum!(
    ClaimStatus {
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
        Paid => "paid",
    }
);

status_enum!(
    WithdrawalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

status_enum!(
    FranchiseStatus {
        Active => "active",
        Suspended => "suspended",
    }
);

status_enum!(
    /// Direction of a wallet transaction.
    TransactionKind {
        Credit => "credit",
        Debit => "debit",
    }
);
