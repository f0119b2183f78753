//! Closed status enums for the two state machines (task and document review).
//!
//! Each variant's discriminant matches the seed data (1-based) of the
//! corresponding `*_statuses` lookup table, and each variant carries the
//! snake_case label used on the wire.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in seed-data order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Wire / log label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Parse a wire label.
            pub fn parse(label: &str) -> Option<Self> {
                match label {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a claimable task.
    TaskStatus {
        Pending = 1 => "pending",
        Published = 2 => "published",
        Claimed = 3 => "claimed",
        Accepted = 4 => "accepted",
        Completed = 5 => "completed",
        Cancelled = 6 => "cancelled",
    }
}

define_status_enum! {
    /// Lifecycle of an AI-drafted document under lawyer review.
    ReviewStatus {
        Pending = 1 => "pending",
        InReview = 2 => "in_review",
        Approved = 3 => "approved",
        Rejected = 4 => "rejected",
        ModificationRequested = 5 => "modification_requested",
        Modified = 6 => "modified",
        Authorized = 7 => "authorized",
        Sent = 8 => "sent",
        Cancelled = 9 => "cancelled",
    }
}
