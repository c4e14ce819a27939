use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }

            /// Zero is reserved as the "none" marker in stored records.
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Type-safe identifier for Cars.
    CarId
);
entity_id!(
    /// Type-safe identifier for Users.
    UserId
);
entity_id!(
    /// Identifier of one lending episode, issued by the
    /// [`IdentifierAllocator`](crate::repository::IdentifierAllocator). A travel log
    /// reuses the id of the borrow it closes.
    BorrowId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_as_plain_numbers() {
        assert_eq!(CarId(7).to_string(), "7");
        assert_eq!(serde_json::to_string(&UserId(3)).unwrap(), "3");
    }

    #[test]
    fn test_parse_from_argument() {
        assert_eq!(" 12".parse::<BorrowId>(), Ok(BorrowId(12)));
        assert!("twelve".parse::<CarId>().is_err());
        assert!("-1".parse::<CarId>().is_err());
    }
}
