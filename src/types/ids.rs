//! Server-assigned opaque identifiers

use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 8]);

        impl $name {
            /// Wrap the raw id bytes as received from the server
            pub const fn new(bytes: [u8; 8]) -> Self {
                Self(bytes)
            }

            /// Build an id from its little-endian integer form
            pub const fn from_u64(value: u64) -> Self {
                Self(value.to_le_bytes())
            }

            /// Raw id bytes
            pub fn as_bytes(&self) -> &[u8; 8] {
                &self.0
            }

            /// Little-endian integer form of the id
            pub fn to_u64(&self) -> u64 {
                u64::from_le_bytes(self.0)
            }
        }

        impl From<[u8; 8]> for $name {
            fn from(bytes: [u8; 8]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }
    };
}

opaque_id!(
    /// Id of a statement prepared on the server
    StatementId
);

opaque_id!(
    /// Id of an open result set on the server
    ResultSetId
);

opaque_id!(
    /// Id of a LOB locator handed out in a write-lob reply
    LocatorId
);
