//! Typed resource identifier macros
//!
//! Every resource kind declares its own identifier newtype so the type
//! system rules out cross-kind mixups even when the raw representations
//! match. String-backed identifiers reject empty, blank and
//! whitespace-padded input at construction time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! oceankit_core::string_id!(ClusterId);
//! oceankit_core::int_id!(DropletId);
//!
//! let cluster = ClusterId::new("8d91899c-0739-4a1a-acc5")?;
//! let droplet = DropletId::new(3164444);
//! ```

/// Declare a string-backed identifier newtype for one resource kind.
///
/// The constructor validates its input: empty strings, all-whitespace
/// strings and values with surrounding whitespace are rejected with
/// [`Error::Validation`](crate::Error). The raw value round-trips through
/// `Display` and `as_str`.
#[macro_export]
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw server identifier, rejecting blank input.
            pub fn new(raw: impl Into<String>) -> $crate::Result<Self> {
                let raw = raw.into();
                if raw.is_empty() {
                    return Err($crate::Error::validation(concat!(
                        stringify!($name),
                        " must not be empty"
                    )));
                }
                if raw.trim() != raw {
                    return Err($crate::Error::validation(format!(
                        concat!(stringify!($name), " must not carry surrounding whitespace: {:?}"),
                        raw
                    )));
                }
                Ok(Self(raw))
            }

            /// The raw identifier as the server knows it.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                Self::new(s)
            }
        }
    };
}

/// Declare an integer-backed identifier newtype for one resource kind.
#[macro_export]
macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw numeric server identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw identifier as the server knows it.
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    string_id!(TestStringId);
    int_id!(TestIntId);

    #[test]
    fn string_id_rejects_blank_input() {
        assert!(TestStringId::new("").is_err());
        assert!(TestStringId::new("   ").is_err());
        assert!(TestStringId::new("  id  ").is_err());
        assert!(TestStringId::new("id\n").is_err());
    }

    #[test]
    fn string_id_round_trips() {
        let id = TestStringId::new("abc-123").unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!("abc-123".parse::<TestStringId>().unwrap(), id);
    }

    #[test]
    fn int_id_round_trips() {
        let id = TestIntId::new(3164444);
        assert_eq!(id.value(), 3164444);
        assert_eq!(id.to_string(), "3164444");
        assert_eq!(TestIntId::from(3164444), id);
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = TestStringId::new("abc-123").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("abc-123"));

        let id = TestIntId::new(7);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(7));
    }
}
