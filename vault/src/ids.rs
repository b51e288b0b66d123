//! Validated identifiers.
//!
//! Vault alone defines what a role name or lease id looks like, so these only
//! reject what can never be valid: blank values, and for anything placed in a
//! URL path, values that would address a different path.

use crate::error::{VaultError, VaultResult};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $what:literal, $check:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a ", $what, ".")]
            ///
            /// # Errors
            ///
            /// Returns [`VaultError::InvalidInput`] if the value is empty or
            /// only whitespace.
            pub fn new(value: impl Into<String>) -> VaultResult<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(VaultError::invalid_input(concat!($what, " must not be empty")));
                }
                $check(&value)?;
                Ok(Self(value))
            }

            /// Borrow the raw value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = VaultError;

            fn try_from(value: &str) -> VaultResult<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = VaultError;

            fn try_from(value: String) -> VaultResult<Self> {
                Self::new(value)
            }
        }
    };
}

opaque_id!(
    /// Name of a role under a database secrets engine mount.
    ///
    /// Sent as a single percent-encoded path segment, so `/`, `?` and `#`
    /// stay part of the name. `.` and `..` are rejected since no encoding
    /// keeps them from being resolved as dot segments.
    RoleName,
    "role name",
    reject_dot_segment
);

opaque_id!(
    /// Lease id handed out by Vault when credentials were issued,
    /// e.g. `database/creds/readonly/2f6a614c-4aa2-7b19-24b9-ad944a8d4de6`.
    ///
    /// Only ever sent in a JSON body.
    LeaseId,
    "lease id",
    accept_any
);

impl RoleName {
    /// The name encoded as one URL path segment.
    #[must_use]
    pub fn path_segment(&self) -> String {
        encode_path_segment(&self.0)
    }
}

#[allow(clippy::unnecessary_wraps)]
const fn accept_any(_: &str) -> VaultResult<()> {
    Ok(())
}

fn reject_dot_segment(value: &str) -> VaultResult<()> {
    if is_dot_segment(value) {
        return Err(VaultError::invalid_input(format!(
            "role name {value:?} is a relative path segment"
        )));
    }
    Ok(())
}

fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0F)]));
        }
    }
    out
}

/// Mount point of a database secrets engine, e.g. `database`.
///
/// Surrounding slashes are stripped so paths can be joined with `/`.
/// Inner slashes separate nested mounts (`db/prod`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountPath(String);

impl MountPath {
    /// Create a mount path.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidInput`] if nothing but slashes or
    /// whitespace remains, or if a segment is empty, `.`, `..`, or holds
    /// `?`, `#` or `%`.
    pub fn new(value: impl AsRef<str>) -> VaultResult<Self> {
        let trimmed = value.as_ref().trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(VaultError::invalid_input("mount path must not be empty"));
        }
        let bad_segment = trimmed.split('/').any(|segment| {
            segment.is_empty()
                || is_dot_segment(segment)
                || segment.contains(['?', '#', '%'])
        });
        if bad_segment {
            return Err(VaultError::invalid_input(format!(
                "mount path {trimmed:?} is not a plain path"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a relative path below this mount.
    #[must_use]
    pub fn join(&self, rest: &str) -> String {
        format!("{}/{}", self.0, rest.trim_start_matches('/'))
    }
}

impl fmt::Display for MountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
