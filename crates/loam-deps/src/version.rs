//! Four-part version numbers for manifest assets
//!
//! Asset entries in a deps manifest carry `assemblyVersion` and `fileVersion`
//! strings in `MAJOR.MINOR.BUILD.REVISION` form. Parsing is best-effort:
//! callers substitute the zero version when a manifest carries a malformed or
//! absent value.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version format: {0}")]
    InvalidVersion(String),
}

/// Four-part numeric version (MAJOR.MINOR.BUILD.REVISION)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a version string
    ///
    /// Accepts one to four dot-separated numeric components; omitted
    /// components are zero.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::InvalidVersion(s.to_string()));
        }

        let components: Vec<&str> = s.split('.').collect();
        if components.len() > 4 {
            return Err(VersionError::InvalidVersion(format!(
                "Expected at most four components, got '{}'",
                s
            )));
        }

        let mut parts = [0u32; 4];
        for (i, component) in components.iter().enumerate() {
            parts[i] = component.parse().map_err(|_| {
                VersionError::InvalidVersion(format!(
                    "Invalid version component '{}' in '{}'",
                    component, s
                ))
            })?;
        }

        Ok(Version::new(parts[0], parts[1], parts[2], parts[3]))
    }

    /// Check if all components are zero
    pub fn is_zero(&self) -> bool {
        *self == Version::default()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
