//! Format version, build type and byte order metadata.
//!
//! Nearly every decoding branch depends on these, so they travel together
//! as a [`FormatInfo`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A four-part engine version: `major.minor.patch` plus build number.
///
/// Ordering is lexicographic over the four parts, so
/// `Version::new(3, 5, 0, 0) <= v` holds for every `3.5.x` release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

/// Release channel letter embedded in version strings (`5.6.0f3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildType {
    Alpha,
    Beta,
    China,
    #[default]
    Final,
    Patch,
    Experimental,
}

impl BuildType {
    #[must_use]
    pub fn is_patch(self) -> bool {
        self == Self::Patch
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Self::Alpha),
            'b' => Some(Self::Beta),
            'c' => Some(Self::China),
            'f' => Some(Self::Final),
            'p' => Some(Self::Patch),
            'x' => Some(Self::Experimental),
            _ => None,
        }
    }
}

/// Byte order of multi-byte scalars in the source container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Failure to parse a version string or byte order marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
    #[error("malformed version string {0:?}")]
    Malformed(String),
    #[error("unknown build type {1:?} in version string {0:?}")]
    UnknownBuildType(String, char),
    #[error("unknown byte order marker {0:?}, expected \"<\" or \">\"")]
    UnknownByteOrder(String),
}

/// A version string such as `2017.3.1p1`, split into its numeric version and
/// build type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EngineVersion {
    pub version: Version,
    pub build_type: BuildType,
}

impl FromStr for EngineVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseVersionError::Malformed(s.to_string());

        let mut parts = s.trim().splitn(3, '.');
        let major = parts.next().ok_or_else(malformed)?;
        let minor = parts.next().ok_or_else(malformed)?;
        let rest = parts.next().unwrap_or("0");

        let major = major.parse().map_err(|_| malformed())?;
        let minor = minor.parse().map_err(|_| malformed())?;

        // The last part is `<patch>[<letter><build>]`, e.g. `1p1` or `0f3`.
        let split = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (patch, suffix) = rest.split_at(split);
        let patch = patch.parse().map_err(|_| malformed())?;

        let mut chars = suffix.chars();
        let (build_type, build) = match chars.next() {
            None => (BuildType::Final, 0),
            Some(letter) => {
                let build_type = BuildType::from_letter(letter)
                    .ok_or_else(|| ParseVersionError::UnknownBuildType(s.to_string(), letter))?;
                // Some builds carry a trailing tag (`2019.4.1f1c1`); only
                // the leading digits count.
                let digits: String = chars.take_while(char::is_ascii_digit).collect();
                let build = if digits.is_empty() {
                    0
                } else {
                    digits.parse().map_err(|_| malformed())?
                };
                (build_type, build)
            }
        };

        Ok(Self {
            version: Version::new(major, minor, patch, build),
            build_type,
        })
    }
}

impl FromStr for ByteOrder {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Self::Little),
            ">" => Ok(Self::Big),
            other => Err(ParseVersionError::UnknownByteOrder(other.to_string())),
        }
    }
}

/// Everything about the source that decoding decisions depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatInfo {
    pub version: Version,
    pub build_type: BuildType,
    pub byte_order: ByteOrder,
}

impl FormatInfo {
    #[must_use]
    pub const fn new(version: Version, byte_order: ByteOrder) -> Self {
        Self {
            version,
            build_type: BuildType::Final,
            byte_order,
        }
    }

    #[must_use]
    pub const fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }
}
