use std::{cmp::Ordering, fmt::Display, num::ParseIntError, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{Level, ParseLevelError};

#[cfg(feature = "serde")]
mod serde;

static SCHEMA_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(?P<major>\d+)(?P<level>[a-z0-9][a-z0-9-]{0,60}[a-z0-9])?$")
        .expect("failed to compile schema version regex")
});

/// Error variants which can be encountered when creating a new
/// [`SchemaVersion`] from unparsed input.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseSchemaVersionError {
    #[snafu(display(
        "invalid schema version format. Input is empty, contains non-ASCII characters or contains more than 63 characters"
    ))]
    InvalidFormat,

    #[snafu(display("failed to parse major version"))]
    ParseMajorVersion { source: ParseIntError },

    #[snafu(display("failed to parse version level"))]
    ParseLevel { source: ParseLevelError },
}

/// Names one generation of a resource's shape, following the
/// `v<MAJOR>(alpha<LEVEL>|beta<LEVEL>)` format, for example `v1alpha3`,
/// `v1beta1` or `v1`.
///
/// Schema versions are ordered by major version first. Within the same major
/// version, alpha levels come before beta levels, which come before the stable
/// version.
///
/// ### See
///
/// - <https://kubernetes.io/docs/reference/using-api/#api-versioning>
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SchemaVersion {
    pub major: u64,
    pub level: Option<Level>,
}

impl FromStr for SchemaVersion {
    type Err = ParseSchemaVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let captures = SCHEMA_VERSION_REGEX
            .captures(input)
            .context(InvalidFormatSnafu)?;

        let major = captures
            .name("major")
            .context(InvalidFormatSnafu)?
            .as_str()
            .parse::<u64>()
            .context(ParseMajorVersionSnafu)?;

        let level = captures
            .name("level")
            .map(|level| Level::from_str(level.as_str()))
            .transpose()
            .context(ParseLevelSnafu)?;

        Ok(Self { major, level })
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (&self.level, &other.level) {
            (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.level {
            Some(level) => write!(f, "v{major}{level}", major = self.major),
            None => write!(f, "v{major}", major = self.major),
        }
    }
}

impl SchemaVersion {
    pub const fn new(major: u64, level: Option<Level>) -> Self {
        Self { major, level }
    }
}
