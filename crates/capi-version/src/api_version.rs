use std::{cmp::Ordering, fmt::Display, str::FromStr};

use snafu::{ResultExt, Snafu};

use crate::{Group, ParseGroupError, ParseSchemaVersionError, SchemaVersion};

/// Error variants which can be encountered when creating a new [`ApiVersion`]
/// from unparsed input.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseApiVersionError {
    #[snafu(display("failed to parse schema version"))]
    ParseVersion { source: ParseSchemaVersionError },

    #[snafu(display("failed to parse group"))]
    ParseGroup { source: ParseGroupError },
}

/// An API version with the `(<GROUP>/)<VERSION>` format, for example
/// `controlplane.cluster.x-k8s.io/v1alpha4` or `v1`. This is the value of the
/// `apiVersion` field every serialized resource carries.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ApiVersion {
    pub group: Option<Group>,
    pub version: SchemaVersion,
}

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (group, version) = if let Some((group, version)) = input.split_once('/') {
            let group = Group::from_str(group).context(ParseGroupSnafu)?;

            (
                Some(group),
                SchemaVersion::from_str(version).context(ParseVersionSnafu)?,
            )
        } else {
            (
                None,
                SchemaVersion::from_str(input).context(ParseVersionSnafu)?,
            )
        };

        Ok(Self { group, version })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Versions of different groups are unrelated
        if self.group != other.group {
            return None;
        }

        self.version.partial_cmp(&other.version)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}/{version}", version = self.version),
            None => write!(f, "{version}", version = self.version),
        }
    }
}

impl ApiVersion {
    pub const fn new(group: Option<Group>, version: SchemaVersion) -> Self {
        Self { group, version }
    }
}
