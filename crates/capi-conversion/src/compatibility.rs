//! Declares which external release versions every schema version supports.
//!
//! Upgrade orchestration uses this to decide which schema versions can drive
//! a cluster running (or being upgraded to) a given Kubernetes version. The
//! matrix is usually loaded from YAML:
//!
//! ```
//! use capi_conversion::compatibility::CompatibilityMatrix;
//! use capi_version::{Level, SchemaVersion};
//!
//! let matrix = CompatibilityMatrix::from_yaml_str(
//!     r#"
//! versions:
//!   v1alpha3: ">=1.16.0, <1.22.0"
//!   v1alpha4: ">=1.19.0, <1.24.0"
//! "#,
//! )
//! .expect("valid compatibility matrix");
//!
//! let supported = matrix
//!     .supported_schema_versions("v1.20.4+k3s1")
//!     .expect("valid version");
//! assert_eq!(supported, vec![
//!     SchemaVersion::new(1, Some(Level::Alpha(3))),
//!     SchemaVersion::new(1, Some(Level::Alpha(4))),
//! ]);
//! ```
use std::collections::BTreeMap;

use capi_version::{MajorMinorPatch, ParseVersionError, SchemaVersion, parse_tolerant};
use semver::VersionReq;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

#[derive(Debug, Snafu)]
pub enum CompatibilityError {
    #[snafu(display("failed to parse compatibility matrix"))]
    ParseMatrix { source: serde_yaml::Error },

    #[snafu(display("failed to parse requested version"))]
    ParseVersion { source: ParseVersionError },

    #[snafu(display("no compatibility range declared for schema version {version}"))]
    UnknownSchemaVersion { version: SchemaVersion },
}

/// Maps every schema version to the range of external versions it supports.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityMatrix {
    pub versions: BTreeMap<SchemaVersion, VersionReq>,
}

impl CompatibilityMatrix {
    pub fn from_yaml_str(input: &str) -> Result<Self, CompatibilityError> {
        serde_yaml::from_str(input).context(ParseMatrixSnafu)
    }

    /// Returns whether `schema_version` supports the external `version`,
    /// which is parsed tolerantly.
    pub fn supports(
        &self,
        schema_version: &SchemaVersion,
        version: &str,
    ) -> Result<bool, CompatibilityError> {
        let range = self
            .versions
            .get(schema_version)
            .context(UnknownSchemaVersionSnafu {
                version: *schema_version,
            })?;
        let version = parse_tolerant(version).context(ParseVersionSnafu)?;

        Ok(matches(range, version))
    }

    /// Returns all schema versions supporting the external `version`, in
    /// ascending order.
    pub fn supported_schema_versions(
        &self,
        version: &str,
    ) -> Result<Vec<SchemaVersion>, CompatibilityError> {
        let version = parse_tolerant(version).context(ParseVersionSnafu)?;

        let supported: Vec<_> = self
            .versions
            .iter()
            .filter(|(_, range)| matches(range, version))
            .map(|(schema_version, _)| *schema_version)
            .collect();

        debug!(%version, ?supported, "resolved supported schema versions");
        Ok(supported)
    }

    /// Returns the newest schema version supporting the external `version`.
    pub fn latest_supported(
        &self,
        version: &str,
    ) -> Result<Option<SchemaVersion>, CompatibilityError> {
        Ok(self.supported_schema_versions(version)?.pop())
    }
}

fn matches(range: &VersionReq, version: MajorMinorPatch) -> bool {
    range.matches(&version.into())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn matrix() -> CompatibilityMatrix {
        CompatibilityMatrix::from_yaml_str(
            r#"
versions:
  v1alpha3: ">=1.16.0, <1.22.0"
  v1alpha4: ">=1.19.0, <1.24.0"
  v1beta1: ">=1.22.0"
"#,
        )
        .expect("valid compatibility matrix")
    }

    fn schema_version(input: &str) -> SchemaVersion {
        SchemaVersion::from_str(input).expect("valid schema version")
    }

    #[rstest]
    #[case("v1alpha3", "v1.16.6+foobar-0", true)]
    #[case("v1alpha3", "1.21.14", true)]
    #[case("v1alpha3", "v1.22.0", false)]
    #[case("v1alpha4", "v1.2.16_foo-1", false)]
    #[case("v1beta1", "1.30.2", true)]
    fn supports(
        matrix: CompatibilityMatrix,
        #[case] schema: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let supported = matrix
            .supports(&schema_version(schema), version)
            .expect("known schema version and valid version");
        assert_eq!(supported, expected);
    }

    #[rstest]
    #[case("v1.15.0", &[])]
    #[case("v1.20.4+k3s1", &["v1alpha3", "v1alpha4"])]
    #[case("1.23.1", &["v1alpha4", "v1beta1"])]
    fn supported_schema_versions(
        matrix: CompatibilityMatrix,
        #[case] version: &str,
        #[case] expected: &[&str],
    ) {
        let expected: Vec<_> = expected.iter().map(|v| schema_version(v)).collect();
        let supported = matrix
            .supported_schema_versions(version)
            .expect("valid version");
        assert_eq!(supported, expected);
    }

    #[rstest]
    fn latest_supported(matrix: CompatibilityMatrix) {
        let latest = matrix.latest_supported("v1.21.2").expect("valid version");
        assert_eq!(latest, Some(schema_version("v1alpha4")));
    }

    #[rstest]
    fn malformed_version(matrix: CompatibilityMatrix) {
        let err = matrix
            .supported_schema_versions("1.16+foobar-0")
            .expect_err("patch version is missing");
        assert!(matches!(err, CompatibilityError::ParseVersion { .. }));
    }

    #[rstest]
    fn unknown_schema_version(matrix: CompatibilityMatrix) {
        let err = matrix
            .supports(&schema_version("v2"), "1.30.0")
            .expect_err("v2 has no declared range");
        assert!(matches!(err, CompatibilityError::UnknownSchemaVersion { .. }));
    }

    #[test]
    fn invalid_schema_version_key() {
        CompatibilityMatrix::from_yaml_str("versions:\n  v1gamma1: \">=1.0.0\"\n")
            .expect_err("v1gamma1 is not a schema version");
    }
}
