use std::{fmt::Display, num::ParseIntError, str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

// Every group is optional, so this regex matches any input. This lets the
// parser report which component is missing instead of a generic mismatch.
static RELEASE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>v)?(?P<major>[0-9]+)?(?:\.(?P<minor>[0-9]+)?)?(?:\.(?P<patch>[0-9]+)?)?(?P<suffix>.*)$",
    )
    .expect("failed to compile release version regex")
});

/// Characters which start the discarded suffix, for example `+` in
/// `v1.16.6+foobar-0` or `_` in the OCI compatible `v1.2.16_foo-1`.
const SUFFIX_SEPARATORS: [char; 3] = ['+', '_', '-'];

/// The numeric components of a release version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Component {
    Major,
    Minor,
    Patch,
}

/// Error variants which can be encountered when parsing a [`MajorMinorPatch`]
/// from unparsed input. Every variant describes a malformed version, the input
/// will never parse on retry.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseVersionError {
    #[snafu(display("malformed version {input:?}: missing the leading \"v\""))]
    MissingPrefix { input: String },

    #[snafu(display("malformed version {input:?}: missing or non-numeric {component} version"))]
    MissingComponent { input: String, component: Component },

    #[snafu(display("malformed version {input:?}: failed to parse {component} version"))]
    InvalidComponent {
        source: ParseIntError,
        input: String,
        component: Component,
    },

    #[snafu(display(
        "malformed version {input:?}: unexpected {suffix:?} after the patch version, expected one of '+', '_' or '-'"
    ))]
    InvalidSuffix { input: String, suffix: String },
}

/// A `<MAJOR>.<MINOR>.<PATCH>` triple extracted from the release version of
/// some external software.
///
/// Pre-release identifiers, build metadata and free-form tags are not part of
/// the triple. Ordering is lexicographic on `(major, minor, patch)`.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MajorMinorPatch {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl MajorMinorPatch {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// Parses the triple out of `input`, which must start with a `v`.
///
/// Everything following the patch version, starting at the first `+`, `_` or
/// `-`, is discarded without validation.
///
/// ```
/// use capi_version::{MajorMinorPatch, parse_strict};
///
/// assert_eq!(parse_strict("v1.2.16_foo-1"), Ok(MajorMinorPatch::new(1, 2, 16)));
/// assert!(parse_strict("1.4.7").is_err());
/// ```
pub fn parse_strict(input: &str) -> Result<MajorMinorPatch, ParseVersionError> {
    parse(input, true)
}

/// Same as [`parse_strict`], but the leading `v` is optional.
///
/// ```
/// use capi_version::{MajorMinorPatch, parse_tolerant};
///
/// assert_eq!(parse_tolerant("1.16.6+foobar-0"), Ok(MajorMinorPatch::new(1, 16, 6)));
/// assert!(parse_tolerant("1.16+foobar-0").is_err());
/// ```
pub fn parse_tolerant(input: &str) -> Result<MajorMinorPatch, ParseVersionError> {
    parse(input, false)
}

fn parse(input: &str, require_prefix: bool) -> Result<MajorMinorPatch, ParseVersionError> {
    let captures = RELEASE_VERSION_REGEX
        .captures(input)
        .context(MissingComponentSnafu {
            input,
            component: Component::Major,
        })?;

    ensure!(
        !require_prefix || captures.name("prefix").is_some(),
        MissingPrefixSnafu { input }
    );

    let major = parse_component(&captures, input, Component::Major)?;
    let minor = parse_component(&captures, input, Component::Minor)?;
    let patch = parse_component(&captures, input, Component::Patch)?;

    let suffix = captures.name("suffix").map_or("", |suffix| suffix.as_str());
    ensure!(
        suffix.is_empty() || suffix.starts_with(SUFFIX_SEPARATORS),
        InvalidSuffixSnafu { input, suffix }
    );

    Ok(MajorMinorPatch::new(major, minor, patch))
}

fn parse_component(
    captures: &Captures<'_>,
    input: &str,
    component: Component,
) -> Result<u64, ParseVersionError> {
    let name = match component {
        Component::Major => "major",
        Component::Minor => "minor",
        Component::Patch => "patch",
    };

    captures
        .name(name)
        .context(MissingComponentSnafu { input, component })?
        .as_str()
        .parse::<u64>()
        .context(InvalidComponentSnafu { input, component })
}

impl FromStr for MajorMinorPatch {
    type Err = ParseVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_tolerant(input)
    }
}

impl Display for MajorMinorPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{major}.{minor}.{patch}",
            major = self.major,
            minor = self.minor,
            patch = self.patch
        )
    }
}

impl From<MajorMinorPatch> for semver::Version {
    fn from(value: MajorMinorPatch) -> Self {
        Self::new(value.major, value.minor, value.patch)
    }
}
