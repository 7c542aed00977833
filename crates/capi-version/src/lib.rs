//! This library provides the two kinds of versions the conversion machinery
//! deals with:
//!
//! - Schema versions, which name one generation of a resource's shape. They
//!   follow the `v<MAJOR>(alpha<LEVEL>|beta<LEVEL>)` format, for example
//!   `v1alpha3` or `v1beta1`, and can optionally be prefixed with an API group,
//!   like `controlplane.cluster.x-k8s.io/v1alpha4`.
//! - Release versions of external software (Kubernetes, etcd, CoreDNS, ...),
//!   which are reduced to a `<MAJOR>.<MINOR>.<PATCH>` triple. These strings
//!   are frequently not valid SemVer: registries append OCI style tags like
//!   `v1.2.16_foo-1`, so the parser extracts the triple and discards the rest.
//!
//! ## Usage
//!
//! ```
//! use capi_version::{MajorMinorPatch, parse_strict, parse_tolerant};
//!
//! let version = parse_strict("v1.2.16_foo-1").expect("valid version with v prefix");
//! assert_eq!(version, MajorMinorPatch::new(1, 2, 16));
//!
//! // The tolerant variant doesn't require the leading v.
//! let version = parse_tolerant("1.16.6+foobar-0").expect("valid version");
//! assert_eq!(version.to_string(), "1.16.6");
//! ```
//!
//! Schema versions are parsed using Rust's standard
//! [`FromStr`](std::str::FromStr) trait.
//!
//! ```
//! use capi_version::{ApiVersion, Level, SchemaVersion};
//!
//! let version: SchemaVersion = "v1alpha3".parse().expect("valid schema version");
//! assert_eq!(version, SchemaVersion::new(1, Some(Level::Alpha(3))));
//!
//! let api_version: ApiVersion = "controlplane.cluster.x-k8s.io/v1alpha4"
//!     .parse()
//!     .expect("valid API version");
//! assert_eq!(api_version.version, SchemaVersion::new(1, Some(Level::Alpha(4))));
//! ```

// NOTE: Fixed in https://github.com/la10736/rstest/pull/244 but not yet
// released.
#[cfg(test)]
use rstest_reuse::{self};

mod api_version;
mod group;
mod level;
mod major_minor_patch;
mod schema_version;

pub use api_version::*;
pub use group::*;
pub use level::*;
pub use major_minor_patch::*;
pub use schema_version::*;
