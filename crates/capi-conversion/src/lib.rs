//! This crate converts resources between the schema versions of a single
//! logical resource type, for example between the `v1alpha3`, `v1alpha4` and
//! `v1beta1` shapes of a `KubeadmControlPlane`.
//!
//! Conversions follow a hub-and-spoke topology: exactly one schema version is
//! the hub, and every other version (a spoke) only knows how to convert itself
//! to and from the hub. Converting between two spokes always takes two hops
//! through the hub. Supporting N versions thus requires N converter pairs
//! instead of N².
//!
//! ## Usage
//!
//! All shapes of a resource are collected in a single enum which implements
//! [`Convertible`]. Every spoke then registers a [`ConverterPair`] with a
//! [`RegistryBuilder`]. Once all pairs are registered, the frozen [`Registry`]
//! is handed to a [`Driver`] which performs the actual conversions.
//!
//! ```
//! use capi_conversion::{
//!     Convertible, ConverterError, ConverterPair, Driver, RegistryBuilder,
//! };
//! use capi_version::{Level, SchemaVersion};
//!
//! const V1ALPHA3: SchemaVersion = SchemaVersion::new(1, Some(Level::Alpha(3)));
//! const V1ALPHA4: SchemaVersion = SchemaVersion::new(1, Some(Level::Alpha(4)));
//!
//! #[derive(Debug, PartialEq)]
//! enum Machine {
//!     V1Alpha3 { provider_id: String },
//!     V1Alpha4 { provider_id: Option<String> },
//! }
//!
//! impl Convertible for Machine {
//!     fn schema_version(&self) -> SchemaVersion {
//!         match self {
//!             Self::V1Alpha3 { .. } => V1ALPHA3,
//!             Self::V1Alpha4 { .. } => V1ALPHA4,
//!         }
//!     }
//! }
//!
//! let pair = ConverterPair::new(
//!     V1ALPHA4,
//!     |machine: Machine| match machine {
//!         Machine::V1Alpha3 { provider_id } => Ok(Machine::V1Alpha4 {
//!             provider_id: Some(provider_id),
//!         }),
//!         other => Err(ConverterError::unexpected_input(V1ALPHA3, &other)),
//!     },
//!     |machine: Machine| match machine {
//!         Machine::V1Alpha4 { provider_id } => Ok(Machine::V1Alpha3 {
//!             provider_id: provider_id.unwrap_or_default(),
//!         }),
//!         other => Err(ConverterError::unexpected_input(V1ALPHA4, &other)),
//!     },
//! );
//!
//! let registry = RegistryBuilder::new(V1ALPHA4)
//!     .with(V1ALPHA3, pair)
//!     .expect("v1alpha3 is a valid spoke")
//!     .build();
//! let driver = Driver::new(registry);
//!
//! let machine = Machine::V1Alpha3 { provider_id: "docker://abc".to_owned() };
//! let converted = driver.convert_to(machine, &V1ALPHA4).expect("conversion succeeds");
//! assert_eq!(converted, Machine::V1Alpha4 { provider_id: Some("docker://abc".to_owned()) });
//! ```
//!
//! Fields which only exist in the hub are lost when converting down to an
//! older spoke. The [`preserve`] module stashes them in an annotation of the
//! down-converted object so that they survive a round trip.
use capi_version::SchemaVersion;

pub mod compatibility;
pub mod conditions;
mod converter;
mod driver;
pub mod dynamic;
mod hub;
pub mod preserve;
mod registry;

pub use converter::*;
pub use driver::*;
pub use hub::*;
pub use registry::*;

/// Implemented by the enum collecting every shape of one logical resource.
///
/// Each variant is tagged with the schema version it is shaped according to.
/// Converters and the [`Driver`] dispatch on this tag.
pub trait Convertible {
    /// Returns the schema version this value is shaped according to.
    fn schema_version(&self) -> SchemaVersion;
}
