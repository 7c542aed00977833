use std::collections::BTreeMap;

use capi_version::SchemaVersion;
use snafu::{Snafu, ensure};
use tracing::{debug, info};

use crate::{Converter, ConverterPair, HubConverter};

/// Error variants which can be encountered while registering converter pairs.
///
/// These errors only occur during setup. A registry which failed to register
/// any of its pairs must not be used, start-up should be aborted instead.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum RegistryError {
    #[snafu(display("a converter pair for {version} is already registered"))]
    DuplicateRegistration { version: SchemaVersion },

    #[snafu(display(
        "cannot register {version} converting to {declared_hub}, all converters must convert to the hub {hub}"
    ))]
    InvalidTopology {
        version: SchemaVersion,
        declared_hub: SchemaVersion,
        hub: SchemaVersion,
    },
}

/// Returned when looking up a version which is neither the hub nor a
/// registered spoke.
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("no converter pair registered for {version} (hub is {hub})"))]
pub struct UnknownVersionError {
    pub version: SchemaVersion,
    pub hub: SchemaVersion,
}

/// Collects the [`ConverterPair`]s of all spoke versions.
///
/// The hub is chosen when creating the builder and cannot be changed
/// afterwards. Calling [`RegistryBuilder::build`] consumes the builder, which
/// makes registering pairs after setup impossible.
#[derive(Debug)]
pub struct RegistryBuilder<R> {
    hub: SchemaVersion,
    spokes: BTreeMap<SchemaVersion, ConverterPair<R>>,
}

impl<R> RegistryBuilder<R> {
    pub fn new(hub: SchemaVersion) -> Self {
        Self {
            hub,
            spokes: BTreeMap::new(),
        }
    }

    /// Registers the hub-facing converters of the spoke `version`.
    ///
    /// Registering the hub itself or a pair converting to any other version
    /// than the hub fails with [`RegistryError::InvalidTopology`]. Registering
    /// the same version twice fails with
    /// [`RegistryError::DuplicateRegistration`].
    pub fn register(
        &mut self,
        version: SchemaVersion,
        pair: ConverterPair<R>,
    ) -> Result<&mut Self, RegistryError> {
        ensure!(
            version != self.hub && *pair.hub() == self.hub,
            InvalidTopologySnafu {
                version,
                declared_hub: *pair.hub(),
                hub: self.hub,
            }
        );
        ensure!(
            !self.spokes.contains_key(&version),
            DuplicateRegistrationSnafu { version }
        );

        debug!(%version, hub = %self.hub, "registered converter pair");
        self.spokes.insert(version, pair);

        Ok(self)
    }

    /// Same as [`RegistryBuilder::register`], but takes and returns the
    /// builder by value to allow chaining.
    pub fn with(
        mut self,
        version: SchemaVersion,
        pair: ConverterPair<R>,
    ) -> Result<Self, RegistryError> {
        self.register(version, pair)?;
        Ok(self)
    }

    /// Freezes the registry. The returned [`Registry`] is read-only.
    pub fn build(self) -> Registry<R> {
        info!(
            hub = %self.hub,
            spokes = self.spokes.len(),
            "built conversion registry"
        );

        Registry {
            hub: self.hub,
            spokes: self.spokes,
        }
    }
}

/// The read-only mapping of schema versions to their converters.
///
/// A registry has no mutating methods and can be shared between any number
/// of threads (for example by wrapping it in an [`Arc`](std::sync::Arc)) as
/// long as the registered converters are [`Send`] and [`Sync`], which
/// [`ConverterPair`] requires.
#[derive(Debug)]
pub struct Registry<R> {
    hub: SchemaVersion,
    spokes: BTreeMap<SchemaVersion, ConverterPair<R>>,
}

impl<R> Registry<R> {
    pub fn hub(&self) -> &SchemaVersion {
        &self.hub
    }

    /// Resolves the converter for `version`. The hub resolves to the identity
    /// [`HubConverter`].
    pub fn lookup(&self, version: &SchemaVersion) -> Result<Converter<'_, R>, UnknownVersionError> {
        if *version == self.hub {
            return Ok(Converter::Hub(HubConverter));
        }

        self.spokes
            .get(version)
            .map(Converter::Spoke)
            .ok_or(UnknownVersionError {
                version: *version,
                hub: self.hub,
            })
    }

    pub fn contains(&self, version: &SchemaVersion) -> bool {
        *version == self.hub || self.spokes.contains_key(version)
    }

    /// Returns the hub and all spoke versions in ascending order.
    pub fn versions(&self) -> Vec<SchemaVersion> {
        let mut versions: Vec<_> = self.spokes.keys().copied().collect();
        versions.push(self.hub);
        versions.sort();
        versions
    }
}
