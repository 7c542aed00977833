use capi_version::SchemaVersion;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{instrument, trace};

use crate::{Converter, ConverterError, Convertible, Registry, UnknownVersionError};

/// The two legs of a conversion through the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Leg {
    ToHub,
    FromHub,
}

#[derive(Debug, Snafu)]
pub enum ConversionError {
    #[snafu(display("failed to resolve converter"))]
    UnknownVersion { source: UnknownVersionError },

    #[snafu(display(
        "the object is tagged as {actual}, but was requested to be converted from {expected}"
    ))]
    SourceVersionMismatch {
        expected: SchemaVersion,
        actual: SchemaVersion,
    },

    #[snafu(display("failed to convert from {from} to {to} on the {leg} leg"))]
    ConversionFailed {
        source: ConverterError,
        from: SchemaVersion,
        to: SchemaVersion,
        leg: Leg,
    },

    #[snafu(display(
        "the {leg} converter for {from} to {to} returned an object of version {actual}"
    ))]
    UnexpectedOutputVersion {
        from: SchemaVersion,
        to: SchemaVersion,
        leg: Leg,
        actual: SchemaVersion,
    },
}

/// Converts resources between any two versions known to its [`Registry`].
///
/// Conversions are synchronous and never retried. The driver holds no state
/// besides the read-only registry, so it can serve concurrent conversions
/// from any number of threads.
#[derive(Debug)]
pub struct Driver<R> {
    registry: Registry<R>,
}

impl<R> From<Registry<R>> for Driver<R> {
    fn from(registry: Registry<R>) -> Self {
        Self::new(registry)
    }
}

impl<R> Driver<R> {
    pub fn new(registry: Registry<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }
}

impl<R> Driver<R>
where
    R: Convertible,
{
    /// Converts `resource` from `source` to `target`.
    ///
    /// Converting to the same version returns the resource untouched without
    /// invoking any converter. Otherwise, the resource travels through the
    /// hub, which takes a single hop if either version is the hub and two hops
    /// otherwise. Both converters are resolved before any of them runs, the
    /// first failure is returned and no partially converted value is ever
    /// handed out.
    ///
    /// The resource is consumed, also if the conversion fails. Callers which
    /// still need it after a rejected conversion either keep a clone or check
    /// the request with [`Driver::validate`] first.
    #[instrument(skip_all, fields(source = %source, target = %target))]
    pub fn convert(
        &self,
        resource: R,
        source: &SchemaVersion,
        target: &SchemaVersion,
    ) -> Result<R, ConversionError> {
        let Some((from, to)) = self.resolve(&resource, source, target)? else {
            trace!("source and target version are equal, skipping conversion");
            return Ok(resource);
        };

        let hub = self.registry.hub();
        let resource = if from.is_hub() {
            resource
        } else {
            trace!(%hub, "converting to hub");
            let converted = from.to_hub(resource).context(ConversionFailedSnafu {
                from: *source,
                to: *target,
                leg: Leg::ToHub,
            })?;
            check_output(&converted, hub, source, target, Leg::ToHub)?;
            converted
        };

        if to.is_hub() {
            return Ok(resource);
        }

        trace!(%hub, "converting from hub");
        let converted = to.from_hub(resource).context(ConversionFailedSnafu {
            from: *source,
            to: *target,
            leg: Leg::FromHub,
        })?;
        check_output(&converted, target, source, target, Leg::FromHub)?;

        Ok(converted)
    }

    /// Runs the checks [`Driver::convert`] performs before invoking any
    /// converter, without consuming `resource`: the version tag of `resource`
    /// must equal `source`, and both versions must be known to the registry.
    ///
    /// A request passing these checks can still fail in a converter.
    pub fn validate(
        &self,
        resource: &R,
        source: &SchemaVersion,
        target: &SchemaVersion,
    ) -> Result<(), ConversionError> {
        self.resolve(resource, source, target).map(|_| ())
    }

    /// Resolves the converters of both versions. Returns [`None`] if the
    /// versions are equal and no converter has to run.
    fn resolve(
        &self,
        resource: &R,
        source: &SchemaVersion,
        target: &SchemaVersion,
    ) -> Result<Option<(Converter<'_, R>, Converter<'_, R>)>, ConversionError> {
        let actual = resource.schema_version();
        ensure!(
            actual == *source,
            SourceVersionMismatchSnafu {
                expected: *source,
                actual,
            }
        );

        if source == target {
            return Ok(None);
        }

        let from = self.registry.lookup(source).context(UnknownVersionSnafu)?;
        let to = self.registry.lookup(target).context(UnknownVersionSnafu)?;

        Ok(Some((from, to)))
    }

    /// Converts `resource` to `target`, taking the source version from the
    /// resource itself.
    pub fn convert_to(&self, resource: R, target: &SchemaVersion) -> Result<R, ConversionError> {
        let source = resource.schema_version();
        self.convert(resource, &source, target)
    }
}

fn check_output<R: Convertible>(
    converted: &R,
    expected: &SchemaVersion,
    from: &SchemaVersion,
    to: &SchemaVersion,
    leg: Leg,
) -> Result<(), ConversionError> {
    let actual = converted.schema_version();
    ensure!(
        actual == *expected,
        UnexpectedOutputVersionSnafu {
            from: *from,
            to: *to,
            leg,
            actual,
        }
    );

    Ok(())
}
