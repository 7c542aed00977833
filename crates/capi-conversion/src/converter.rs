use std::fmt::Debug;

use capi_version::SchemaVersion;
use snafu::Snafu;

use crate::Convertible;

/// Error variants a single converter function can fail with.
///
/// A failing converter signals a structural incompatibility between two
/// shapes, for example a required field which the source shape cannot supply.
/// These failures are never transient.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConverterError {
    #[snafu(display("required field {field:?} has no value and no default"))]
    MissingField { field: String },

    #[snafu(display("field {field:?} holds the unrepresentable value {value:?}: {reason}"))]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    #[snafu(display("converter for {expected} was handed an object of version {actual}"))]
    UnexpectedInput {
        expected: SchemaVersion,
        actual: SchemaVersion,
    },

    #[snafu(display("failed to serialize data preserved for a later round trip"))]
    SerializePreservedData { source: serde_json::Error },

    #[snafu(display("failed to deserialize data preserved in annotation {annotation:?}"))]
    DeserializePreservedData {
        source: serde_json::Error,
        annotation: String,
    },
}

impl ConverterError {
    /// Shorthand for the catch-all arm of a converter matching on the resource
    /// enum.
    pub fn unexpected_input(expected: SchemaVersion, actual: &impl Convertible) -> Self {
        Self::UnexpectedInput {
            expected,
            actual: actual.schema_version(),
        }
    }
}

type ConvertFn<R> = Box<dyn Fn(R) -> Result<R, ConverterError> + Send + Sync>;

/// The two hub-facing conversion functions a spoke version supplies.
///
/// Both functions must be pure: no I/O, no side effects besides producing the
/// converted value or failing. The pair declares which hub it converts to,
/// which is validated against the hub of the registry it is registered with.
pub struct ConverterPair<R> {
    hub: SchemaVersion,
    to_hub: ConvertFn<R>,
    from_hub: ConvertFn<R>,
}

impl<R> ConverterPair<R> {
    pub fn new<T, F>(hub: SchemaVersion, to_hub: T, from_hub: F) -> Self
    where
        T: Fn(R) -> Result<R, ConverterError> + Send + Sync + 'static,
        F: Fn(R) -> Result<R, ConverterError> + Send + Sync + 'static,
    {
        Self {
            hub,
            to_hub: Box::new(to_hub),
            from_hub: Box::new(from_hub),
        }
    }

    /// The version this pair converts to and from.
    pub fn hub(&self) -> &SchemaVersion {
        &self.hub
    }

    pub fn to_hub(&self, resource: R) -> Result<R, ConverterError> {
        (self.to_hub)(resource)
    }

    pub fn from_hub(&self, resource: R) -> Result<R, ConverterError> {
        (self.from_hub)(resource)
    }
}

impl<R> Debug for ConverterPair<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterPair")
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}
