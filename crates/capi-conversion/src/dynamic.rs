//! Converts untyped JSON objects, as received by a conversion webhook.
//!
//! The surrounding webhook owns the request and response envelopes. It hands
//! every object of a request to [`DynamicConverter::convert_objects`] and
//! reports the outcome. Objects are dispatched on their `apiVersion` field to
//! the matching variant of the resource enum, converted by the [`Driver`] and
//! serialized again with the desired `apiVersion`.
use std::{error::Error, str::FromStr};

use capi_version::{ApiVersion, ParseApiVersionError, SchemaVersion};
use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, instrument};

use crate::{ConversionError, Convertible, Driver, UnknownVersionError};

/// A resource enum which can be read from and written to untyped JSON objects.
pub trait DynamicResource: Convertible + Sized {
    /// The kind of the resource, for example `KubeadmControlPlane`.
    const KIND: &'static str;

    /// The API group of the resource, for example
    /// `controlplane.cluster.x-k8s.io`.
    const GROUP: &'static str;

    /// Deserializes `object` into the variant shaped according to `version`.
    fn from_object(version: &SchemaVersion, object: Value) -> Result<Self, serde_json::Error>;

    /// Serializes the resource. The `apiVersion` and `kind` fields are set by
    /// the caller.
    fn to_object(&self) -> Result<Value, serde_json::Error>;
}

#[derive(Debug, Snafu)]
pub enum DynamicConversionError {
    #[snafu(display("failed to parse desired API version {api_version:?}"))]
    ParseDesiredApiVersion {
        source: ParseApiVersionError,
        api_version: String,
    },

    #[snafu(display("failed to parse current API version {api_version:?}"))]
    ParseCurrentApiVersion {
        source: ParseApiVersionError,
        api_version: String,
    },

    #[snafu(display("the object sent for conversion is not a JSON object"))]
    ObjectNotAMap,

    #[snafu(display("the object sent for conversion has no \"kind\" field"))]
    ObjectHasNoKind,

    #[snafu(display("the \"kind\" field of the object sent for conversion isn't a string"))]
    ObjectKindNotString { kind: Value },

    #[snafu(display("the object sent for conversion has no \"apiVersion\" field"))]
    ObjectHasNoApiVersion,

    #[snafu(display("the \"apiVersion\" field of the object sent for conversion isn't a string"))]
    ObjectApiVersionNotString { api_version: Value },

    #[snafu(display(
        "asked to convert kind {sent_kind:?}, but only kind {expected_kind:?} is supported"
    ))]
    WrongObjectKind {
        expected_kind: String,
        sent_kind: String,
    },

    #[snafu(display("API version {api_version} does not belong to group {expected_group:?}"))]
    WrongGroup {
        expected_group: String,
        api_version: ApiVersion,
    },

    #[snafu(display("the schema version of the object sent for conversion is not supported"))]
    UnsupportedCurrentVersion { source: UnknownVersionError },

    #[snafu(display("the desired schema version is not supported"))]
    UnsupportedDesiredVersion { source: UnknownVersionError },

    #[snafu(display("failed to deserialize object of kind {kind:?}"))]
    DeserializeObject {
        source: serde_json::Error,
        kind: String,
    },

    #[snafu(display("failed to serialize object of kind {kind:?}"))]
    SerializeObject {
        source: serde_json::Error,
        kind: String,
    },

    #[snafu(display("failed to convert object of kind {kind:?}"))]
    Convert {
        source: ConversionError,
        kind: String,
    },
}

impl DynamicConversionError {
    /// The HTTP status code a webhook should respond with. Errors caused by
    /// the sent object map to 400, everything else to 500.
    pub fn http_return_code(&self) -> u16 {
        match &self {
            Self::ParseCurrentApiVersion { .. } => 400,
            Self::ObjectNotAMap => 400,
            Self::ObjectHasNoKind => 400,
            Self::ObjectKindNotString { .. } => 400,
            Self::ObjectHasNoApiVersion => 400,
            Self::ObjectApiVersionNotString { .. } => 400,
            Self::WrongObjectKind { .. } => 400,
            Self::WrongGroup { .. } => 400,
            Self::UnsupportedCurrentVersion { .. } => 400,
            Self::DeserializeObject { .. } => 400,
            Self::ParseDesiredApiVersion { .. } => 500,
            Self::UnsupportedDesiredVersion { .. } => 500,
            Self::SerializeObject { .. } => 500,
            Self::Convert { .. } => 500,
        }
    }

    /// Joins the error and all its sources into a single line.
    pub fn as_human_readable_error_message(&self) -> String {
        let mut error_message = self.to_string();

        let mut source = self.source();
        while let Some(err) = source {
            error_message.push_str(": ");
            error_message.push_str(&err.to_string());
            source = err.source();
        }

        error_message
    }
}

/// Converts untyped objects of the resource `R`.
#[derive(Debug)]
pub struct DynamicConverter<R> {
    driver: Driver<R>,
}

impl<R> From<Driver<R>> for DynamicConverter<R> {
    fn from(driver: Driver<R>) -> Self {
        Self { driver }
    }
}

impl<R> DynamicConverter<R>
where
    R: DynamicResource,
{
    pub fn new(driver: Driver<R>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Driver<R> {
        &self.driver
    }

    /// Converts all `objects` to `desired_api_version`.
    ///
    /// The conversion is all-or-nothing: the first failing object fails the
    /// whole batch.
    pub fn convert_objects(
        &self,
        objects: impl IntoIterator<Item = Value>,
        desired_api_version: &str,
    ) -> Result<Vec<Value>, DynamicConversionError> {
        objects
            .into_iter()
            .map(|object| self.convert_object(object, desired_api_version))
            .collect()
    }

    #[instrument(skip(self, object), fields(kind = R::KIND))]
    pub fn convert_object(
        &self,
        mut object: Value,
        desired_api_version: &str,
    ) -> Result<Value, DynamicConversionError> {
        let desired =
            ApiVersion::from_str(desired_api_version).context(ParseDesiredApiVersionSnafu {
                api_version: desired_api_version,
            })?;
        ensure_group::<R>(&desired)?;

        ensure!(object.is_object(), ObjectNotAMapSnafu);

        let kind = object.get("kind").context(ObjectHasNoKindSnafu)?;
        let kind = kind
            .as_str()
            .context(ObjectKindNotStringSnafu { kind: kind.clone() })?;
        ensure!(
            kind == R::KIND,
            WrongObjectKindSnafu {
                expected_kind: R::KIND,
                sent_kind: kind,
            }
        );

        let current = object.get("apiVersion").context(ObjectHasNoApiVersionSnafu)?;
        let current = current.as_str().context(ObjectApiVersionNotStringSnafu {
            api_version: current.clone(),
        })?;
        let current = ApiVersion::from_str(current)
            .context(ParseCurrentApiVersionSnafu { api_version: current })?;
        ensure_group::<R>(&current)?;

        let registry = self.driver.registry();
        registry
            .lookup(&current.version)
            .context(UnsupportedCurrentVersionSnafu)?;
        registry
            .lookup(&desired.version)
            .context(UnsupportedDesiredVersionSnafu)?;

        // The object is returned as sent, deserializing it would drop unknown
        // fields and fill in defaults.
        if current.version == desired.version {
            debug!(%current, "object already has the desired schema version");
            set_type_meta::<R>(&mut object, &desired)?;
            return Ok(object);
        }

        debug!(current = %current, desired = %desired, "converting object");

        let resource = R::from_object(&current.version, object)
            .context(DeserializeObjectSnafu { kind: R::KIND })?;
        let converted = self
            .driver
            .convert(resource, &current.version, &desired.version)
            .context(ConvertSnafu { kind: R::KIND })?;

        let mut converted = converted
            .to_object()
            .context(SerializeObjectSnafu { kind: R::KIND })?;
        set_type_meta::<R>(&mut converted, &desired)?;

        Ok(converted)
    }
}

fn set_type_meta<R: DynamicResource>(
    object: &mut Value,
    api_version: &ApiVersion,
) -> Result<(), DynamicConversionError> {
    let map = object.as_object_mut().context(ObjectNotAMapSnafu)?;
    map.insert("apiVersion".to_owned(), Value::String(api_version.to_string()));
    map.insert("kind".to_owned(), Value::String(R::KIND.to_owned()));

    Ok(())
}

fn ensure_group<R: DynamicResource>(
    api_version: &ApiVersion,
) -> Result<(), DynamicConversionError> {
    ensure!(
        api_version.group.as_deref() == Some(R::GROUP),
        WrongGroupSnafu {
            expected_group: R::GROUP,
            api_version: api_version.clone(),
        }
    );

    Ok(())
}
