//! Keeps data alive which a down-conversion would otherwise drop.
//!
//! Newer schema versions regularly gain fields an older version has no
//! counterpart for. When converting down, the converter stashes these fields
//! as JSON in the [`CONVERSION_DATA_ANNOTATION`] of the converted object. When
//! the object is converted back up later, the converter takes the stashed data
//! out of the annotation again and restores the fields from it.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use capi_conversion::preserve::{self, CONVERSION_DATA_ANNOTATION};
//!
//! #[derive(Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
//! struct HubOnly {
//!     node_drain_timeout: Option<String>,
//! }
//!
//! let mut annotations = BTreeMap::new();
//! let lost = HubOnly { node_drain_timeout: Some("30s".to_owned()) };
//!
//! preserve::preserve(&lost, &mut annotations).expect("data serializes");
//! assert!(annotations.contains_key(CONVERSION_DATA_ANNOTATION));
//!
//! let restored: Option<HubOnly> = preserve::restore(&mut annotations).expect("data deserializes");
//! assert_eq!(restored, Some(lost));
//! assert!(annotations.is_empty());
//! ```
use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use tracing::trace;

use crate::{ConverterError, DeserializePreservedDataSnafu, SerializePreservedDataSnafu};

/// The annotation holding the data preserved on down-conversion.
pub const CONVERSION_DATA_ANNOTATION: &str = "cluster.x-k8s.io/conversion-data";

/// Implemented by resource shapes which carry an annotation map, usually as
/// part of their object metadata.
pub trait Annotated {
    fn annotations_mut(&mut self) -> &mut BTreeMap<String, String>;
}

/// Stores `data` in the [`CONVERSION_DATA_ANNOTATION`].
///
/// If `data` equals its default, nothing was lost and no annotation is
/// written. This keeps objects which never held any of the dropped fields
/// byte-for-byte identical across a round trip.
pub fn preserve<T>(
    data: &T,
    annotations: &mut BTreeMap<String, String>,
) -> Result<(), ConverterError>
where
    T: Serialize + Default + PartialEq,
{
    if *data == T::default() {
        return Ok(());
    }

    let serialized = serde_json::to_string(data).context(SerializePreservedDataSnafu)?;
    trace!(annotation = CONVERSION_DATA_ANNOTATION, "preserving dropped fields");
    annotations.insert(CONVERSION_DATA_ANNOTATION.to_owned(), serialized);

    Ok(())
}

/// Takes the data previously stored by [`preserve`] out of `annotations`.
///
/// The annotation is always removed, so that it doesn't leak into the
/// converted object. Returns [`None`] if no data was preserved.
pub fn restore<T>(annotations: &mut BTreeMap<String, String>) -> Result<Option<T>, ConverterError>
where
    T: DeserializeOwned,
{
    let Some(serialized) = annotations.remove(CONVERSION_DATA_ANNOTATION) else {
        return Ok(None);
    };

    trace!(annotation = CONVERSION_DATA_ANNOTATION, "restoring preserved fields");
    serde_json::from_str(&serialized)
        .map(Some)
        .context(DeserializePreservedDataSnafu {
            annotation: CONVERSION_DATA_ANNOTATION,
        })
}

/// Same as [`preserve`], operating on the annotations of `object`.
pub fn preserve_on<T, O>(data: &T, object: &mut O) -> Result<(), ConverterError>
where
    T: Serialize + Default + PartialEq,
    O: Annotated,
{
    preserve(data, object.annotations_mut())
}

/// Same as [`restore`], operating on the annotations of `object`.
pub fn restore_from<T, O>(object: &mut O) -> Result<Option<T>, ConverterError>
where
    T: DeserializeOwned,
    O: Annotated,
{
    restore(object.annotations_mut())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Dropped {
        rollout_after: Option<String>,
        max_surge: Option<i32>,
    }

    #[test]
    fn default_data_writes_no_annotation() {
        let mut annotations = BTreeMap::new();
        preserve(&Dropped::default(), &mut annotations).expect("nothing to serialize");

        assert!(annotations.is_empty());
    }

    #[test]
    fn preserved_json() {
        let mut annotations = BTreeMap::from([("owner".to_owned(), "team-a".to_owned())]);
        let dropped = Dropped {
            rollout_after: None,
            max_surge: Some(1),
        };

        preserve(&dropped, &mut annotations).expect("data serializes");

        assert_eq!(
            annotations.get(CONVERSION_DATA_ANNOTATION).map(String::as_str),
            Some(r#"{"rolloutAfter":null,"maxSurge":1}"#)
        );
        assert_eq!(annotations.len(), 2);
    }

    #[test]
    fn restore_removes_annotation() {
        let mut annotations = BTreeMap::from([(
            CONVERSION_DATA_ANNOTATION.to_owned(),
            r#"{"rolloutAfter":"2021-01-01T00:00:00Z","maxSurge":null}"#.to_owned(),
        )]);

        let restored: Option<Dropped> = restore(&mut annotations).expect("data deserializes");

        assert_eq!(
            restored,
            Some(Dropped {
                rollout_after: Some("2021-01-01T00:00:00Z".to_owned()),
                max_surge: None,
            })
        );
        assert!(annotations.is_empty());
    }

    #[test]
    fn restore_without_annotation() {
        let mut annotations = BTreeMap::new();
        let restored: Option<Dropped> = restore(&mut annotations).expect("nothing to restore");

        assert_eq!(restored, None);
    }

    #[test]
    fn restore_malformed() {
        let mut annotations = BTreeMap::from([(
            CONVERSION_DATA_ANNOTATION.to_owned(),
            "{not json".to_owned(),
        )]);

        let err = restore::<Dropped>(&mut annotations).expect_err("annotation is not valid JSON");
        assert!(matches!(err, ConverterError::DeserializePreservedData { .. }));
    }
}
