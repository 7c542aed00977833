use std::str::FromStr;

use serde::{Deserialize, Serialize, de::Visitor};

use crate::SchemaVersion;

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SchemaVersionVisitor;

        impl Visitor<'_> for SchemaVersionVisitor {
            type Value = SchemaVersion;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a valid schema version, like v1alpha4")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                SchemaVersion::from_str(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SchemaVersionVisitor)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize() {
        let _: SchemaVersion = serde_yaml::from_str("v1alpha3").expect("schema version is valid");
    }

    #[test]
    fn serialize() {
        let version = SchemaVersion::from_str("v1beta1").expect("schema version is valid");
        assert_eq!(
            "v1beta1\n",
            serde_yaml::to_string(&version).expect("schema version must serialize")
        );
    }
}
