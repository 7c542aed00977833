use crate::{ConverterError, ConverterPair};

/// The identity conversion of the hub version.
///
/// The hub never registers a [`ConverterPair`], it is the target every pair
/// converts to. Resolving the hub through the registry yields this converter,
/// so that the hub can be treated as just another endpoint of the star.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HubConverter;

impl HubConverter {
    pub fn to_hub<R>(self, resource: R) -> R {
        resource
    }

    pub fn from_hub<R>(self, resource: R) -> R {
        resource
    }
}

/// A converter resolved from a [`Registry`](crate::Registry).
#[derive(Debug)]
pub enum Converter<'a, R> {
    /// The requested version is the hub itself.
    Hub(HubConverter),

    /// The requested version is a spoke with its registered pair.
    Spoke(&'a ConverterPair<R>),
}

impl<R> Converter<'_, R> {
    pub fn to_hub(&self, resource: R) -> Result<R, ConverterError> {
        match self {
            Self::Hub(hub) => Ok(hub.to_hub(resource)),
            Self::Spoke(pair) => pair.to_hub(resource),
        }
    }

    pub fn from_hub(&self, resource: R) -> Result<R, ConverterError> {
        match self {
            Self::Hub(hub) => Ok(hub.from_hub(resource)),
            Self::Spoke(pair) => pair.from_hub(resource),
        }
    }

    pub const fn is_hub(&self) -> bool {
        matches!(self, Self::Hub(_))
    }
}
