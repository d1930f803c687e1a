//! Canonical metadata tree

mod collection;
mod metadata;
mod resource;

pub use collection::NftCollection;
pub use metadata::{
    AssetType, AttributeSchema, AttributeType, AttributeValue, Factory, Media, Metadata,
    SerialNumber, Token, TokenUriTemplate, DEFAULT_LOCALE, DEFAULT_SERIAL,
};
pub use resource::{DynamicResource, Integrity, IntegrityAlgorithm, StaticResource};
