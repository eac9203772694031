//! Provider configuration: records and the directory-backed registry.

mod record;
mod registry;

pub use record::ProviderRecord;
pub use registry::{
    DEFAULT_RESERVED_FILE, ProviderRegistry, RegistryError, load_providers,
    load_providers_excluding,
};
