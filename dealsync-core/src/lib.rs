//! dealsync core library: deal snapshot types, remote resource shapes,
//! mapping persistence, configuration, errors.
//!
//! - [`types`]: newtypes, the deal snapshot and the role vocabulary
//! - [`remote`]: outbound attribute sets and the [`BrokerageApi`] trait
//! - [`mapping`]: [`MappingStore`] with file and in-memory implementations
//! - [`config`]: `config.yaml` loading and per-brand credentials
//! - [`error`]: [`ApiError`], [`MappingError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod mapping;
pub mod remote;
pub mod types;

pub use config::{BrandCredentials, Config};
pub use error::{ApiError, ConfigError, MappingError};
pub use mapping::{FileMappingStore, MappingStore, MemoryMappingStore};
pub use remote::{
    AddressAttributes, Brokerage, BrokerageApi, Credentials, DealAttributes, NewDealAccess,
    NewProfile, ProfileType, RemoteAccess, RemoteDeal, RemoteProfile, Session,
};
pub use types::{
    AccessId, AddressId, BrandId, BrandType, BrandUnit, BrokerageId, ContextValue, Deal, DealId,
    Direction, EnderType, Mapping, ProfileId, RemoteDealId, Role, RoleCategory, RoleTag, Side,
};
