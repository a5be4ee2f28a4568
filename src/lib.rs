//! Resolves free-text card names to concrete printings in an external card
//! catalog, for a target set and language.

pub mod api;
pub mod config;
pub mod context;
pub mod deck;
pub mod dedup;
pub mod error;
pub mod fetcher;
pub mod lands;
pub mod locale;
pub mod printing;
pub mod query;
pub mod resolver;
pub mod scorer;
pub mod session;

pub use api::{CatalogClient, HttpCatalogClient};
pub use config::Config;
pub use context::ResolutionContext;
pub use error::{CatalogError, ConfigError, ResolveError};
pub use fetcher::{CandidateFetcher, FetchConfig};
pub use printing::Printing;
pub use query::SearchFilters;
pub use resolver::{Phase, Resolution, ResolutionMap, Resolver};
