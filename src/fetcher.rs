//! Batched, throttled lookups against the catalog.
//!
//! A failed lookup is never an error here: it is logged and treated as "no
//! candidates", so callers always get whatever coverage could be reached.

use crate::api::CatalogClient;
use crate::error::ResolveError;
use crate::printing::{CardIdentifier, CollectionResponse, Printing};
use crate::query::{identity_batch_query, name_batch_query, SearchFilters};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Largest number of names the catalog reliably accepts in one OR query.
pub const MAX_BATCH_SIZE: usize = 20;
/// Catalog limit on identifiers per collection request.
pub const COLLECTION_BATCH_SIZE: usize = 75;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            batch_size: MAX_BATCH_SIZE,
            batch_delay: Duration::from_millis(100),
        }
    }
}

pub struct CandidateFetcher<'a, C: CatalogClient + ?Sized> {
    client: &'a C,
    config: FetchConfig,
}

impl<'a, C: CatalogClient + ?Sized> CandidateFetcher<'a, C> {
    pub fn new(client: &'a C, config: FetchConfig) -> Self {
        let batch_size = config.batch_size.clamp(1, MAX_BATCH_SIZE);
        CandidateFetcher {
            client,
            config: FetchConfig {
                batch_size,
                ..config
            },
        }
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// One query, failures degraded to no candidates.
    pub async fn search(&self, query: &str) -> Vec<Printing> {
        match self.client.search(query).await {
            Ok(printings) => {
                debug!(query, found = printings.len(), "search finished");
                printings
            }
            Err(e) => {
                warn!(query, error = %e, "catalog search failed, treating as no match");
                Vec::new()
            }
        }
    }

    /// Candidates per requested name. Every requested name gets an entry,
    /// empty when nothing answered to it.
    pub async fn fetch_batch(
        &self,
        names: &[String],
        filters: &SearchFilters,
    ) -> HashMap<String, Vec<Printing>> {
        let mut candidates: HashMap<String, Vec<Printing>> =
            names.iter().map(|n| (n.clone(), Vec::new())).collect();

        for (batch, chunk) in names.chunks(self.config.batch_size).enumerate() {
            if batch > 0 {
                sleep(self.config.batch_delay).await;
            }
            let query = match name_batch_query(chunk, filters) {
                Ok(query) => query,
                Err(ResolveError::AmbiguousInput) => {
                    debug!(batch, "skipping batch with no usable names");
                    continue;
                }
            };
            debug!(batch, names = chunk.len(), "dispatching name batch");
            for printing in self.search(&query).await {
                for name in chunk {
                    if printing.answers_to(name) {
                        if let Some(list) = candidates.get_mut(name) {
                            list.push(printing.clone());
                        }
                    }
                }
            }
        }

        candidates
    }

    /// Candidates per abstract identity, for re-querying cards already known.
    pub async fn fetch_by_identity(
        &self,
        oracle_ids: &[String],
        filters: &SearchFilters,
    ) -> HashMap<String, Vec<Printing>> {
        let mut candidates: HashMap<String, Vec<Printing>> = HashMap::new();

        for (batch, chunk) in oracle_ids.chunks(self.config.batch_size).enumerate() {
            if batch > 0 {
                sleep(self.config.batch_delay).await;
            }
            let query = match identity_batch_query(chunk, filters) {
                Ok(query) => query,
                Err(ResolveError::AmbiguousInput) => continue,
            };
            debug!(batch, ids = chunk.len(), "dispatching identity batch");
            for printing in self.search(&query).await {
                if let Some(id) = printing.oracle_id.clone() {
                    if chunk.contains(&id) {
                        candidates.entry(id).or_default().push(printing);
                    }
                }
            }
        }

        candidates
    }

    /// Exact printings by identifier. A failed batch reports all of its
    /// identifiers as not found.
    pub async fn fetch_collection(&self, identifiers: &[CardIdentifier]) -> CollectionResponse {
        let mut merged = CollectionResponse::default();

        for (batch, chunk) in identifiers.chunks(COLLECTION_BATCH_SIZE).enumerate() {
            if batch > 0 {
                sleep(self.config.batch_delay).await;
            }
            match self.client.collection(chunk).await {
                Ok(response) => {
                    merged.data.extend(response.data);
                    merged.not_found.extend(response.not_found);
                }
                Err(e) => {
                    warn!(batch, error = %e, "collection lookup failed");
                    merged.not_found.extend(chunk.iter().cloned());
                }
            }
        }

        merged
    }
}
