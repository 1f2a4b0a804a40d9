//! Service layer: the two pipelines (ingestion, search) and the clients
//! they share for signed calls against the external collaborators.

pub mod index_client;
pub mod ingest_service;
pub mod intent_client;
pub mod search_service;
pub mod signed_client;

use index_client::IndexClient;
use ingest_service::IngestService;
use search_service::SearchService;

/// Shared handler state. Cloned per request; all members are cheap
/// handle clones.
#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub search: SearchService,
    pub index: IndexClient,
}
