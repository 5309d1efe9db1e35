use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::models::TemplateKind;

/// Where the remote half of the registry stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogStatus {
    /// No remote fetch was started (offline).
    #[default]
    NotRequested,
    /// The background fetch is still in flight.
    Pending,
    /// Remote names were merged; the registry is now frozen.
    Merged { fetched: usize },
    /// The remote fetch failed; only local and cached names are known.
    Degraded { reason: String },
}

#[derive(Debug, Default)]
struct Inner {
    names: Vec<String>,
    status: CatalogStatus,
    generation: u64,
}

/// The merged list of template names known for one template kind.
///
/// All reads and writes go through a single mutex, held only for the copy or
/// mutation itself and never across an await point.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    inner: Mutex<Inner>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends names as-is, without sorting or deduplication.
    pub fn seed<I>(&self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut inner = self.lock();
        if matches!(inner.status, CatalogStatus::Merged { .. }) {
            tracing::debug!("Ignoring seed after remote merge");
            return;
        }
        inner.names.extend(names);
        inner.generation += 1;
    }

    /// Marks the remote fetch as started.
    pub fn begin_remote(&self) {
        let mut inner = self.lock();
        if inner.status == CatalogStatus::NotRequested {
            inner.status = CatalogStatus::Pending;
            inner.generation += 1;
        }
    }

    /// Merges the remote listing, leaving the list sorted and duplicate free.
    ///
    /// Only the first merge is applied. Returns whether it was.
    pub fn merge_remote(&self, names: Vec<String>) -> bool {
        let mut inner = self.lock();
        if matches!(inner.status, CatalogStatus::Merged { .. }) {
            tracing::debug!("Ignoring repeated remote merge");
            return false;
        }
        let fetched: Vec<String> = names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let fetched_count = fetched.len();
        inner.names.extend(fetched);
        // Case-sensitive identity: "Go" and "go" both survive.
        inner.names.sort();
        inner.names.dedup();
        inner.status = CatalogStatus::Merged {
            fetched: fetched_count,
        };
        inner.generation += 1;
        true
    }

    /// Records a failed remote fetch. The names stay as seeded.
    pub fn mark_degraded(&self, reason: impl Into<String>) {
        let mut inner = self.lock();
        if matches!(inner.status, CatalogStatus::Merged { .. }) {
            return;
        }
        inner.status = CatalogStatus::Degraded {
            reason: reason.into(),
        };
        inner.generation += 1;
    }

    /// Point-in-time copy of the names. A later merge may still grow the list.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().names.clone()
    }

    pub fn status(&self) -> CatalogStatus {
        self.lock().status.clone()
    }

    /// Bumped on every mutation so readers can tell when to re-snapshot.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Looks a name up exactly, then case-insensitively, returning the stored spelling.
    pub fn find(&self, name: &str) -> Option<String> {
        let inner = self.lock();
        if let Some(exact) = inner.names.iter().find(|n| n.as_str() == name) {
            return Some(exact.clone());
        }
        let wanted = name.to_lowercase();
        inner
            .names
            .iter()
            .find(|n| n.to_lowercase() == wanted)
            .cloned()
    }
}

/// Fetches the remote listing in the background and merges it on success.
///
/// A failure leaves the registry local-only and is recorded as `Degraded`.
pub fn spawn_catalog_fetch(
    registry: Arc<TemplateRegistry>,
    client: ApiClient,
    kind: TemplateKind,
) -> JoinHandle<()> {
    registry.begin_remote();
    tokio::spawn(async move {
        match client.list_names(kind).await {
            Ok(names) => {
                let count = names.len();
                if registry.merge_remote(names) {
                    tracing::info!("Merged {} remote {} templates", count, kind);
                }
            }
            Err(err) => {
                tracing::warn!("Failed to fetch {} templates: {}", kind, err);
                registry.mark_degraded(err.to_string());
            }
        }
    })
}
