use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::materialize::Materializer;
use crate::models::TemplateKind;
use crate::registry::{TemplateRegistry, spawn_catalog_fetch};
use crate::store::TemplateDir;

/// Local store, disk cache and registry for one template kind.
pub struct Catalog {
    kind: TemplateKind,
    local: TemplateDir,
    cache: TemplateDir,
    registry: Arc<TemplateRegistry>,
    fetch: Option<JoinHandle<()>>,
}

impl Catalog {
    /// Scans the local store and disk cache, seeds the registry and starts the
    /// remote listing in the background (unless `client` is `None`).
    ///
    /// Must be called inside a tokio runtime when a client is given.
    pub fn open(kind: TemplateKind, root: &Path, client: Option<&ApiClient>) -> Self {
        let local = TemplateDir::new(root.join(kind.dir_name()), kind.suffix());
        let cache = TemplateDir::new(root.join(".cache").join(kind.dir_name()), kind.suffix());
        let registry = Arc::new(TemplateRegistry::new());

        let mut known = BTreeSet::new();
        for store in [&local, &cache] {
            match store.scan() {
                Ok(names) => known.extend(names),
                Err(err) => tracing::warn!("Skipping {} templates in {}: {}", kind, store.dir().display(), err),
            }
        }
        tracing::debug!("Seeding {} registry with {} local/cached names", kind, known.len());
        registry.seed(known);

        let fetch = client.map(|client| spawn_catalog_fetch(Arc::clone(&registry), client.clone(), kind));

        Self {
            kind,
            local,
            cache,
            registry,
            fetch,
        }
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn registry(&self) -> Arc<TemplateRegistry> {
        Arc::clone(&self.registry)
    }

    /// Waits for the background listing, if one is still running.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.fetch.take() {
            if let Err(err) = handle.await {
                tracing::warn!("{} catalog task did not complete: {}", self.kind, err);
                self.registry.mark_degraded(err.to_string());
            }
        }
    }

    /// Maps user-typed names onto the registry's spelling, case-insensitively.
    /// Unknown names are kept as typed.
    pub fn canonical_names(&self, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .map(|name| self.registry.find(name).unwrap_or_else(|| name.clone()))
            .collect()
    }

    pub fn materializer<'a>(&'a self, client: Option<&'a ApiClient>, cache_remote: bool) -> Materializer<'a> {
        Materializer::new(self.kind, &self.local, &self.cache, client, cache_remote)
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        // The listing is read-only, so an unfinished one is simply abandoned.
        if let Some(handle) = self.fetch.take() {
            handle.abort();
        }
    }
}
