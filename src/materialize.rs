use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::error::{GitmanError, Result};
use crate::models::{NONE_CHOICE, TemplateKind};
use crate::store::TemplateDir;

/// Which source a template body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Local,
    Cache,
    Remote,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub name: String,
    pub source: Source,
    pub content: Vec<u8>,
}

/// Turns chosen template names into the artifact file of a target repository.
pub struct Materializer<'a> {
    kind: TemplateKind,
    local: &'a TemplateDir,
    cache: &'a TemplateDir,
    client: Option<&'a ApiClient>,
    cache_remote: bool,
}

impl<'a> Materializer<'a> {
    /// `client: None` means offline; `cache_remote` persists fresh remote bodies.
    pub fn new(
        kind: TemplateKind,
        local: &'a TemplateDir,
        cache: &'a TemplateDir,
        client: Option<&'a ApiClient>,
        cache_remote: bool,
    ) -> Self {
        Self {
            kind,
            local,
            cache,
            client,
            cache_remote,
        }
    }

    /// Resolves one name: local store, then disk cache, then the remote catalog.
    pub async fn resolve(&self, name: &str) -> Result<Resolved> {
        if let Some(content) = self.local.lookup(name) {
            tracing::debug!("Using local {} template '{}'", self.kind, name);
            return Ok(self.resolved(name, Source::Local, content));
        }
        if let Some(content) = self.cache.lookup(name) {
            tracing::debug!("Using cached {} template '{}'", self.kind, name);
            return Ok(self.resolved(name, Source::Cache, content));
        }

        let client = self.client.ok_or_else(|| {
            GitmanError::fetch(format!("{} template '{}'", self.kind, name), "offline")
        })?;
        let content = client.fetch_body(self.kind, name).await?;
        tracing::debug!("Fetched remote {} template '{}'", self.kind, name);

        if self.cache_remote {
            match self.cache.store(name, &content) {
                Ok(path) => tracing::info!("Cached {} template at {}", self.kind, path.display()),
                Err(err) => tracing::warn!("Failed to cache {} template '{}': {}", self.kind, name, err),
            }
        }
        Ok(self.resolved(name, Source::Remote, content))
    }

    /// Resolves every chosen name and writes the artifact into `target_dir`.
    ///
    /// Returns `Ok(None)` without touching the target when nothing was chosen.
    /// If any name fails to resolve nothing is written.
    pub async fn materialize(&self, selection: &[String], target_dir: &Path) -> Result<Option<PathBuf>> {
        let chosen: Vec<&str> = selection
            .iter()
            .map(String::as_str)
            .filter(|name| *name != NONE_CHOICE)
            .collect();
        if chosen.is_empty() {
            return Ok(None);
        }

        let mut bodies = Vec::with_capacity(chosen.len());
        for name in chosen {
            let resolved = self.resolve(name).await?;
            tracing::debug!("Resolved '{}' from {:?}", resolved.name, resolved.source);
            bodies.push(resolved.content);
        }

        let path = target_dir.join(self.kind.artifact_name());
        fs::write(&path, join_bodies(&bodies)).map_err(|e| GitmanError::io(&path, e))?;
        tracing::info!("Wrote {}", path.display());
        Ok(Some(path))
    }

    fn resolved(&self, name: &str, source: Source, content: Vec<u8>) -> Resolved {
        Resolved {
            name: name.to_string(),
            source,
            content,
        }
    }
}

/// Concatenates bodies in order with a single newline between them.
pub fn join_bodies(bodies: &[Vec<u8>]) -> Vec<u8> {
    bodies.join(&b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        local: TemplateDir,
        cache: TemplateDir,
        target: PathBuf,
    }

    fn fixture(kind: TemplateKind) -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("config");
        let target = temp.path().join("repo");
        fs::create_dir_all(&target).unwrap();
        Fixture {
            local: TemplateDir::new(root.join(kind.dir_name()), kind.suffix()),
            cache: TemplateDir::new(root.join(".cache").join(kind.dir_name()), kind.suffix()),
            target,
            _temp: temp,
        }
    }

    fn selection(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn unreachable_client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:1/api", "http://127.0.0.1:1/licenses").unwrap()
    }

    #[tokio::test]
    async fn local_override_beats_cache() {
        let fx = fixture(TemplateKind::Gitignore);
        fx.local.store("Go", b"local go").unwrap();
        fx.cache.store("Go", b"cached go").unwrap();
        let m = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, None, false);

        let resolved = m.resolve("Go").await.unwrap();

        assert_eq!(resolved.source, Source::Local);
        assert_eq!(resolved.content, b"local go");
    }

    #[tokio::test]
    async fn cache_beats_network() {
        let fx = fixture(TemplateKind::License);
        fx.cache.store("mit", b"cached mit").unwrap();
        let client = unreachable_client();
        let m = Materializer::new(TemplateKind::License, &fx.local, &fx.cache, Some(&client), true);

        let path = m.materialize(&selection(&["mit"]), &fx.target).await.unwrap();

        assert_eq!(path, Some(fx.target.join("LICENSE")));
        assert_eq!(fs::read(fx.target.join("LICENSE")).unwrap(), b"cached mit");
    }

    #[tokio::test]
    async fn remote_fetch_writes_through_cache() {
        let fx = fixture(TemplateKind::Gitignore);
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/rust");
                then.status(200).body("/target\n");
            })
            .await;
        let client = ApiClient::new(&server.url("/api"), &server.url("/licenses")).unwrap();

        let online = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, Some(&client), true);
        online.materialize(&selection(&["rust"]), &fx.target).await.unwrap();
        let first = fs::read(fx.target.join(".gitignore")).unwrap();
        fs::remove_file(fx.target.join(".gitignore")).unwrap();

        let dead = unreachable_client();
        let offline = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, Some(&dead), true);
        let resolved = offline.resolve("rust").await.unwrap();
        offline.materialize(&selection(&["rust"]), &fx.target).await.unwrap();

        assert_eq!(resolved.source, Source::Cache);
        assert_eq!(first, b"/target\n");
        assert_eq!(fs::read(fx.target.join(".gitignore")).unwrap(), first);
    }

    #[tokio::test]
    async fn cache_policy_off_leaves_cache_empty() {
        let fx = fixture(TemplateKind::License);
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/licenses/mit");
                then.status(200).body(r#"{"key":"mit","body":"MIT text"}"#);
            })
            .await;
        let client = ApiClient::new(&server.url("/api"), &server.url("/licenses")).unwrap();
        let m = Materializer::new(TemplateKind::License, &fx.local, &fx.cache, Some(&client), false);

        m.materialize(&selection(&["mit"]), &fx.target).await.unwrap();

        assert_eq!(fs::read(fx.target.join("LICENSE")).unwrap(), b"MIT text");
        assert_eq!(fx.cache.lookup("mit"), None);
    }

    #[tokio::test]
    async fn cache_write_failure_is_swallowed() {
        let fx = fixture(TemplateKind::Gitignore);
        // A file where the cache directory should be makes every cache write fail.
        fs::create_dir_all(fx.cache.dir().parent().unwrap()).unwrap();
        fs::write(fx.cache.dir(), "blocker").unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/go");
                then.status(200).body("*.exe");
            })
            .await;
        let client = ApiClient::new(&server.url("/api"), &server.url("/licenses")).unwrap();
        let m = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, Some(&client), true);

        let written = m.materialize(&selection(&["go"]), &fx.target).await.unwrap();

        assert!(written.is_some());
        assert_eq!(fs::read(fx.target.join(".gitignore")).unwrap(), b"*.exe");
    }

    #[tokio::test]
    async fn concatenates_in_selection_order() {
        let fx = fixture(TemplateKind::Gitignore);
        fx.local.store("Go", b"# go").unwrap();
        fx.local.store("Node", b"# node").unwrap();
        let m = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, None, false);

        m.materialize(&selection(&["Go", "Node"]), &fx.target).await.unwrap();
        assert_eq!(fs::read(fx.target.join(".gitignore")).unwrap(), b"# go\n# node");

        fs::remove_file(fx.target.join(".gitignore")).unwrap();
        m.materialize(&selection(&["Node", "Go"]), &fx.target).await.unwrap();
        assert_eq!(fs::read(fx.target.join(".gitignore")).unwrap(), b"# node\n# go");
    }

    #[tokio::test]
    async fn unresolvable_name_aborts_whole_write() {
        let fx = fixture(TemplateKind::Gitignore);
        fx.local.store("A", b"a").unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/B");
                then.status(404);
            })
            .await;
        let client = ApiClient::new(&server.url("/api"), &server.url("/licenses")).unwrap();
        let m = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, Some(&client), true);

        let result = m.materialize(&selection(&["A", "B"]), &fx.target).await;

        assert!(matches!(result, Err(GitmanError::Fetch { .. })));
        assert!(!fx.target.join(".gitignore").exists());
    }

    #[tokio::test]
    async fn failed_write_leaves_existing_file_unchanged() {
        let fx = fixture(TemplateKind::Gitignore);
        fs::write(fx.target.join(".gitignore"), "keep me").unwrap();
        let m = Materializer::new(TemplateKind::Gitignore, &fx.local, &fx.cache, None, false);

        let result = m.materialize(&selection(&["Missing"]), &fx.target).await;

        assert!(result.is_err());
        assert_eq!(fs::read(fx.target.join(".gitignore")).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn empty_or_none_selection_is_noop() {
        let fx = fixture(TemplateKind::License);
        let m = Materializer::new(TemplateKind::License, &fx.local, &fx.cache, None, false);

        assert_eq!(m.materialize(&[], &fx.target).await.unwrap(), None);
        assert!(!fx.target.join("LICENSE").exists());

        fs::write(fx.target.join("LICENSE"), "existing").unwrap();
        assert_eq!(
            m.materialize(&selection(&[NONE_CHOICE]), &fx.target).await.unwrap(),
            None
        );
        assert_eq!(fs::read(fx.target.join("LICENSE")).unwrap(), b"existing");
    }

    #[test]
    fn join_uses_single_newline() {
        let joined = join_bodies(&[b"a\n".to_vec(), b"b".to_vec()]);
        assert_eq!(joined, b"a\n\nb");
        assert!(join_bodies(&[]).is_empty());
    }
}
