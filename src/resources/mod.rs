mod loader;

pub use loader::Resource;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kira::sound::static_sound::StaticSoundData;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::canvas::Image;
use crate::error::ResourceError;
use loader::{decode, BackgroundLoad, Loaded};

/// Kinds of resource the manager can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Sound,
    /// UTF-8 text; see [`ResourceManager::data_json`] for JSON payloads.
    Data,
}

impl ResourceKind {
    /// File extensions picked up by [`ResourceManager::queue_directory`].
    fn extensions(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Image => &["png"],
            ResourceKind::Sound => &["ogg", "wav"],
            ResourceKind::Data => &["json", "txt"],
        }
    }
}

/// One item to load. `path` is resolved against the manager's asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub key: String,
    pub path: PathBuf,
    pub kind: ResourceKind,
    /// Reload even if a resource with the same key is already stored.
    pub overwrite: bool,
}

impl ResourceRequest {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>, kind: ResourceKind) -> Self {
        Self { key: key.into(), path: path.into(), kind, overwrite: false }
    }

    pub fn image(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(key, path, ResourceKind::Image)
    }

    pub fn sound(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(key, path, ResourceKind::Sound)
    }

    pub fn data(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(key, path, ResourceKind::Data)
    }

    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

/// Progress notifications for a queue load.
#[derive(Debug)]
pub enum LoadEvent {
    /// `key` was stored; `fraction` of the queue has been processed.
    Progress { key: String, fraction: f32 },
    Failed { key: String, error: ResourceError },
    /// Every queued item was processed.
    Finished { loaded: usize, failed: usize },
}

/// Outcome of a blocking [`ResourceManager::load_queue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Keyed storage for images, sounds and text data, with a load queue.
pub struct ResourceManager {
    root: PathBuf,
    images: HashMap<String, Image>,
    sounds: HashMap<String, StaticSoundData>,
    data: HashMap<String, String>,
    queue: Vec<ResourceRequest>,
    background: Option<BackgroundLoad>,
    events: Vec<LoadEvent>,
}

impl ResourceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
            sounds: HashMap::new(),
            data: HashMap::new(),
            queue: Vec::new(),
            background: None,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn get_image(&self, key: &str) -> Option<&Image> { self.images.get(key) }
    pub fn get_sound(&self, key: &str) -> Option<&StaticSoundData> { self.sounds.get(key) }
    pub fn get_data(&self, key: &str) -> Option<&str> { self.data.get(key).map(String::as_str) }

    /// Parse a stored data resource as JSON.
    pub fn data_json<T: DeserializeOwned>(&self, key: &str) -> Option<Result<T, ResourceError>> {
        self.data.get(key).map(|raw| {
            serde_json::from_str(raw).map_err(|source| ResourceError::Json { key: key.to_string(), source })
        })
    }

    pub fn contains(&self, key: &str, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Image => self.images.contains_key(key),
            ResourceKind::Sound => self.sounds.contains_key(key),
            ResourceKind::Data => self.data.contains_key(key),
        }
    }

    /// Store an already decoded resource under `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, resource: Resource) {
        let key = key.into();
        match resource {
            Resource::Image(image) => { self.images.insert(key, image); }
            Resource::Sound(sound) => { self.sounds.insert(key, sound); }
            Resource::Data(text) => { self.data.insert(key, text); }
        }
    }

    // ── Queue ────────────────────────────────────────────────────────────────

    pub fn add_to_queue(&mut self, request: ResourceRequest) {
        self.queue.push(request);
    }

    pub fn queue(&self) -> &[ResourceRequest] { &self.queue }

    /// Queue every file under `dir` whose extension matches `kind`. Keys are
    /// file stems; the first file with a given stem wins. Returns the number
    /// of files queued.
    pub fn queue_directory(&mut self, dir: impl AsRef<Path>, kind: ResourceKind) -> usize {
        let base = self.resolve(dir.as_ref());
        let mut seen = std::collections::HashSet::new();
        let mut count = 0;

        for entry in walkdir::WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_path = entry.path();
            let ext = file_path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
            if !ext.is_some_and(|ext| kind.extensions().contains(&ext.as_str())) {
                continue;
            }
            let key = match file_path.file_stem().and_then(|s| s.to_str()) {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            if !seen.insert(key.clone()) {
                debug!(key = %key, path = %file_path.display(), "duplicate_resource_key_skipped");
                continue;
            }

            let relative = file_path.strip_prefix(&self.root).unwrap_or(file_path);
            self.queue.push(ResourceRequest::new(key, relative.to_path_buf(), kind));
            count += 1;
        }
        count
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Load one resource right away. Returns `Ok(false)` when the key is
    /// already stored and `overwrite` is not set.
    pub fn load_resource(&mut self, request: &ResourceRequest) -> Result<bool, ResourceError> {
        if request.key.is_empty() || request.path.as_os_str().is_empty() {
            return Err(ResourceError::MissingParameters { key: request.key.clone() });
        }
        if !request.overwrite && self.contains(&request.key, request.kind) {
            return Ok(false);
        }

        let path = self.resolve(&request.path);
        let resource = decode(request, &path)?;
        self.insert(request.key.clone(), resource);
        debug!(key = %request.key, kind = ?request.kind, "resource_loaded");
        Ok(true)
    }

    /// Load every queued request, reporting each through `on_event`, then
    /// clear the queue. Failures do not stop the remaining items.
    pub fn load_queue(&mut self, mut on_event: impl FnMut(&LoadEvent)) -> LoadSummary {
        let queue = std::mem::take(&mut self.queue);
        let total = queue.len();
        let mut summary = LoadSummary::default();

        for (processed, request) in queue.iter().enumerate() {
            let event = match self.load_resource(request) {
                Ok(_) => {
                    summary.loaded += 1;
                    LoadEvent::Progress {
                        key: request.key.clone(),
                        fraction: (processed + 1) as f32 / total as f32,
                    }
                }
                Err(error) => {
                    summary.failed += 1;
                    error!(key = %request.key, error = %error, "resource_load_failed");
                    LoadEvent::Failed { key: request.key.clone(), error }
                }
            };
            on_event(&event);
        }

        info!(loaded = summary.loaded, failed = summary.failed, "resource_queue_loaded");
        on_event(&LoadEvent::Finished { loaded: summary.loaded, failed: summary.failed });
        summary
    }

    /// Move the queue onto a background thread. Results are stored and
    /// reported by [`poll`](Self::poll).
    pub fn start_loading(&mut self) -> Result<(), ResourceError> {
        if self.background.is_some() {
            return Err(ResourceError::AlreadyLoading);
        }

        let mut jobs = Vec::new();
        let mut rejected = 0;
        for request in std::mem::take(&mut self.queue) {
            if request.key.is_empty() || request.path.as_os_str().is_empty() {
                self.events.push(LoadEvent::Failed {
                    key: request.key.clone(),
                    error: ResourceError::MissingParameters { key: request.key },
                });
                rejected += 1;
                continue;
            }
            let path = self.resolve(&request.path);
            jobs.push((request, path));
        }

        info!(count = jobs.len(), rejected, "resource_background_load_started");
        self.background = Some(BackgroundLoad::spawn(jobs, rejected));
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.background.is_some()
    }

    /// Store whatever the background loader finished since the last call
    /// and queue the matching events. Returns the number of new events.
    pub fn poll(&mut self) -> usize {
        let before = self.events.len();
        let Some(mut load) = self.background.take() else {
            return 0;
        };

        loop {
            match load.try_next() {
                Ok(Some(Loaded { request, result })) => {
                    load.processed += 1;
                    match result {
                        Ok(resource) => {
                            load.loaded += 1;
                            if request.overwrite || !self.contains(&request.key, request.kind) {
                                self.insert(request.key.clone(), resource);
                            }
                            self.events.push(LoadEvent::Progress {
                                key: request.key,
                                fraction: load.processed as f32 / load.total as f32,
                            });
                        }
                        Err(error) => {
                            load.failed += 1;
                            error!(key = %request.key, error = %error, "resource_load_failed");
                            self.events.push(LoadEvent::Failed { key: request.key, error });
                        }
                    }
                }
                Ok(None) => break,
                Err(()) => {
                    // Worker exited: anything it never reported counts as failed.
                    load.failed += load.total - load.processed;
                    load.processed = load.total;
                    break;
                }
            }
        }

        if load.is_done() {
            info!(loaded = load.loaded, failed = load.failed, "resource_background_load_finished");
            self.events.push(LoadEvent::Finished { loaded: load.loaded, failed: load.failed });
        } else {
            self.background = Some(load);
        }

        self.events.len() - before
    }

    /// Take every pending event produced by `start_loading`/`poll`.
    pub fn take_events(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.events)
    }
}
