use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use kira::sound::static_sound::StaticSoundData;

use super::{ResourceKind, ResourceRequest};
use crate::canvas::Image;
use crate::error::ResourceError;

/// A decoded resource, ready to be stored.
pub enum Resource {
    Image(Image),
    Sound(StaticSoundData),
    Data(String),
}

/// Read and decode one request. `path` is the already-resolved file path.
pub(crate) fn decode(request: &ResourceRequest, path: &Path) -> Result<Resource, ResourceError> {
    let key = &request.key;
    let bytes = std::fs::read(path).map_err(|source| ResourceError::Read {
        key: key.clone(),
        path: path.to_path_buf(),
        source,
    })?;

    match request.kind {
        ResourceKind::Image => Image::from_bytes(&bytes)
            .map(Resource::Image)
            .map_err(|source| ResourceError::Image { key: key.clone(), source }),
        ResourceKind::Sound => StaticSoundData::from_cursor(Cursor::new(bytes))
            .map(Resource::Sound)
            .map_err(|e| ResourceError::Sound { key: key.clone(), message: e.to_string() }),
        ResourceKind::Data => String::from_utf8(bytes)
            .map(Resource::Data)
            .map_err(|_| ResourceError::NotText { key: key.clone() }),
    }
}

/// Message sent from the loading thread for each processed request.
pub(crate) struct Loaded {
    pub request: ResourceRequest,
    pub result: Result<Resource, ResourceError>,
}

/// A queue being loaded on a background thread.
pub(crate) struct BackgroundLoad {
    receiver: Receiver<Loaded>,
    pub total: usize,
    pub processed: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl BackgroundLoad {
    /// `rejected` requests never reach the worker; they count as already
    /// processed and failed.
    pub fn spawn(jobs: Vec<(ResourceRequest, PathBuf)>, rejected: usize) -> Self {
        let (sender, receiver) = channel();
        let total = jobs.len() + rejected;

        thread::Builder::new()
            .name("resource-loader".into())
            .spawn(move || {
                for (request, path) in jobs {
                    let result = decode(&request, &path);
                    if sender.send(Loaded { request, result }).is_err() {
                        // Receiver dropped: the manager is gone, stop early.
                        break;
                    }
                }
            })
            .map(|_| ())
            .unwrap_or_else(|e| tracing::error!(error = %e, "resource_loader_spawn_failed"));

        Self { receiver, total, processed: rejected, loaded: 0, failed: rejected }
    }

    /// Next finished item, if any. `Err(())` once the worker is gone.
    pub fn try_next(&mut self) -> Result<Option<Loaded>, ()> {
        match self.receiver.try_recv() {
            Ok(item) => Ok(Some(item)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.processed >= self.total
    }
}
