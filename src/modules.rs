use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModuleError;

/// Optional subsystems that can be switched on by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    Animation,
    AudioManager,
    ResourceManager,
    Debug,
    Particle,
    Camera,
    Tilemap,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Animation,
        Module::AudioManager,
        Module::ResourceManager,
        Module::Debug,
        Module::Particle,
        Module::Camera,
        Module::Tilemap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Module::Animation => "animation",
            Module::AudioManager => "audio-manager",
            Module::ResourceManager => "resource-manager",
            Module::Debug => "debug",
            Module::Particle => "particle",
            Module::Camera => "camera",
            Module::Tilemap => "tilemap",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Module {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ModuleError::Unknown(s.to_string()))
    }
}

/// Set of loaded modules. Side effects of loading (starting audio, showing
/// the debug overlay) are performed by [`Engine::load_module`](crate::Engine::load_module).
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    loaded: BTreeSet<Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as loaded. Errors on unknown or already loaded names.
    pub fn load(&mut self, name: &str) -> Result<Module, ModuleError> {
        let module: Module = name.parse()?;
        if !self.loaded.insert(module) {
            return Err(ModuleError::AlreadyLoaded(name.to_string()));
        }
        Ok(module)
    }

    /// Load every module that is not loaded yet; returns the newly loaded ones.
    pub fn load_all(&mut self) -> Vec<Module> {
        Module::ALL.into_iter().filter(|m| self.loaded.insert(*m)).collect()
    }

    pub fn is_loaded(&self, module: Module) -> bool {
        self.loaded.contains(&module)
    }

    pub fn loaded(&self) -> impl Iterator<Item = Module> + '_ {
        self.loaded.iter().copied()
    }
}
