use cadence2d::config::EngineConfig;
use cadence2d::error::ModuleError;
use cadence2d::modules::{Module, ModuleRegistry};
use cadence2d::Engine;

#[test]
fn names_round_trip() {
    for module in Module::ALL {
        assert_eq!(module.name().parse::<Module>().unwrap(), module);
        assert_eq!(module.to_string(), module.name());
    }
}

#[test]
fn unknown_name_is_rejected() {
    assert!(matches!("physics".parse::<Module>(), Err(ModuleError::Unknown(name)) if name == "physics"));
}

#[test]
fn serde_uses_kebab_case_names() {
    assert_eq!(serde_json::to_string(&Module::AudioManager).unwrap(), "\"audio-manager\"");
    let parsed: Vec<Module> = serde_json::from_str(r#"["debug", "resource-manager"]"#).unwrap();
    assert_eq!(parsed, vec![Module::Debug, Module::ResourceManager]);
}

#[test]
fn loading_twice_is_an_error() {
    let mut registry = ModuleRegistry::new();
    assert_eq!(registry.load("camera").unwrap(), Module::Camera);
    assert!(matches!(registry.load("camera"), Err(ModuleError::AlreadyLoaded(_))));
    assert!(registry.is_loaded(Module::Camera));
}

/// `load_all` skips modules that are already loaded.
#[test]
fn load_all_returns_only_new_modules() {
    let mut registry = ModuleRegistry::new();
    registry.load("tilemap").unwrap();

    let loaded = registry.load_all();
    assert_eq!(loaded.len(), Module::ALL.len() - 1);
    assert!(!loaded.contains(&Module::Tilemap));
    assert!(registry.load_all().is_empty());
}

#[test]
fn loading_debug_enables_the_overlay() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.debug.enabled = false;

    engine.load_module("debug").unwrap();

    assert!(engine.debug.enabled);
    assert!(engine.modules.is_loaded(Module::Debug));
}
