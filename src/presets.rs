use std::collections::HashMap;

use crate::error::{ConfigError, Result};
use crate::pipeline::RetroParams;

/// Named parameter sets
///
/// Presets are stored as factories so every lookup hands out a fresh,
/// independently editable [`RetroParams`].
pub struct PresetRegistry {
    presets: HashMap<String, Box<dyn Fn() -> RetroParams>>,
}

impl PresetRegistry {
    /// Registry with the built-in presets
    pub fn new() -> Self {
        let mut registry = Self {
            presets: HashMap::new(),
        };
        registry.register_builtin_presets();
        registry
    }

    fn register_builtin_presets(&mut self) {
        // Full camcorder look
        self.register("camcorder", RetroParams::default);

        // Scanlines, shake and grade only; no lens or tape damage
        self.register("classic", || RetroParams {
            color_bleed: 0.0,
            lens_fringe: 0.0,
            vignette: 0.0,
            lens_damage: 0.0,
            wave_amount: 0.0,
            roll_speed: 0.0,
            bit_crush: 0.0,
            ..RetroParams::default()
        });

        // Chewed-up tape
        self.register("worn", || RetroParams {
            wave_amount: 2.0,
            roll_speed: 1.5,
            bit_crush: 30.0,
            color_bleed: 5.0,
            lens_fringe: 3.0,
            tracking_noise: 0.8,
            lens_damage: 0.8,
            ..RetroParams::default()
        });

        self.register("clean", RetroParams::neutral);
    }

    /// Register a custom preset, replacing any preset with the same name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> RetroParams + 'static,
    {
        self.presets.insert(name.to_string(), Box::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<RetroParams> {
        self.presets.get(name).map(|factory| factory())
    }

    /// Like [`get`](Self::get), but an unknown name is a configuration error
    pub fn resolve(&self, name: &str) -> Result<RetroParams> {
        self.get(name).ok_or_else(|| {
            ConfigError::UnknownPreset {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Preset names, sorted
    pub fn available_presets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.presets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_preset(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
