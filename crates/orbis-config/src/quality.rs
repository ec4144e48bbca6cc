//! Render quality tier, adapter-based detection and the persisted preference.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Render quality tier, ordered from cheapest to most expensive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Quality {
    UltraLow,
    Low,
    Mid,
    High,
}

/// Coarse adapter class used for quality detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Software,
    Integrated,
    Discrete,
    Unknown,
}

/// Adapter name fragments that identify CPU rasterizers.
const SOFTWARE_RENDERERS: &[&str] = &["llvmpipe", "swiftshader", "softpipe", "lavapipe", "warp"];

/// Adapter name fragments that identify mobile-class GPUs.
const MOBILE_GPUS: &[&str] = &["mali", "adreno", "powervr", "videocore"];

impl Quality {
    /// All tiers in ascending order.
    pub const ALL: [Quality; 4] = [Quality::UltraLow, Quality::Low, Quality::Mid, Quality::High];

    /// Pick a tier from what the adapter reports about itself.
    pub fn detect(adapter_name: &str, class: DeviceClass) -> Self {
        let name = adapter_name.to_ascii_lowercase();
        if class == DeviceClass::Software || SOFTWARE_RENDERERS.iter().any(|s| name.contains(s)) {
            return Quality::UltraLow;
        }
        if MOBILE_GPUS.iter().any(|s| name.contains(s)) {
            return Quality::Low;
        }
        match class {
            DeviceClass::Discrete => Quality::High,
            DeviceClass::Integrated => Quality::Mid,
            DeviceClass::Software => Quality::UltraLow,
            DeviceClass::Unknown => Quality::Low,
        }
    }

    /// Whether the starfield background is drawn at all.
    #[must_use]
    pub fn starfield_enabled(self) -> bool {
        self != Quality::UltraLow
    }

    /// Number of parallax star layers drawn by the starfield shader.
    #[must_use]
    pub fn starfield_layers(self) -> u32 {
        match self {
            Quality::UltraLow => 0,
            Quality::Low => 2,
            Quality::Mid => 4,
            Quality::High => 6,
        }
    }

    /// Frame-rate cap for the redraw loop.
    #[must_use]
    pub fn target_fps(self) -> u32 {
        match self {
            Quality::High => 60,
            _ => 30,
        }
    }

    /// The next tier, wrapping from `High` back to `UltraLow`.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Quality::UltraLow => Quality::Low,
            Quality::Low => Quality::Mid,
            Quality::Mid => Quality::High,
            Quality::High => Quality::UltraLow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::UltraLow => "Ultra-Low",
            Quality::Low => "Low",
            Quality::Mid => "Mid",
            Quality::High => "High",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredQuality {
    quality: Quality,
}

/// Persists the user's explicit quality choice as `quality.ron`.
///
/// Read once at startup. Written only when the user changes the tier, so a
/// detected tier never overrides itself on the next run.
#[derive(Debug, Clone)]
pub struct QualityStore {
    path: PathBuf,
}

impl QualityStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("quality.ron"),
        }
    }

    /// The stored preference, or `None` if nothing was ever saved.
    pub fn load(&self) -> Result<Option<Quality>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path).map_err(ConfigError::ReadError)?;
        let stored: StoredQuality = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        Ok(Some(stored.quality))
    }

    pub fn save(&self, quality: Quality) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let serialized =
            ron::to_string(&StoredQuality { quality }).map_err(ConfigError::SerializeError)?;
        std::fs::write(&self.path, serialized).map_err(ConfigError::WriteError)?;
        log::info!("Saved quality preference {}", quality.label());
        Ok(())
    }

    /// Stored preference if present and readable, otherwise `detected`.
    pub fn resolve(&self, detected: Quality) -> Quality {
        match self.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => detected,
            Err(e) => {
                log::warn!("Ignoring unreadable quality preference: {e}");
                detected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_renderer_is_ultra_low() {
        assert_eq!(
            Quality::detect("llvmpipe (LLVM 15.0.7, 256 bits)", DeviceClass::Integrated),
            Quality::UltraLow
        );
        assert_eq!(
            Quality::detect("Some GPU", DeviceClass::Software),
            Quality::UltraLow
        );
    }

    #[test]
    fn test_device_class_mapping() {
        assert_eq!(
            Quality::detect("NVIDIA GeForce RTX 3070", DeviceClass::Discrete),
            Quality::High
        );
        assert_eq!(
            Quality::detect("Intel(R) UHD Graphics 620", DeviceClass::Integrated),
            Quality::Mid
        );
        assert_eq!(
            Quality::detect("Mali-G78", DeviceClass::Integrated),
            Quality::Low
        );
        assert_eq!(Quality::detect("", DeviceClass::Unknown), Quality::Low);
    }

    #[test]
    fn test_tier_capabilities() {
        assert!(!Quality::UltraLow.starfield_enabled());
        assert!(Quality::Low.starfield_enabled());
        assert!(Quality::Low.starfield_layers() < Quality::High.starfield_layers());
        assert_eq!(Quality::Mid.target_fps(), 30);
        assert_eq!(Quality::High.target_fps(), 60);
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut q = Quality::UltraLow;
        for expected in Quality::ALL.iter().skip(1) {
            q = q.next();
            assert_eq!(q, *expected);
        }
        assert_eq!(q.next(), Quality::UltraLow);
    }

    #[test]
    fn test_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = QualityStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.resolve(Quality::Mid), Quality::Mid);
    }

    #[test]
    fn test_store_persists_explicit_choice() {
        let dir = tempfile::tempdir().unwrap();
        let store = QualityStore::new(dir.path());
        store.save(Quality::Low).unwrap();

        let reopened = QualityStore::new(dir.path());
        assert_eq!(reopened.load().unwrap(), Some(Quality::Low));
        assert_eq!(reopened.resolve(Quality::High), Quality::Low);
    }

    #[test]
    fn test_store_corrupt_file_falls_back_to_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quality.ron"), "{{garbage").unwrap();
        let store = QualityStore::new(dir.path());
        assert!(store.load().is_err());
        assert_eq!(store.resolve(Quality::High), Quality::High);
    }
}
