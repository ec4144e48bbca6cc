//! Country and chart data from JSON files, with the built-in demo set as the
//! fallback when nothing is configured or a file is unusable.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use orbis_globe::{ChartSet, demo_charts, demo_countries};
use orbis_mesh::CountrySet;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `{ "<country>": { "vertices": [...], "triangles": [...], "polygons": [...] } }`
pub fn load_countries(path: &Path) -> Result<CountrySet, LoadError> {
    let mut countries: CountrySet = read_json(path)?;
    let dropped = countries.retain_valid();
    if dropped > 0 {
        tracing::warn!(dropped, path = %path.display(), "Dropped invalid countries");
    }
    Ok(countries)
}

/// `{ "<country>": { "track_image_urls": [...] } }`
pub fn load_charts(path: &Path) -> Result<ChartSet, LoadError> {
    read_json(path)
}

/// Countries from `path`, or the demo set.
pub fn countries_or_demo(path: Option<&Path>) -> CountrySet {
    let Some(path) = path else {
        tracing::info!("No country file configured, using demo countries");
        return demo_countries();
    };
    match load_countries(path) {
        Ok(countries) => {
            tracing::info!(count = countries.len(), path = %path.display(), "Loaded countries");
            countries
        }
        Err(e) => {
            tracing::error!("{e}; falling back to demo countries");
            demo_countries()
        }
    }
}

/// Charts from `path`, or the demo charts when no file is configured. A
/// broken chart file yields no charts rather than unrelated demo data.
pub fn charts_or_demo(path: Option<&Path>) -> ChartSet {
    let Some(path) = path else {
        return demo_charts();
    };
    match load_charts(path) {
        Ok(charts) => {
            tracing::info!(count = charts.len(), path = %path.display(), "Loaded charts");
            charts
        }
        Err(e) => {
            tracing::error!("{e}; continuing without chart data");
            ChartSet::new()
        }
    }
}

/// Background chart fetch. The receiver yields exactly one set.
pub struct ChartLoader {
    receiver: Receiver<ChartSet>,
    handle: Option<JoinHandle<()>>,
}

impl ChartLoader {
    pub fn spawn(path: Option<PathBuf>) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let handle = std::thread::Builder::new()
            .name("chart-loader".into())
            .spawn(move || {
                let charts = charts_or_demo(path.as_deref());
                // The app may have exited already.
                let _ = sender.send(charts);
            })
            .map_err(|e| tracing::error!("Failed to spawn chart loader: {e}"))
            .ok();
        Self { receiver, handle }
    }

    /// The charts once they have arrived.
    pub fn try_take(&mut self) -> Option<ChartSet> {
        let charts = self.receiver.try_recv().ok()?;
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("Chart loader thread panicked");
        }
        Some(charts)
    }

    /// Whether the loader can still deliver.
    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_countries_drops_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "countries.json",
            r#"{
                "Good": { "vertices": [0, 0, 1, 0, 1, 1], "triangles": [0, 1, 2] },
                "Bad": { "vertices": [0, 0, 1, 0], "triangles": [0, 1, 7] }
            }"#,
        );
        let countries = load_countries(&path).unwrap();
        assert_eq!(countries.len(), 1);
        assert!(countries.get("Good").is_some());
    }

    #[test]
    fn test_load_charts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "charts.json",
            r#"{ "Good": { "track_image_urls": ["a.png"] }, "Empty": {} }"#,
        );
        let charts = load_charts(&path).unwrap();
        assert_eq!(charts.len(), 2);
    }

    #[test]
    fn test_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_countries(&missing), Err(LoadError::Read { .. })));

        let broken = write_file(dir.path(), "broken.json", "{ not json");
        assert!(matches!(load_charts(&broken), Err(LoadError::Parse { .. })));
        assert!(charts_or_demo(Some(&broken)).is_empty());
        assert_eq!(countries_or_demo(Some(&broken)).len(), demo_countries().len());
    }

    #[test]
    fn test_chart_loader_delivers_once() {
        let mut loader = ChartLoader::spawn(None);
        let mut charts = None;
        for _ in 0..200 {
            charts = loader.try_take();
            if charts.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(charts.map(|c| c.len()), Some(demo_charts().len()));
        assert!(!loader.is_pending());
        assert!(loader.try_take().is_none());
    }
}
