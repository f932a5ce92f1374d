//! # Config Hot-Reloading
//!
//! Watches the scene config file and sends every successfully parsed version over a
//! channel. The main loop drains the channel between frames, so the simulation never
//! sees a config change in the middle of one.
//!
//! The parent directory is watched, not the file, so saves that replace the file
//! through a rename are still picked up.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use scene::SceneConfig;
use tracing::{error, info, warn};

/// Reads and parses a config file.
pub fn load(path: &Path) -> Result<SceneConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    SceneConfig::from_json(&text).with_context(|| format!("invalid scene config {}", path.display()))
}

fn is_target(event: &Event, file_name: &std::ffi::OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Starts watching `path`. Drop the returned watcher to stop.
pub fn start(path: &Path) -> Result<(RecommendedWatcher, Receiver<SceneConfig>)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{} does not name a file", path.display()))?
        .to_owned();
    let target: PathBuf = path.to_path_buf();
    let (sender, receiver) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !is_target(&event, &file_name) {
                return;
            }
            match load(&target) {
                Ok(config) => {
                    info!("Config changed: {}", target.display());
                    // the receiver is gone once the main loop has finished
                    let _ = sender.send(config);
                }
                Err(e) => warn!("Ignoring config change: {e:#}"),
            }
        }
        Err(e) => error!("Error watching config file: {e:?}"),
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    info!("Config watcher started for {}", path.display());
    Ok((watcher, receiver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};
    use std::ffi::OsStr;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("runtime-watcher-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_and_rejects_configs() {
        let good = temp_file("good", r#"{"physics": {"damping": 0.5}}"#);
        assert!((load(&good).unwrap().physics.damping - 0.5).abs() < f32::EPSILON);

        let bad = temp_file("bad", r#"{"capacities": {"cone": 3}}"#);
        let err = load(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("invalid scene config"));

        assert!(load(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn only_writes_to_the_config_file_count() {
        let name = OsStr::new("scene.json");
        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/tmp/x/scene.json"));
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("scene.json"));
        let other = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/tmp/x/notes.txt"));
        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("/tmp/x/scene.json"));

        assert!(is_target(&modify, name));
        assert!(is_target(&create, name));
        assert!(!is_target(&other, name));
        assert!(!is_target(&removed, name));
    }
}
