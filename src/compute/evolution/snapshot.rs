//! Snapshot sinks receiving the archive state after initialization and every step.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::schema::ArchiveSnapshot;

use super::error::SnapshotError;

/// Destination for archive snapshots.
pub trait SnapshotSink<C> {
    /// Record one snapshot of the named problem's archive.
    fn record(&mut self, problem: &str, snapshot: &ArchiveSnapshot<C>)
    -> Result<(), SnapshotError>;
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<C> SnapshotSink<C> for NullSink {
    fn record(&mut self, _: &str, _: &ArchiveSnapshot<C>) -> Result<(), SnapshotError> {
        Ok(())
    }
}

/// Keeps every snapshot in memory.
#[derive(Debug, Clone)]
pub struct MemorySink<C> {
    snapshots: Vec<ArchiveSnapshot<C>>,
}

impl<C> Default for MemorySink<C> {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }
}

impl<C> MemorySink<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[ArchiveSnapshot<C>] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&ArchiveSnapshot<C>> {
        self.snapshots.last()
    }
}

impl<C: Clone> SnapshotSink<C> for MemorySink<C> {
    fn record(&mut self, _: &str, snapshot: &ArchiveSnapshot<C>) -> Result<(), SnapshotError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// Writes `<root>/<problem>/iter_<n>.json` as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonSnapshotWriter {
    root: PathBuf,
    last_written: Option<PathBuf>,
}

impl JsonSnapshotWriter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            last_written: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the most recent snapshot, if any.
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }

    /// Path a snapshot of `problem` at `iter` is written to.
    pub fn path_for(&self, problem: &str, iter: usize) -> PathBuf {
        self.root.join(problem).join(format!("iter_{iter}.json"))
    }
}

impl<C: Serialize> SnapshotSink<C> for JsonSnapshotWriter {
    fn record(
        &mut self,
        problem: &str,
        snapshot: &ArchiveSnapshot<C>,
    ) -> Result<(), SnapshotError> {
        let path = self.path_for(problem, snapshot.iter);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)?;
        log::debug!("Wrote snapshot {}", path.display());

        self.last_written = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EliteRecord, Info};
    use tempfile::tempdir;

    fn sample() -> ArchiveSnapshot<u32> {
        ArchiveSnapshot {
            iter: 2,
            space_size: 4,
            coverage: 0.25,
            grid: vec![
                vec![
                    Some(EliteRecord {
                        control: 7,
                        info: Info::new().with("path", 12.0),
                        quality: 0.5,
                        diversity: 0.1,
                        controllability: 0.0,
                    }),
                    None,
                ],
                vec![None, None],
            ],
        }
    }

    #[test]
    fn test_json_writer_layout() {
        let dir = tempdir().unwrap();
        let mut writer = JsonSnapshotWriter::new(dir.path());
        writer.record("binary", &sample()).unwrap();

        let path = dir.path().join("binary").join("iter_2.json");
        assert!(path.exists());
        assert_eq!(writer.last_written(), Some(path.as_path()));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["iter"], 2);
        assert_eq!(value["space_size"], 4);
        assert_eq!(value["coverage"], 0.25);
        assert_eq!(value["grid"][0][0]["control"], 7);
        assert_eq!(value["grid"][0][0]["info"]["path"], 12.0);
        assert!(value["grid"][0][1].is_null());
        assert!(value["grid"][0][0].get("content").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let mut writer = JsonSnapshotWriter::new(dir.path());
        let snapshot = sample();
        writer.record("binary", &snapshot).unwrap();

        let text = fs::read_to_string(writer.path_for("binary", 2)).unwrap();
        let back: ArchiveSnapshot<u32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_rewritten_iteration_overwrites_file() {
        let dir = tempdir().unwrap();
        let mut writer = JsonSnapshotWriter::new(dir.path());
        let mut snapshot = sample();
        writer.record("binary", &snapshot).unwrap();
        snapshot.coverage = 0.5;
        writer.record("binary", &snapshot).unwrap();

        let path = writer.path_for("binary", 2);
        assert_eq!(writer.last_written(), Some(path.as_path()));
        let back: ArchiveSnapshot<u32> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.coverage, 0.5);
        assert_eq!(fs::read_dir(dir.path().join("binary")).unwrap().count(), 1);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.record("binary", &sample()).unwrap();
        assert_eq!(sink.snapshots().len(), 1);
        assert_eq!(sink.latest().map(|s| s.filled()), Some(1));
    }
}
