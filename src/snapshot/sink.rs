//! Slice persistence.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::KernelConfig;
use crate::types::{SliceReport, SliceSummary};
use crate::KERNEL_SCHEMA_VERSION;

/// Error while persisting a slice.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// File or directory operation failed.
    #[error("cannot write {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Output path exists but is not a directory.
    #[error("output path {0} is not a directory")]
    NotADirectory(PathBuf),
    /// Manifest serialization failed.
    #[error("cannot serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Destination for emitted slices.
pub trait SnapshotSink {
    /// Persist one slice.
    fn write_slice(&mut self, report: &SliceReport) -> Result<(), SinkError>;

    /// Called once after the last slice.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<K: SnapshotSink + ?Sized> SnapshotSink for Box<K> {
    fn write_slice(&mut self, report: &SliceReport) -> Result<(), SinkError> {
        (**self).write_slice(report)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotSink {
    reports: Vec<SliceReport>,
    finished: bool,
}

impl MemorySnapshotSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports received so far.
    pub fn reports(&self) -> &[SliceReport] {
        &self.reports
    }

    /// Whether `finish` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take ownership of the reports.
    pub fn into_reports(self) -> Vec<SliceReport> {
        self.reports
    }
}

impl SnapshotSink for MemorySnapshotSink {
    fn write_slice(&mut self, report: &SliceReport) -> Result<(), SinkError> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

/// Run manifest written by [`FileSnapshotSink::finish`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version of the output files.
    pub schema_version: String,
    /// Configuration of the run.
    pub config: KernelConfig,
    /// One summary per emitted slice.
    pub slices: Vec<SliceSummary>,
}

/// Artifact file names for slice `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceFiles {
    /// `graph-N.tsv`
    pub graph: PathBuf,
    /// `communities-N.tsv`
    pub communities: PathBuf,
    /// `merging-N.tsv`
    pub merging: PathBuf,
    /// `splitting-N.tsv`
    pub splitting: PathBuf,
}

impl SliceFiles {
    /// File paths for slice `index` under `dir`.
    pub fn new(dir: &Path, index: u64) -> Self {
        Self {
            graph: dir.join(format!("graph-{index}.tsv")),
            communities: dir.join(format!("communities-{index}.tsv")),
            merging: dir.join(format!("merging-{index}.tsv")),
            splitting: dir.join(format!("splitting-{index}.tsv")),
        }
    }
}

/// Name of the manifest file.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes tab-separated slice files into a directory.
#[derive(Debug)]
pub struct FileSnapshotSink {
    dir: PathBuf,
    config: KernelConfig,
    summaries: Vec<SliceSummary>,
}

impl FileSnapshotSink {
    /// Open `config.output_dir`, creating it if needed.
    pub fn create(config: &KernelConfig) -> Result<Self, SinkError> {
        let dir = config.output_dir.clone();
        if dir.exists() && !dir.is_dir() {
            return Err(SinkError::NotADirectory(dir));
        }
        fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            config: config.clone(),
            summaries: Vec::new(),
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_lines<I, S>(path: &Path, lines: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = S>,
        S: Display,
    {
        let io_err = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        for line in lines {
            writeln!(out, "{line}").map_err(io_err)?;
        }
        out.flush().map_err(io_err)
    }
}

/// Render ids the way list columns are written: `[1, 2, 3]`.
pub fn format_id_list<T: Display>(ids: &[T]) -> String {
    let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}

impl SnapshotSink for FileSnapshotSink {
    fn write_slice(&mut self, report: &SliceReport) -> Result<(), SinkError> {
        let files = SliceFiles::new(&self.dir, report.index);

        Self::write_lines(
            &files.splitting,
            report
                .splits
                .iter()
                .map(|s| format!("{}\t{}", s.origin, format_id_list(&s.spawned))),
        )?;
        Self::write_lines(
            &files.communities,
            report
                .communities
                .iter()
                .map(|c| format!("{}\t{}", c.id, format_id_list(&c.members))),
        )?;
        Self::write_lines(
            &files.graph,
            report
                .edges
                .iter()
                .map(|e| format!("{}\t{}\t{}", e.u, e.v, e.weight)),
        )?;
        Self::write_lines(
            &files.merging,
            report
                .merges
                .iter()
                .map(|m| format!("{}\t{}", m.canonical, format_id_list(&m.absorbed))),
        )?;

        self.summaries.push(report.summary());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let manifest = RunManifest {
            schema_version: KERNEL_SCHEMA_VERSION.to_string(),
            config: self.config.clone(),
            slices: self.summaries.clone(),
        };
        let path = self.dir.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(&manifest)?;
        fs::write(&path, bytes).map_err(|source| SinkError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommunityId, CommunityRecord, NodeId};

    #[test]
    fn test_id_list_format() {
        assert_eq!(format_id_list(&[NodeId::new(1), NodeId::new(22)]), "[1, 22]");
        assert_eq!(format_id_list::<CommunityId>(&[]), "[]");
    }

    #[test]
    fn test_slice_file_names() {
        let files = SliceFiles::new(Path::new("out"), 3);
        assert_eq!(files.graph, Path::new("out").join("graph-3.tsv"));
        assert_eq!(files.splitting, Path::new("out").join("splitting-3.tsv"));
    }

    #[test]
    fn test_memory_sink_keeps_reports() {
        let mut sink = MemorySnapshotSink::new();
        let report = SliceReport {
            index: 0,
            window_start: None,
            window_end: None,
            added: 0,
            removed: 0,
            communities: vec![CommunityRecord {
                id: CommunityId::new(1),
                members: vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)],
            }],
            edges: vec![],
            merges: vec![],
            splits: vec![],
        };
        sink.write_slice(&report).unwrap();
        sink.finish().unwrap();
        assert!(sink.is_finished());
        assert_eq!(sink.reports(), &[report]);
    }
}
