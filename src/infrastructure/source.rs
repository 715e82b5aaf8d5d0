//! Tree data sources
//!
//! The menu never fetches anything itself; a [`TreeDataSource`] hands it a
//! decoded [`TreeNodeData`] document.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::TreeNodeData;
use crate::infrastructure::error::{InfraError, InfraResult, IoResultExt};

/// Where tree data comes from.
pub trait TreeDataSource {
    /// Read and decode the whole tree document.
    fn load(&self) -> InfraResult<TreeNodeData>;

    /// Human readable origin, used in messages.
    fn origin(&self) -> String;
}

/// JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TreeDataSource for FileDataSource {
    fn load(&self) -> InfraResult<TreeNodeData> {
        debug!("load: {}", self.path.display());
        let content = std::fs::read_to_string(&self.path)
            .with_path_context("read tree data", &self.path)?;
        decode(&content, self.origin())
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// JSON document on standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinDataSource;

impl TreeDataSource for StdinDataSource {
    fn load(&self) -> InfraResult<TreeNodeData> {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| InfraError::io("read tree data: <stdin>", e))?;
        decode(&content, self.origin())
    }

    fn origin(&self) -> String {
        "<stdin>".into()
    }
}

/// JSON document held in memory.
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    content: String,
}

impl StaticDataSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl TreeDataSource for StaticDataSource {
    fn load(&self) -> InfraResult<TreeNodeData> {
        decode(&self.content, self.origin())
    }

    fn origin(&self) -> String {
        "<memory>".into()
    }
}

/// `-` selects standard input, anything else a file.
pub fn source_for(arg: &Path) -> Box<dyn TreeDataSource> {
    if arg == Path::new("-") {
        Box::new(StdinDataSource)
    } else {
        Box::new(FileDataSource::new(arg))
    }
}

fn decode(content: &str, origin: String) -> InfraResult<TreeNodeData> {
    TreeNodeData::from_json(content).map_err(|source| InfraError::Decode { origin, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeKey;

    #[test]
    fn given_memory_json_when_loading_then_decodes() {
        let source = StaticDataSource::new(r#"{"children":[{"id":3,"sub_level":"work","title":"W"}]}"#);
        let data = source.load().unwrap();
        assert_eq!(data.child_records()[0].id, Some(NodeKey::Int(3)));
    }

    #[test]
    fn given_missing_file_when_loading_then_io_error_with_path() {
        let source = FileDataSource::new("/nonexistent/tree.json");
        let err = source.load().unwrap_err();
        assert!(matches!(err, InfraError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/tree.json"));
    }

    #[test]
    fn given_garbage_when_loading_then_decode_error() {
        let err = StaticDataSource::new("[1,2").load().unwrap_err();
        assert!(matches!(err, InfraError::Decode { .. }));
    }
}
