//! Loading source suites from disk.
//!
//! A corpus is either a single suite file or a directory scanned recursively
//! for `*.json` files. Files ending in `schema.json` are JSON Schemas, not
//! suites, and are ignored.

use crate::error::{CclError, Result};
use crate::model::{SourceSuite, SourceTest};
use crate::util::content_hash_hex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A parsed suite with the facts the manifest needs.
#[derive(Debug, Clone)]
pub struct LoadedSuite {
    pub path: PathBuf,
    /// Path below the corpus root; the compiled output mirrors it.
    pub relative: PathBuf,
    /// File name without extension.
    pub stem: String,
    /// Hex SHA256 of the raw file.
    pub content_hash: String,
    pub suite: SourceSuite,
}

/// Every suite in a corpus, in path order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub suites: Vec<LoadedSuite>,
}

impl Corpus {
    /// All source tests across all suites.
    pub fn tests(&self) -> impl Iterator<Item = &SourceTest> {
        self.suites.iter().flat_map(|loaded| loaded.suite.tests.iter())
    }

    #[must_use]
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(|loaded| loaded.suite.tests.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

fn is_suite_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == "json") && !name.ends_with("schema.json")
}

/// Suite files under `dir`, sorted.
///
/// # Errors
///
/// Returns `CorpusNotFound` if `dir` does not exist, or `Io` if it cannot
/// be walked.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(CclError::CorpusNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| CclError::Io(e.into()))?;
        if entry.file_type().is_file() && is_suite_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read and parse one suite file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, or `SuiteParse` if it is not a
/// valid suite document.
pub fn load_suite(path: &Path) -> Result<LoadedSuite> {
    let bytes = fs::read(path)?;
    let suite: SourceSuite =
        serde_json::from_slice(&bytes).map_err(|e| CclError::SuiteParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative = path.file_name().map(PathBuf::from).unwrap_or_default();
    debug!(path = %path.display(), tests = suite.tests.len(), "Loaded suite");

    Ok(LoadedSuite {
        path: path.to_path_buf(),
        relative,
        stem,
        content_hash: content_hash_hex(&bytes),
        suite,
    })
}

/// Load a corpus from a directory or a single file.
///
/// # Errors
///
/// Returns `CorpusNotFound` if `path` does not exist, or the first load
/// failure among its files.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    if !path.exists() {
        return Err(CclError::CorpusNotFound {
            path: path.to_path_buf(),
        });
    }

    let (root, files) = if path.is_file() {
        (path.parent().unwrap_or(path), vec![path.to_path_buf()])
    } else {
        (path, discover(path)?)
    };

    let suites = files
        .iter()
        .map(|file| -> Result<LoadedSuite> {
            let mut loaded = load_suite(file)?;
            if let Ok(relative) = file.strip_prefix(root) {
                loaded.relative = relative.to_path_buf();
            }
            Ok(loaded)
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(path = %path.display(), files = suites.len(), "Loaded corpus");
    Ok(Corpus { suites })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, body).unwrap();
        path
    }

    const SUITE: &str = r#"{"suite": "s", "tests": [{"name": "t", "input": "a = 1", "validations": {"parse": []}}]}"#;

    #[test]
    fn discover_skips_schemas_and_other_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.json", SUITE);
        write(dir.path(), "nested/a.json", SUITE);
        write(dir.path(), "source-format.schema.json", "{}");
        write(dir.path(), "notes.txt", "hi");

        let files = discover(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.json", "a.json"]);
    }

    #[test]
    fn load_corpus_accepts_single_file() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "api_core.json", SUITE);
        let corpus = load_corpus(&file).unwrap();
        assert_eq!(corpus.suites.len(), 1);
        assert_eq!(corpus.suites[0].stem, "api_core");
        assert_eq!(corpus.suites[0].relative, PathBuf::from("api_core.json"));
        assert_eq!(corpus.test_count(), 1);
        assert_eq!(corpus.suites[0].content_hash.len(), 64);
    }

    #[test]
    fn nested_suites_keep_their_relative_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "level1/core.json", SUITE);
        write(dir.path(), "level2/core.json", SUITE);

        let corpus = load_corpus(dir.path()).unwrap();
        let relative: Vec<PathBuf> = corpus.suites.iter().map(|s| s.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![
                Path::new("level1").join("core.json"),
                Path::new("level2").join("core.json"),
            ]
        );
        assert!(corpus.suites.iter().all(|s| s.stem == "core"));
    }

    #[test]
    fn missing_corpus_is_reported() {
        let err = load_corpus(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CclError::CorpusNotFound { .. }));
    }

    #[test]
    fn malformed_suite_names_the_file() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "broken.json", "{ not json");
        let err = load_suite(&file).unwrap_err();
        match err {
            CclError::SuiteParse { path, .. } => assert_eq!(path, file),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
