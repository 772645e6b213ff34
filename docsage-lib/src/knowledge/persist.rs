use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::Config;
use crate::embed::Vectorizer;
use crate::fetch::Fetcher;
use crate::index::{Fingerprint, FlatIndex, VectorIndex};
use crate::knowledge::{read_seed_list, BuildOptions, BuildReport, KnowledgeBase};
use crate::{Error, Result};

/// Locations of the two persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Binary vector index
    pub index: PathBuf,
    /// JSON array of chunk texts
    pub docs: PathBuf,
}

impl StorePaths {
    pub fn new(index: impl Into<PathBuf>, docs: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            docs: docs.into(),
        }
    }

    /// Whether both artifacts are present on disk
    #[must_use]
    pub fn exist(&self) -> bool {
        self.index.exists() && self.docs.exists()
    }
}

impl From<&Config> for StorePaths {
    fn from(config: &Config) -> Self {
        Self::new(&config.index_file, &config.docs_file)
    }
}

impl KnowledgeBase {
    /// Write the index and the chunk texts.
    ///
    /// Both artifacts are written to temporary siblings before either is
    /// renamed into place, and the index header records the SHA-256 of the
    /// document artifact. A failure part way through leaves either the old
    /// pair or a pair that [`load`](Self::load) rejects, never a mismatched
    /// pair that loads.
    pub fn persist(&self, paths: &StorePaths) -> Result<()> {
        let docs = serde_json::to_vec(&self.documents)
            .map_err(|e| Error::Store(format!("cannot encode documents: {e}")))?;
        let index = self.index.to_bytes(&fingerprint(&docs));

        let index_tmp = write_tmp(&paths.index, &index)?;
        let docs_tmp = match write_tmp(&paths.docs, &docs) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&index_tmp);
                return Err(e);
            }
        };

        fs::rename(&index_tmp, &paths.index)?;
        fs::rename(&docs_tmp, &paths.docs)?;

        info!(
            documents = self.documents.len(),
            index = %paths.index.display(),
            docs = %paths.docs.display(),
            "persisted knowledge base"
        );
        Ok(())
    }

    /// Load a persisted knowledge base.
    ///
    /// Returns `Ok(None)` when either artifact is missing, cannot be decoded,
    /// has a different dimension, or was not written alongside the other.
    /// Only I/O failures other than "not found" are errors.
    pub fn load(paths: &StorePaths, dimension: usize) -> Result<Option<Self>> {
        let Some(index_bytes) = read_optional(&paths.index)? else {
            info!(path = %paths.index.display(), "no persisted index");
            return Ok(None);
        };
        let Some(docs_bytes) = read_optional(&paths.docs)? else {
            info!(path = %paths.docs.display(), "no persisted documents");
            return Ok(None);
        };

        let (index, recorded) = match FlatIndex::from_bytes(&index_bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(path = %paths.index.display(), error = %e, "persisted index is unreadable");
                return Ok(None);
            }
        };
        if recorded != fingerprint(&docs_bytes) {
            warn!(
                index = %paths.index.display(),
                docs = %paths.docs.display(),
                "persisted index was written for different documents"
            );
            return Ok(None);
        }
        let documents: Vec<String> = match serde_json::from_slice(&docs_bytes) {
            Ok(documents) => documents,
            Err(e) => {
                warn!(path = %paths.docs.display(), error = %e, "persisted documents are unreadable");
                return Ok(None);
            }
        };

        if index.dimension() != dimension {
            warn!(
                expected = dimension,
                found = index.dimension(),
                "persisted index has a different dimension"
            );
            return Ok(None);
        }
        if index.len() != documents.len() {
            warn!(
                vectors = index.len(),
                documents = documents.len(),
                "persisted index and documents disagree"
            );
            return Ok(None);
        }

        Ok(Some(Self { index, documents }))
    }

    /// Startup policy: load the persisted knowledge base, or build it from
    /// the seed list when it is absent.
    ///
    /// A rebuilt knowledge base is persisted only if it holds at least one
    /// chunk, so an empty build is retried on the next start. The report is
    /// `None` when the knowledge base came from disk.
    pub async fn open_or_build(
        config: &Config,
        fetcher: &dyn Fetcher,
        vectorizer: &Vectorizer,
    ) -> Result<(Self, Option<BuildReport>)> {
        let paths = StorePaths::from(config);
        let dimension = config.embedding.dimension;

        if let Some(kb) = Self::load(&paths, dimension)? {
            info!(documents = kb.len(), "loaded knowledge base");
            return Ok((kb, None));
        }

        warn!("knowledge base missing, rebuilding");
        let (kb, report) = Self::rebuild(config, fetcher, vectorizer).await?;
        Ok((kb, Some(report)))
    }

    /// Build from the configured seed list regardless of what is on disk.
    pub async fn rebuild(
        config: &Config,
        fetcher: &dyn Fetcher,
        vectorizer: &Vectorizer,
    ) -> Result<(Self, BuildReport)> {
        let urls = read_seed_list(&config.seed_file)?;

        let mut kb = Self::new(config.embedding.dimension);
        let report = kb
            .build(&urls, fetcher, vectorizer, &BuildOptions::from(config))
            .await?;

        if kb.is_empty() {
            warn!("build produced no documents, nothing persisted");
        } else {
            kb.persist(&StorePaths::from(config))?;
        }
        Ok((kb, report))
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// SHA-256 of the encoded document artifact
fn fingerprint(docs: &[u8]) -> Fingerprint {
    let mut out = Fingerprint::default();
    out.copy_from_slice(&Sha256::digest(docs));
    out
}

/// Write `bytes` next to `path` and return the temporary path.
fn write_tmp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    Ok(tmp)
}
