// File-backed tree store.
// One pretty-printed JSON record per tree, `tree-<id>.json`, in a single
// directory. Ids are assigned as (highest existing id + 1). Trees are stored
// in canonical export form.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::error::StoreError;
use crate::export::{self, Document};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTree {
    pub id: u64,
    pub name: String,
    pub tree: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TreeStore {
    dir: PathBuf,
}

impl TreeStore {
    /// Opens the store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All stored trees, newest first.
    pub fn list(&self) -> Result<Vec<StoredTree>, StoreError> {
        let mut out = Vec::new();
        for id in self.ids()? {
            out.push(self.read(id)?);
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    pub fn get(&self, id: u64) -> Result<StoredTree, StoreError> {
        if !self.record_path(id).is_file() {
            return Err(StoreError::NotFound(id));
        }
        self.read(id)
    }

    pub fn create(&self, doc: &Document) -> Result<StoredTree, StoreError> {
        let tree = canonical(doc)?;
        let id = self.ids()?.into_iter().max().map_or(1, |m| m + 1);
        let now = Utc::now();
        let rec = StoredTree {
            id,
            name: record_name(&tree),
            tree,
            created_at: now,
            updated_at: now,
        };
        self.write(&rec)?;
        info!(id, name = %rec.name, "created tree");
        Ok(rec)
    }

    /// Replaces the tree under `id`, keeping its creation time.
    pub fn update(&self, id: u64, doc: &Document) -> Result<StoredTree, StoreError> {
        let prev = self.get(id)?;
        let tree = canonical(doc)?;
        let rec = StoredTree {
            id,
            name: record_name(&tree),
            tree,
            created_at: prev.created_at,
            updated_at: Utc::now(),
        };
        self.write(&rec)?;
        info!(id, name = %rec.name, "updated tree");
        Ok(rec)
    }

    /// Update when `id` is given, create otherwise.
    pub fn save(&self, id: Option<u64>, doc: &Document) -> Result<StoredTree, StoreError> {
        match id {
            Some(id) => self.update(id, doc),
            None => self.create(doc),
        }
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let p = self.record_path(id);
        if !p.is_file() {
            return Err(StoreError::NotFound(id));
        }
        fs::remove_file(&p)?;
        info!(id, "deleted tree");
        Ok(())
    }

    /// Archives every record into `<store>_<timestamp>.zip` beside the
    /// store directory and returns the archive path.
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        let parent = self.dir.parent().unwrap_or(Path::new("."));
        let stem = self
            .dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("trees");
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let dest = parent.join(format!("{}_{}.zip", stem, ts));

        let ids = self.ids()?;
        let mut zip = zip::ZipWriter::new(fs::File::create(&dest)?);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        for &id in &ids {
            zip.start_file(format!("tree-{}.json", id), options)?;
            zip.write_all(&fs::read(self.record_path(id))?)?;
        }
        zip.finish()?;
        info!(path = %dest.display(), records = ids.len(), "backup written");
        Ok(dest)
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("tree-{}.json", id))
    }

    fn ids(&self) -> Result<Vec<u64>, StoreError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let p = entry?.path();
            if !p.is_file() {
                continue;
            }
            let id = p
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|n| n.strip_prefix("tree-"))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(id) = id {
                out.push(id);
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    fn read(&self, id: u64) -> Result<StoredTree, StoreError> {
        let data = fs::read(self.record_path(id))?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn write(&self, rec: &StoredTree) -> Result<(), StoreError> {
        let dest = self.record_path(rec.id);
        let tmp = dest.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(rec)?)?;
        fs::rename(&tmp, &dest)?;
        debug!(path = %dest.display(), "wrote record");
        Ok(())
    }
}

fn canonical(doc: &Document) -> Result<Document, StoreError> {
    let tree = export::import(doc)?;
    Ok(export::export(&tree))
}

fn record_name(doc: &Document) -> String {
    doc.name.trim().to_string()
}
