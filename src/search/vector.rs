use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{CollectionStats, RetrievedResult, StoredRecord};

/// Storage and nearest-neighbour search over embedded chunks.
pub trait VectorIndex: Send + Sync {
    /// Store `records` and persist them with a single write. Either all of
    /// them are stored or none are. Records are never mutated after insertion.
    fn add_batch(&self, records: Vec<StoredRecord>) -> Result<()>;

    fn add(&self, record: StoredRecord) -> Result<()> {
        self.add_batch(vec![record])
    }

    /// Up to `top_k` records ordered by ascending distance to `embedding`.
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedResult>>;

    fn count(&self) -> Result<usize>;

    /// Drop the collection and recreate it empty.
    fn reset(&self) -> Result<()>;

    fn collection_name(&self) -> &str;

    fn path(&self) -> &Path;

    fn stats(&self) -> Result<CollectionStats> {
        Ok(CollectionStats {
            total_documents: self.count()?,
            collection_name: self.collection_name().to_string(),
            path: self.path().display().to_string(),
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    /// Fixed by the first insert; `None` while empty
    dimension: Option<usize>,
    records: Vec<StoredRecord>,
}

/// In-memory collection with disk persistence and cosine-distance search.
pub struct LocalVectorStore {
    collection: RwLock<Collection>,
    name: String,
    dir: PathBuf,
    persist_path: PathBuf,
}

impl LocalVectorStore {
    /// Open `name` under `dir`, creating both if missing. A collection file that
    /// cannot be parsed is an error rather than an empty collection.
    pub fn open_or_create(dir: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        let persist_path = dir.join(format!("{name}.json"));

        let collection = if persist_path.exists() {
            let data = std::fs::read_to_string(&persist_path)
                .context("Failed to read vector collection")?;
            serde_json::from_str(&data).with_context(|| {
                format!("Failed to parse vector collection {}", persist_path.display())
            })?
        } else {
            Collection::default()
        };

        let store = Self {
            collection: RwLock::new(collection),
            name: name.to_string(),
            dir: dir.to_path_buf(),
            persist_path,
        };
        store.persist(&store.collection.read())?;
        Ok(store)
    }

    /// Atomic write via temp file + rename.
    fn persist(&self, collection: &Collection) -> Result<()> {
        let data = serde_json::to_string(collection)?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data).context("Failed to write vector collection")?;
        std::fs::rename(&tmp_path, &self.persist_path)
            .context("Failed to replace vector collection")?;
        Ok(())
    }
}

impl VectorIndex for LocalVectorStore {
    fn add_batch(&self, records: Vec<StoredRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut collection = self.collection.write();

        let previous_dimension = collection.dimension;
        let dimension = previous_dimension.unwrap_or(records[0].vector.len());
        for (i, record) in records.iter().enumerate() {
            if record.vector.len() != dimension {
                anyhow::bail!(
                    "Embedding dimension {} does not match collection dimension {dimension}",
                    record.vector.len()
                );
            }
            let duplicate = collection.records.iter().any(|r| r.id == record.id)
                || records[..i].iter().any(|r| r.id == record.id);
            if duplicate {
                anyhow::bail!("Record id {} already exists", record.id);
            }
        }

        let previous_len = collection.records.len();
        collection.dimension = Some(dimension);
        collection.records.extend(records);

        if let Err(e) = self.persist(&collection) {
            // Keep memory in step with what is on disk
            collection.records.truncate(previous_len);
            collection.dimension = previous_dimension;
            return Err(e);
        }
        Ok(())
    }

    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedResult>> {
        let collection = self.collection.read();

        if let Some(dim) = collection.dimension {
            if dim != embedding.len() {
                anyhow::bail!(
                    "Query embedding dimension {} does not match collection dimension {dim}",
                    embedding.len()
                );
            }
        }

        let mut scored: Vec<(f32, &StoredRecord)> = collection
            .records
            .iter()
            .map(|r| (cosine_distance(embedding, &r.vector), r))
            .collect();

        // Sort ascending by distance
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(distance, r)| {
                RetrievedResult::new(r.id.clone(), r.text.clone(), r.metadata.clone(), distance)
            })
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.collection.read().records.len())
    }

    fn reset(&self) -> Result<()> {
        let mut collection = self.collection.write();
        if self.persist_path.exists() {
            std::fs::remove_file(&self.persist_path)
                .context("Failed to delete vector collection")?;
        }
        *collection = Collection::default();
        self.persist(&collection)
    }

    fn collection_name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.dir
    }
}

/// `1 - cosine_similarity`, clamped to be non-negative.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
