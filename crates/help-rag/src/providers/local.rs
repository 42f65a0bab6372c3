//! Local vector store: exact cosine search persisted to a directory

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::types::Chunk;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Snapshot file written after every insert
const COLLECTION_FILE: &str = "collection.json";

/// Where the store keeps its snapshot
enum StorageDir {
    /// Removed when the store is dropped
    Temp(TempDir),
    /// Caller-provided directory, left in place
    Fixed(PathBuf),
}

impl StorageDir {
    fn path(&self) -> &Path {
        match self {
            StorageDir::Temp(dir) => dir.path(),
            StorageDir::Fixed(path) => path,
        }
    }
}

#[derive(Default, Deserialize)]
struct Collection {
    /// Fixed by the first inserted vector
    dimensions: Option<usize>,
    chunks: Vec<Chunk>,
}

/// Serialized form of a collection, borrowed so a snapshot can be written
/// before the in-memory collection changes
#[derive(Serialize)]
struct Snapshot<'a> {
    dimensions: Option<usize>,
    chunks: Vec<&'a Chunk>,
}

/// In-memory chunk collection with a JSON snapshot on disk
pub struct LocalVectorStore {
    dir: StorageDir,
    collection: RwLock<Collection>,
    /// Serializes inserts so snapshots are written in commit order
    writer: tokio::sync::Mutex<()>,
}

impl LocalVectorStore {
    /// Open a store in `dir`, or in a fresh temporary directory when `None`
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let dir = match dir {
            Some(path) => {
                fs::create_dir_all(path)?;
                StorageDir::Fixed(path.to_path_buf())
            }
            None => StorageDir::Temp(tempfile::Builder::new().prefix("help-rag-").tempdir()?),
        };

        let collection = Self::load_collection(&dir.path().join(COLLECTION_FILE));
        if !collection.chunks.is_empty() {
            tracing::info!(
                "Loaded {} chunks from {}",
                collection.chunks.len(),
                dir.path().display()
            );
        }

        Ok(Self {
            dir,
            collection: RwLock::new(collection),
            writer: tokio::sync::Mutex::new(()),
        })
    }

    /// Directory holding the snapshot
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Load a snapshot from disk
    fn load_collection(path: &Path) -> Collection {
        if !path.exists() {
            return Collection::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Collection>(&content) {
                Ok(collection) => collection,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    Collection::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                Collection::default()
            }
        }
    }

    /// Validate `chunks` against the collection and serialize the collection
    /// as it would look with them appended
    fn prepare_snapshot(&self, chunks: &[Chunk]) -> Result<(usize, String)> {
        let collection = self.collection.read();
        let dimensions = collection.dimensions.unwrap_or(chunks[0].embedding.len());

        for chunk in chunks {
            if chunk.embedding.is_empty() {
                return Err(Error::vector_db(format!("Chunk {} has no embedding", chunk.id)));
            }
            if chunk.embedding.len() != dimensions {
                return Err(Error::vector_db(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    dimensions,
                    chunk.embedding.len()
                )));
            }
        }

        let snapshot = Snapshot {
            dimensions: Some(dimensions),
            chunks: collection.chunks.iter().chain(chunks).collect(),
        };
        Ok((dimensions, serde_json::to_string(&snapshot)?))
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let _writer = self.writer.lock().await;
        let (dimensions, snapshot) = self.prepare_snapshot(chunks)?;

        let path = self.dir.path().join(COLLECTION_FILE);
        tokio::fs::write(&path, snapshot).await.map_err(|e| {
            Error::vector_db(format!("Failed to write {}: {}", path.display(), e))
        })?;

        // Only visible to searches once the snapshot is on disk
        let mut collection = self.collection.write();
        collection.dimensions = Some(dimensions);
        collection.chunks.extend_from_slice(chunks);

        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        let collection = self.collection.read();

        if let Some(dimensions) = collection.dimensions {
            if query_embedding.len() != dimensions {
                return Err(Error::vector_db(format!(
                    "Query dimension mismatch: expected {}, got {}",
                    dimensions,
                    query_embedding.len()
                )));
            }
        }

        let mut results: Vec<VectorSearchResult> = collection
            .chunks
            .iter()
            .map(|chunk| VectorSearchResult {
                chunk: chunk.clone(),
                similarity: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .collect();

        // Sort by similarity and take top_k
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.collection.read().chunks.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.dir.path().exists())
    }

    fn name(&self) -> &str {
        "local-cosine"
    }
}

/// Cosine similarity; zero vectors score 0.0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkSource, DataType};
    use uuid::Uuid;

    fn chunk(content: &str, embedding: Vec<f32>) -> Chunk {
        let source = ChunkSource {
            label: "test.pdf".to_string(),
            data_type: DataType::PdfFile,
        };
        let mut chunk = Chunk::new(Uuid::new_v4(), content.to_string(), source, 0);
        chunk.embedding = embedding;
        chunk
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = LocalVectorStore::open(None).unwrap();
        store
            .insert_chunks(&[
                chunk("east", vec![1.0, 0.0]),
                chunk("north", vec![0.0, 1.0]),
                chunk("north-east", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "north");
        assert_eq!(results[1].chunk.content, "north-east");
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = LocalVectorStore::open(None).unwrap();
        store.insert_chunks(&[chunk("a", vec![1.0, 0.0])]).await.unwrap();

        let err = store.insert_chunks(&[chunk("b", vec![1.0, 0.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
        assert!(store.search(&[1.0], 1).await.is_err());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_embedding_rejected() {
        let store = LocalVectorStore::open(None).unwrap();
        let err = store.insert_chunks(&[chunk("a", Vec::new())]).await.unwrap_err();
        assert!(err.to_string().contains("has no embedding"));
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = LocalVectorStore::open(None).unwrap();
        assert!(store.search(&[1.0, 2.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_reloads_from_fixed_dir() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalVectorStore::open(Some(dir.path())).unwrap();
            store.insert_chunks(&[chunk("kept", vec![0.5, 0.5])]).await.unwrap();
        }

        let reopened = LocalVectorStore::open(Some(dir.path())).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
        let results = reopened.search(&[0.5, 0.5], 1).await.unwrap();
        assert_eq!(results[0].chunk.content, "kept");
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_leaves_store_unchanged() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("store");
        let store = LocalVectorStore::open(Some(&dir)).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        let err = store.insert_chunks(&[chunk("lost", vec![1.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
        assert_eq!(store.len().await.unwrap(), 0);
        assert!(store.search(&[1.0, 0.0, 0.0], 1).await.unwrap().is_empty());

        // A retry after the directory is back inserts the chunk exactly once
        fs::create_dir_all(&dir).unwrap();
        store.insert_chunks(&[chunk("kept", vec![1.0, 0.0])]).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(LocalVectorStore::open(Some(&dir)).unwrap().len().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_all_reach_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(LocalVectorStore::open(Some(dir.path())).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_chunks(&[chunk(&format!("chunk {}", i), vec![i as f32, 1.0])])
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 8);
        let reopened = LocalVectorStore::open(Some(dir.path())).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 8);
    }

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let store = LocalVectorStore::open(None).unwrap();
        let path = store.path().to_path_buf();
        assert!(path.exists());
        drop(store);
        assert!(!path.exists());
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
