//! Best-agent persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Backup rotation (tmp -> save, old save -> backup)
//! - Corruption detection and recovery from the backup

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evolve::Genome;

/// Envelope format written by this build
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt save {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("save {path} has format version {found}, expected {FORMAT_VERSION}")]
    Version { path: PathBuf, found: u32 },
    #[error("no saved agent at {0}")]
    Missing(PathBuf),
}

/// The saved champion and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    /// Generation the champion was saved in
    pub saved_generation: u32,
    /// Score of the episode it was saved from
    pub score: u32,
    pub genome: Genome,
}

/// File-backed store for the best agent
#[derive(Debug, Clone)]
pub struct BestAgentStore {
    path: PathBuf,
}

impl BestAgentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("bak")
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Whether a save (or its backup) is present
    pub fn exists(&self) -> bool {
        self.path.exists() || self.backup_path().exists()
    }

    /// Write `genome` as the new best agent, keeping the previous one as backup
    pub fn save(&self, genome: &Genome, generation: u32, score: u32) -> Result<(), PersistenceError> {
        let saved = SavedAgent {
            version: FORMAT_VERSION,
            saved_generation: generation,
            score,
            genome: genome.clone(),
        };
        let json = serde_json::to_string_pretty(&saved).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|source| io_error(&tmp, source))?;
        if self.path.exists() {
            let backup = self.backup_path();
            fs::rename(&self.path, &backup).map_err(|source| io_error(&backup, source))?;
        }
        fs::rename(&tmp, &self.path).map_err(|source| io_error(&self.path, source))?;

        log::info!(
            "Saved best agent (genome {}, fitness {:.2}, score {}) to {}",
            genome.id,
            genome.fitness,
            score,
            self.path.display()
        );
        Ok(())
    }

    /// Load the best agent, falling back to the backup if the main save is unusable
    pub fn load(&self) -> Result<SavedAgent, PersistenceError> {
        match read_envelope(&self.path) {
            Ok(saved) => Ok(saved),
            Err(err) => {
                let backup = self.backup_path();
                if !backup.exists() {
                    return Err(err);
                }
                log::warn!("{err}; trying backup {}", backup.display());
                read_envelope(&backup)
            }
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_envelope(path: &Path) -> Result<SavedAgent, PersistenceError> {
    if !path.exists() {
        return Err(PersistenceError::Missing(path.to_path_buf()));
    }
    let json = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let saved: SavedAgent = serde_json::from_str(&json).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if saved.version != FORMAT_VERSION {
        return Err(PersistenceError::Version {
            path: path.to_path_buf(),
            found: saved.version,
        });
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::Network;
    use crate::evolve::network::NUM_INPUTS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn genome(id: u64) -> Genome {
        let mut rng = Pcg32::seed_from_u64(id);
        let mut genome = Genome::new(id, Network::random(&mut rng, NUM_INPUTS, 2, 1.0));
        genome.fitness = 42.5;
        genome
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = BestAgentStore::new(dir.path().join("best.json"));
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(PersistenceError::Missing(_))));

        store.save(&genome(1), 3, 26).unwrap();
        assert!(store.exists());
        let saved = store.load().unwrap();
        assert_eq!(saved.version, FORMAT_VERSION);
        assert_eq!((saved.saved_generation, saved.score), (3, 26));
        assert_eq!(saved.genome, genome(1));
    }

    #[test]
    fn test_second_save_rotates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = BestAgentStore::new(dir.path().join("best.json"));
        store.save(&genome(1), 0, 26).unwrap();
        store.save(&genome(2), 1, 27).unwrap();
        assert!(store.backup_path().exists());
        assert_eq!(store.load().unwrap().genome.id, 2);
    }

    #[test]
    fn test_corrupt_save_recovers_from_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = BestAgentStore::new(dir.path().join("best.json"));
        store.save(&genome(1), 0, 26).unwrap();
        store.save(&genome(2), 1, 27).unwrap();
        fs::write(store.path(), "{ truncated").unwrap();
        assert_eq!(store.load().unwrap().genome.id, 1);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = BestAgentStore::new(dir.path().join("best.json"));
        store.save(&genome(1), 0, 26).unwrap();
        let json = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), json.replace("\"version\": 1", "\"version\": 99")).unwrap();
        assert!(matches!(
            store.load(),
            Err(PersistenceError::Version { found: 99, .. })
        ));
    }
}
