//! Checkpoint persistence for the Q-network
//!
//! A checkpoint is a single Burn named MessagePack record holding the network
//! weights together with their shape and training metadata. The file is written
//! to a temporary file in the destination directory and renamed into place, so
//! a concurrent reader sees either the previous or the new checkpoint, never a
//! partial one.

use anyhow::{Context, Result, anyhow};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Record, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::network::{QNetwork, QNetworkConfig, QNetworkRecord};

type CheckpointRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

/// Checkpoint failures callers branch on
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no checkpoint found at {0:?}")]
    NotFound(PathBuf),

    #[error("checkpoint at {path:?} holds network {found:?}, expected {expected:?}")]
    ShapeMismatch {
        path: PathBuf,
        found: QNetworkConfig,
        expected: QNetworkConfig,
    },
}

/// Metadata saved with the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Network shape needed to rebuild the module before loading weights
    pub network: QNetworkConfig,

    /// Gradient updates applied before the save
    pub updates: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl CheckpointMetadata {
    pub fn new(network: QNetworkConfig, updates: usize) -> Self {
        Self {
            network,
            updates,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// On-disk layout of a checkpoint
#[derive(Record)]
struct CheckpointRecord<B: Backend> {
    network: QNetworkRecord<B>,
    input_size: usize,
    hidden_size: usize,
    num_actions: usize,
    updates: usize,
    version: String,
}

impl<B: Backend> CheckpointRecord<B> {
    fn new(network: QNetworkRecord<B>, metadata: &CheckpointMetadata) -> Self {
        Self {
            network,
            input_size: metadata.network.input_size,
            hidden_size: metadata.network.hidden_size,
            num_actions: metadata.network.num_actions,
            updates: metadata.updates,
            version: metadata.version.clone(),
        }
    }

    fn metadata(&self) -> CheckpointMetadata {
        CheckpointMetadata {
            network: QNetworkConfig {
                input_size: self.input_size,
                hidden_size: self.hidden_size,
                num_actions: self.num_actions,
            },
            updates: self.updates,
            version: self.version.clone(),
        }
    }
}

/// File name prefix of every checkpoint
pub const CHECKPOINT_PREFIX: &str = "dqn_";

/// Extension of the weights file
pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// `<models_dir>/dqn_<run_name>.mpk`
pub fn checkpoint_path(models_dir: &Path, run_name: &str) -> PathBuf {
    models_dir.join(format!(
        "{CHECKPOINT_PREFIX}{run_name}.{CHECKPOINT_EXTENSION}"
    ))
}

/// Run name encoded in a checkpoint file name
///
/// Strips the `dqn_` prefix and `.mpk` suffix when present, so
/// `models/dqn_v1.mpk` yields `v1`.
pub fn run_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(&format!(".{CHECKPOINT_EXTENSION}"))
        .unwrap_or(&file_name);
    stem.strip_prefix(CHECKPOINT_PREFIX)
        .unwrap_or(stem)
        .to_string()
}

/// Save network weights and metadata as one file
///
/// Creates parent directories if they don't exist.
pub fn save_checkpoint<B: Backend>(
    network: &QNetwork<B>,
    metadata: &CheckpointMetadata,
    path: &Path,
) -> Result<()> {
    let record = CheckpointRecord::new(network.clone().into_record(), metadata);
    write_record(record, path)
}

fn write_record<B: Backend>(record: CheckpointRecord<B>, path: &Path) -> Result<()> {
    let recorder = CheckpointRecorder::new();
    let bytes = <CheckpointRecorder as Recorder<B>>::record(&recorder, record, ())
        .map_err(|err| anyhow!("Failed to serialize checkpoint: {err:?}"))?;
    write_atomic(path, &bytes)
}

fn read_record<B: Backend>(path: &Path, device: &B::Device) -> Result<CheckpointRecord<B>> {
    if !path.exists() {
        return Err(CheckpointError::NotFound(path.to_path_buf()).into());
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read checkpoint {:?}", path))?;
    let recorder = CheckpointRecorder::new();
    <CheckpointRecorder as Recorder<B>>::load(&recorder, bytes, device)
        .map_err(|err| anyhow!("Failed to decode checkpoint {:?}: {err:?}", path))
}

/// Read only the metadata of a checkpoint
pub fn load_metadata<B: Backend>(path: &Path, device: &B::Device) -> Result<CheckpointMetadata> {
    Ok(read_record::<B>(path, device)?.metadata())
}

/// Load a network and its metadata
///
/// Fails with [`CheckpointError::NotFound`] when the file is missing, and with
/// [`CheckpointError::ShapeMismatch`] when the stored weights do not have the
/// shape the metadata records.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, CheckpointMetadata)> {
    let record = read_record::<B>(path, device)?;
    let metadata = record.metadata();

    let network = metadata.network.init::<B>(device).load_record(record.network);
    let found = network.shape();
    if found != metadata.network {
        return Err(CheckpointError::ShapeMismatch {
            path: path.to_path_buf(),
            found,
            expected: metadata.network,
        }
        .into());
    }

    Ok((network, metadata))
}

/// Write `bytes` to `path` through a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write {:?}", path))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync {:?}", path))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move temp file onto {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::{Tensor, TensorData};
    use tempfile::TempDir;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_metadata_creation() {
        let metadata = CheckpointMetadata::new(QNetworkConfig::new(64), 12);

        assert_eq!(metadata.network.hidden_size, 64);
        assert_eq!(metadata.updates, 12);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_checkpoint_naming() {
        let path = checkpoint_path(Path::new("models"), "v1_production");
        assert_eq!(path, PathBuf::from("models/dqn_v1_production.mpk"));
        assert_eq!(run_name_from_path(&path), "v1_production");

        assert_eq!(run_name_from_path(Path::new("/tmp/custom.mpk")), "custom");
        assert_eq!(run_name_from_path(Path::new("dqn_plain")), "plain");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dqn_test.mpk");
        let device = NdArrayDevice::default();

        let network = QNetworkConfig::new(16).init::<TestBackend>(&device);
        save_checkpoint(&network, &CheckpointMetadata::new(QNetworkConfig::new(16), 3), &path)
            .unwrap();

        assert!(path.exists());
        // Weights and metadata share one file
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
        assert_eq!(
            load_metadata::<TestBackend>(&path, &device).unwrap(),
            CheckpointMetadata::new(QNetworkConfig::new(16), 3)
        );

        let (loaded, metadata) = load_checkpoint::<TestBackend>(&path, &device).unwrap();
        assert_eq!(metadata.updates, 3);

        let probe = Tensor::<TestBackend, 2>::ones([2, 11], &device);
        let expected: TensorData = network.forward(probe.clone()).into_data();
        let actual: TensorData = loaded.forward(probe).into_data();
        assert_eq!(
            expected.as_slice::<f32>().unwrap(),
            actual.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_missing_checkpoint_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.mpk");
        let device = NdArrayDevice::default();

        let err = load_checkpoint::<TestBackend>(&path, &device).unwrap_err();

        match err.downcast_ref::<CheckpointError>() {
            Some(CheckpointError::NotFound(missing)) => assert_eq!(missing, &path),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_weights_disagreeing_with_metadata_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dqn_torn.mpk");
        let device = NdArrayDevice::default();

        let network = QNetworkConfig::new(8).init::<TestBackend>(&device);
        let metadata = CheckpointMetadata::new(QNetworkConfig::new(16), 0);
        write_record(CheckpointRecord::new(network.into_record(), &metadata), &path).unwrap();

        let err = load_checkpoint::<TestBackend>(&path, &device).unwrap_err();

        match err.downcast_ref::<CheckpointError>() {
            Some(CheckpointError::ShapeMismatch {
                found, expected, ..
            }) => {
                assert_eq!(found.hidden_size, 8);
                assert_eq!(expected.hidden_size, 16);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dqn_garbage.mpk");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        assert!(load_checkpoint::<TestBackend>(&path, &NdArrayDevice::default()).is_err());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // Only the destination remains; no temp files left behind
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
