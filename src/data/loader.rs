// ============================================================
// Layer 4 — CIFAR-10 Loader
// ============================================================
// Reads the "binary version" of CIFAR-10 from a directory.
//
// File layout (cifar-10-batches-bin/):
//   data_batch_1.bin … data_batch_5.bin   ← train split
//   test_batch.bin                        ← test split
//
// Every file is a flat sequence of 3073-byte records:
//
//   [label: 1 byte][red: 1024][green: 1024][blue: 1024]
//
// Each colour plane is a 32×32 image stored row by row, so the
// 3072 pixel bytes are already in [C, H, W] order and can be
// copied straight into an ImageSample.
//
// Reference: https://www.cs.toronto.edu/~kriz/cifar.html
//            Rust Book §9 (Error Handling)

use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::error::DatasetError;
use crate::domain::image::{ImageSample, Split, NUM_CLASSES, PIXELS_PER_IMAGE};
use crate::domain::traits::ImageSource;

/// Bytes per record: one label byte followed by the pixel planes.
pub const RECORD_LEN: usize = 1 + PIXELS_PER_IMAGE;

/// Loads CIFAR-10 splits from a directory of binary batch files.
/// Implements the ImageSource trait from Layer 3.
pub struct Cifar10Loader {
    dir: PathBuf,
}

impl Cifar10Loader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageSource for Cifar10Loader {
    fn load_split(&self, split: Split) -> Result<Vec<ImageSample>> {
        let mut samples = Vec::new();

        for name in split.file_names() {
            let path = self.dir.join(name);
            let before = samples.len();
            read_batch_file(&path, &mut samples)?;
            tracing::debug!(
                "Read {} images from '{}'",
                samples.len() - before,
                path.display()
            );
        }

        tracing::info!("Loaded {} {} images", samples.len(), split.name());
        Ok(samples)
    }
}

/// Read one binary batch file and append its records to `out`.
fn read_batch_file(path: &Path, out: &mut Vec<ImageSample>) -> Result<(), DatasetError> {
    if !path.exists() {
        return Err(DatasetError::MissingFile(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode_records(&bytes, path, out)
}

/// Split raw bytes into records. Fails on a partial trailing record
/// or an out-of-range label; nothing is appended in either case.
fn decode_records(
    bytes: &[u8],
    path:  &Path,
    out:   &mut Vec<ImageSample>,
) -> Result<(), DatasetError> {
    if bytes.len() % RECORD_LEN != 0 {
        return Err(DatasetError::TruncatedFile {
            path:       path.to_path_buf(),
            len:        bytes.len(),
            record_len: RECORD_LEN,
        });
    }

    let mut decoded = Vec::with_capacity(bytes.len() / RECORD_LEN);
    for (index, record) in bytes.chunks_exact(RECORD_LEN).enumerate() {
        let label = record[0];
        if label as usize >= NUM_CLASSES {
            return Err(DatasetError::InvalidLabel {
                path: path.to_path_buf(),
                index,
                label,
            });
        }
        decoded.push(ImageSample::new(record[1..].to_vec(), label));
    }

    out.extend(decoded);
    Ok(())
}

/// Serialise samples back into the binary record layout.
/// Used by tests to build small fixture directories.
#[cfg(test)]
pub fn encode_records(samples: &[ImageSample]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * RECORD_LEN);
    for s in samples {
        bytes.push(s.label);
        bytes.extend_from_slice(&s.pixels);
    }
    bytes
}

/// Write a complete fixture dataset: `per_file` images in every train
/// batch file and `test` images in the test file.
#[cfg(test)]
pub fn write_fixture(dir: &Path, per_file: usize, test: usize) -> std::io::Result<()> {
    let make = |n: usize, offset: usize| -> Vec<ImageSample> {
        (0..n)
            .map(|i| {
                let v = ((i + offset) * 37 % 256) as u8;
                ImageSample::new(vec![v; PIXELS_PER_IMAGE], ((i + offset) % NUM_CLASSES) as u8)
            })
            .collect()
    };

    for (k, name) in Split::Train.file_names().iter().enumerate() {
        fs::write(dir.join(name), encode_records(&make(per_file, k * per_file)))?;
    }
    fs::write(dir.join("test_batch.bin"), encode_records(&make(test, 1000)))?;
    Ok(())
}
