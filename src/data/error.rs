use std::path::PathBuf;

use thiserror::Error;

use crate::domain::image::NUM_CLASSES;

/// Failures while reading CIFAR-10 binary batch files.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset file '{}' not found", .0.display())]
    MissingFile(PathBuf),

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is {len} bytes, not a whole number of {record_len}-byte records", .path.display())]
    TruncatedFile {
        path:       PathBuf,
        len:        usize,
        record_len: usize,
    },

    #[error("record {index} in '{}' has label {label}, expected 0..{}", .path.display(), NUM_CLASSES)]
    InvalidLabel {
        path:  PathBuf,
        index: usize,
        label: u8,
    },
}
