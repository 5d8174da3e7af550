// ============================================================
// Layer 3 — Image Domain Types
// ============================================================
// A single labelled CIFAR-10 image plus the two small enums
// the rest of the system talks in:
//
//   ImageSample — raw CHW pixel bytes + class label
//   CifarClass  — the ten named categories
//   Split       — which half of the dataset (train / test)
//
// Pixels stay as u8 here. Conversion to floats in [0, 1]
// happens in the batcher, right before tensors are built.
//
// Reference: CIFAR-10 binary format (Krizhevsky, 2009)
//            Rust Book §6 (Enums)

use serde::{Deserialize, Serialize};

/// Height and width of every CIFAR-10 image.
pub const IMAGE_SIDE: usize = 32;

/// Colour channels (R, G, B).
pub const IMAGE_CHANNELS: usize = 3;

/// Bytes of pixel data per image: 3 planes of 32×32.
pub const PIXELS_PER_IMAGE: usize = IMAGE_CHANNELS * IMAGE_SIDE * IMAGE_SIDE;

/// Number of label categories.
pub const NUM_CLASSES: usize = 10;

/// One labelled image.
///
/// `pixels` is laid out channel-major: 1024 red bytes, then
/// 1024 green, then 1024 blue, each plane row-major.
/// This is already the [C, H, W] order burn convolutions expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSample {
    pub pixels: Vec<u8>,
    pub label:  u8,
}

impl ImageSample {
    pub fn new(pixels: Vec<u8>, label: u8) -> Self {
        Self { pixels, label }
    }

    /// The label as a named class, if it is in range.
    pub fn class(&self) -> Option<CifarClass> {
        CifarClass::from_index(self.label as usize)
    }
}

/// The ten CIFAR-10 categories, in label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CifarClass {
    Airplane,
    Automobile,
    Bird,
    Cat,
    Deer,
    Dog,
    Frog,
    Horse,
    Ship,
    Truck,
}

impl CifarClass {
    pub const ALL: [CifarClass; NUM_CLASSES] = [
        CifarClass::Airplane,
        CifarClass::Automobile,
        CifarClass::Bird,
        CifarClass::Cat,
        CifarClass::Deer,
        CifarClass::Dog,
        CifarClass::Frog,
        CifarClass::Horse,
        CifarClass::Ship,
        CifarClass::Truck,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            CifarClass::Airplane   => "airplane",
            CifarClass::Automobile => "automobile",
            CifarClass::Bird       => "bird",
            CifarClass::Cat        => "cat",
            CifarClass::Deer       => "deer",
            CifarClass::Dog        => "dog",
            CifarClass::Frog       => "frog",
            CifarClass::Horse      => "horse",
            CifarClass::Ship       => "ship",
            CifarClass::Truck      => "truck",
        }
    }
}

/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// File names of the binary batches that make up this split.
    pub fn file_names(self) -> &'static [&'static str] {
        match self {
            Split::Train => &[
                "data_batch_1.bin",
                "data_batch_2.bin",
                "data_batch_3.bin",
                "data_batch_4.bin",
                "data_batch_5.bin",
            ],
            Split::Test => &["test_batch.bin"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test  => "test",
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_round_trip() {
        for (i, class) in CifarClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(CifarClass::from_index(i), Some(*class));
        }
        assert_eq!(CifarClass::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn test_sample_class_lookup() {
        let sample = ImageSample::new(vec![0; PIXELS_PER_IMAGE], 3);
        assert_eq!(sample.class(), Some(CifarClass::Cat));
        assert_eq!(sample.class().map(CifarClass::name), Some("cat"));
    }

    #[test]
    fn test_split_files() {
        assert_eq!(Split::Train.file_names().len(), 5);
        assert_eq!(Split::Test.file_names(), &["test_batch.bin"]);
    }
}
