// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the binary files on disk and the tensor
// batches the training loops consume:
//
//   cifar-10-batches-bin/*.bin
//       │
//       ▼
//   Cifar10Loader     → decodes 3073-byte records into ImageSamples
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into [N, 3, 32, 32] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Typed errors for malformed or missing dataset files
pub mod error;

/// Reads CIFAR-10 binary batch files
pub mod loader;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
