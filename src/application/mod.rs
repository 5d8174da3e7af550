// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// train the autoencoder, train the classifier, or evaluate
// saved checkpoints.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No argument parsing or printing (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Shared hyperparameters and tracker setup
pub mod config;

// Autoencoder training workflow
pub mod train_autoencoder;

// Classifier-on-encoder training workflow
pub mod train_classifier;

// Checkpoint evaluation workflow
pub mod evaluate;
