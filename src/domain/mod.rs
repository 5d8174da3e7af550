// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain data and the traits other layers implement
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A labelled image, the class names and the dataset splits
pub mod image;

// Core abstractions (traits) that other layers implement
pub mod traits;
