// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and training code lives here.
//
//   autoencoder.rs — Convolutional autoencoder
//                    Encoder: 3 stride-2 convs, 32×32 → 4×4×256
//                    Decoder: 3 transposed convs back to 32×32×3
//
//   classifier.rs  — Classification head over encoder features
//
//   trainer.rs     — The two epoch loops
//                    forward → loss → backward → Adam step,
//                    then per-epoch checkpoint + tracking
//
//   evaluator.rs   — Test-split evaluation for both models
//
// Training runs on TrainBackend (Autodiff<Wgpu>); evaluation
// and the frozen encoder run on the inner Wgpu backend.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Kingma & Ba (2015) Adam

use burn::backend::wgpu::WgpuDevice;

/// Autoencoder and encoder modules
pub mod autoencoder;

/// Classifier head
pub mod classifier;

/// Epoch loops for both models
pub mod trainer;

/// Test-split evaluation
pub mod evaluator;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type InferBackend = burn::backend::Wgpu;

/// Best available wgpu adapter (discrete GPU, integrated GPU, then CPU).
pub fn default_device() -> WgpuDevice {
    let device = WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    device
}
