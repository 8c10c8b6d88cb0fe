pub mod camera;
pub mod gpu;
pub mod scene;

pub use camera::{ProjectionMode, SceneCamera};
pub use gpu::GpuState;
pub use scene::{RenderState, RotationAxis};
