pub mod backend;
pub mod context;
pub mod layout;
pub mod mesh;
pub mod renderer;
pub mod shaders;
pub mod texture;

pub use backend::{Gl, GlBackend, NativeGl};
pub use context::RenderContext;
pub use renderer::{DrawBatch, FrameRenderer};
pub use shaders::ShaderProgram;
