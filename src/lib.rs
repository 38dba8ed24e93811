pub mod app;
pub mod config;
pub mod render;
pub mod scene;
pub mod utils;

// Re-export commonly used types
pub use config::{AppConfig, AssetConfig, RenderConfig, WindowConfig};
pub use render::backend::{Gl, GlBackend, NativeGl};
pub use render::context::RenderContext;
pub use render::layout::VertexLayout;
pub use render::mesh::{Geometry, Mesh};
pub use render::renderer::{pulse, DrawBatch, FrameRenderer, FrameTime};
pub use render::shaders::{ShaderError, ShaderProgram, UniformValue};
pub use render::texture::{PixelRows, Texture};
pub use scene::SceneKind;
pub use utils::error::EngineError;
