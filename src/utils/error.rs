use crate::config::ConfigError;
use crate::render::mesh::GeometryError;
use crate::render::renderer::RenderError;
use crate::render::shaders::ShaderError;
use crate::render::texture::TextureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Window error: {0}")]
    Window(String),
}

impl EngineError {
    /// Missing startup assets end the program instead of being retried.
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            EngineError::Shader(ShaderError::ResourceNotFound { .. })
                | EngineError::Texture(TextureError::ResourceNotFound { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
