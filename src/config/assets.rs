use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub shader_dir: PathBuf,
    pub image_dir: PathBuf,
}

impl AssetConfig {
    pub fn shader(&self, name: &str) -> PathBuf {
        self.shader_dir.join(name)
    }

    pub fn image(&self, name: &str) -> PathBuf {
        self.image_dir.join(name)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("assets/shaders"),
            image_dir: PathBuf::from("assets/images"),
        }
    }
}
