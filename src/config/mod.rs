pub mod assets;
pub mod core;
pub mod rendering;
pub mod window;

pub use assets::AssetConfig;
pub use self::core::{AppConfig, ConfigError};
pub use rendering::RenderConfig;
pub use window::WindowConfig;
