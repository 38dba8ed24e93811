//! The tutorial scenes. Each one is a shader pair, static geometry and an
//! optional per-frame uniform callback fed to the shared frame renderer.

pub mod sources;

use crate::config::AssetConfig;
use crate::render::backend::Gl;
use crate::render::layout::VertexLayout;
use crate::render::mesh::{Geometry, Mesh};
use crate::render::renderer::{pulse, DrawBatch};
use crate::render::shaders::ShaderProgram;
use crate::render::texture::Texture;
use crate::utils::Result;
use glam::Vec4;

pub const TEXTURE_VERTEX_SHADER: &str = "texture.vert";
pub const TEXTURE_FRAGMENT_SHADER: &str = "texture.frag";
pub const CONTAINER_IMAGE: &str = "container.png";

#[rustfmt::skip]
const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

#[rustfmt::skip]
const HOUSE_WALLS: [f32; 12] = [
     0.5,  0.0, 0.0,
     0.5, -1.0, 0.0,
    -0.5, -1.0, 0.0,
    -0.5,  0.0, 0.0,
];

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

#[rustfmt::skip]
const HOUSE_ROOF: [f32; 9] = [
    -0.75, 0.0, 0.0,
     0.0,  1.0, 0.0,
     0.75, 0.0, 0.0,
];

#[rustfmt::skip]
const TEXTURED_QUAD: [f32; 32] = [
    // positions        // colors        // texture coords
     0.5,  0.5, 0.0,    1.0, 0.0, 0.0,   1.0, 1.0,
     0.5, -0.5, 0.0,    0.0, 1.0, 0.0,   1.0, 0.0,
    -0.5, -0.5, 0.0,    0.0, 0.0, 1.0,   0.0, 0.0,
    -0.5,  0.5, 0.0,    1.0, 1.0, 0.0,   0.0, 1.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    HelloTriangle,
    House,
    PulsingTriangle,
    TexturedQuad,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [
        SceneKind::HelloTriangle,
        SceneKind::House,
        SceneKind::PulsingTriangle,
        SceneKind::TexturedQuad,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SceneKind::HelloTriangle => "Hello Triangle",
            SceneKind::House => "Hello House",
            SceneKind::PulsingTriangle => "Shader Uniforms",
            SceneKind::TexturedQuad => "Textures window",
        }
    }

    /// Compiles the scene's programs and uploads its geometry. Fails before
    /// anything is drawn if a shader, image or link step fails.
    pub fn build(self, gl: &Gl, assets: &AssetConfig) -> Result<Vec<DrawBatch>> {
        let batches = match self {
            SceneKind::HelloTriangle => vec![hello_triangle(gl)?],
            SceneKind::House => house(gl)?,
            SceneKind::PulsingTriangle => vec![pulsing_triangle(gl)?],
            SceneKind::TexturedQuad => vec![textured_quad(gl, assets)?],
        };
        log::info!("Built scene '{}' with {} batches", self.title(), batches.len());
        Ok(batches)
    }
}

fn hello_triangle(gl: &Gl) -> Result<DrawBatch> {
    let program = ShaderProgram::from_sources(gl, sources::POSITION_VERTEX, sources::ORANGE_FRAGMENT)?;
    let geometry = Geometry::new(TRIANGLE.to_vec(), None, VertexLayout::position())?;
    Ok(DrawBatch::new("triangle", program, Mesh::new(gl, geometry)))
}

fn house(gl: &Gl) -> Result<Vec<DrawBatch>> {
    let orange =
        || ShaderProgram::from_sources(gl, sources::POSITION_VERTEX, sources::ORANGE_FRAGMENT);
    let walls = Geometry::new(
        HOUSE_WALLS.to_vec(),
        Some(QUAD_INDICES.to_vec()),
        VertexLayout::position(),
    )?;
    let roof = Geometry::new(HOUSE_ROOF.to_vec(), None, VertexLayout::position())?;

    Ok(vec![
        DrawBatch::new("walls", orange()?, Mesh::new(gl, walls)),
        DrawBatch::new("roof", orange()?, Mesh::new(gl, roof)),
    ])
}

fn pulsing_triangle(gl: &Gl) -> Result<DrawBatch> {
    let program =
        ShaderProgram::from_sources(gl, sources::POSITION_VERTEX, sources::UNIFORM_COLOR_FRAGMENT)?;
    let geometry = Geometry::new(TRIANGLE.to_vec(), None, VertexLayout::position())?;
    Ok(
        DrawBatch::new("pulsing triangle", program, Mesh::new(gl, geometry)).with_uniforms(
            |program, time| program.set_vec4("ourColor", Vec4::new(0.0, pulse(time.elapsed), 0.0, 1.0)),
        ),
    )
}

fn textured_quad(gl: &Gl, assets: &AssetConfig) -> Result<DrawBatch> {
    let program = ShaderProgram::from_files(
        gl,
        assets.shader(TEXTURE_VERTEX_SHADER),
        assets.shader(TEXTURE_FRAGMENT_SHADER),
    )?;
    let texture = Texture::from_file(gl, assets.image(CONTAINER_IMAGE))?;
    let geometry = Geometry::new(
        TEXTURED_QUAD.to_vec(),
        Some(QUAD_INDICES.to_vec()),
        VertexLayout::position_color_tex_coord(),
    )?;

    Ok(DrawBatch::new("textured quad", program, Mesh::new(gl, geometry))
        .with_texture(0, texture)
        .with_uniforms(|program, _| program.set_int("texture1", 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::recording::{Call, RecordingGl};
    use crate::render::backend::ShaderStageKind;
    use crate::render::renderer::{FrameRenderer, FrameTime};
    use crate::utils::EngineError;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn write_assets(root: &Path) -> AssetConfig {
        let assets = AssetConfig {
            shader_dir: root.join("shaders"),
            image_dir: root.join("images"),
        };
        fs::create_dir_all(&assets.shader_dir).unwrap();
        fs::create_dir_all(&assets.image_dir).unwrap();
        fs::write(
            assets.shader(TEXTURE_VERTEX_SHADER),
            include_str!("../../assets/shaders/texture.vert"),
        )
        .unwrap();
        fs::write(
            assets.shader(TEXTURE_FRAGMENT_SHADER),
            include_str!("../../assets/shaders/texture.frag"),
        )
        .unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 120, 60, 255]))
            .save(assets.image(CONTAINER_IMAGE))
            .unwrap();
        assets
    }

    #[test]
    fn test_every_scene_builds_and_renders() {
        let dir = tempdir().unwrap();
        let assets = write_assets(dir.path());

        for scene in SceneKind::ALL {
            let recording = RecordingGl::new();
            let gl: Gl = recording.clone();
            let mut renderer = FrameRenderer::new(&gl, [0.2, 0.3, 0.3, 1.0]);
            for batch in scene.build(&gl, &assets).unwrap() {
                renderer.push(batch);
            }

            let stats = renderer
                .render_frame(FrameTime::new(Duration::from_secs(1), 0))
                .unwrap();
            assert_eq!(stats.draw_calls, renderer.batches().len(), "{scene:?}");
            assert!(stats.triangles > 0, "{scene:?}");
        }
    }

    #[test]
    fn test_house_draws_walls_indexed_and_roof_as_arrays() {
        let recording = RecordingGl::new();
        let gl: Gl = recording.clone();
        let mut renderer = FrameRenderer::new(&gl, [0.0; 4]);
        for batch in SceneKind::House.build(&gl, &AssetConfig::default()).unwrap() {
            renderer.push(batch);
        }
        recording.clear_calls();

        let stats = renderer.render_frame(FrameTime::new(Duration::ZERO, 0)).unwrap();
        let draws: Vec<_> = recording
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::DrawArrays(_) | Call::DrawElements(_)))
            .collect();
        assert_eq!(draws, vec![Call::DrawElements(6), Call::DrawArrays(3)]);
        assert_eq!(stats.triangles, 3);
    }

    #[test]
    fn test_house_walls_and_roof_share_the_orange_fragment() {
        let recording = RecordingGl::new();
        let gl: Gl = recording.clone();
        let batches = SceneKind::House.build(&gl, &AssetConfig::default()).unwrap();
        assert_eq!(batches.len(), 2);

        let fragments = recording.shader_sources(ShaderStageKind::Fragment);
        assert_eq!(fragments, vec![sources::ORANGE_FRAGMENT; 2]);
    }

    #[test]
    fn test_textured_quad_binds_texture_unit_zero() {
        let dir = tempdir().unwrap();
        let assets = write_assets(dir.path());
        let recording = RecordingGl::new();
        let gl: Gl = recording.clone();
        let mut renderer = FrameRenderer::new(&gl, [0.0; 4]);
        for batch in SceneKind::TexturedQuad.build(&gl, &assets).unwrap() {
            renderer.push(batch);
        }
        recording.clear_calls();

        renderer.render_frame(FrameTime::new(Duration::ZERO, 0)).unwrap();
        let calls = recording.calls();
        assert!(calls.contains(&Call::ActiveTexture(0)));
        assert!(calls.contains(&Call::Uniform1i(0, 0)));
        assert!(calls.contains(&Call::AttribPointer { location: 2, components: 2, stride: 32, offset: 24 }));
        assert!(calls.contains(&Call::DrawElements(6)));
    }

    #[test]
    fn test_missing_shader_stops_before_drawing() {
        let dir = tempdir().unwrap();
        let assets = AssetConfig {
            shader_dir: dir.path().join("nowhere"),
            image_dir: dir.path().join("nowhere"),
        };
        let recording = RecordingGl::new();
        let gl: Gl = recording.clone();

        let err = SceneKind::TexturedQuad.build(&gl, &assets).err().unwrap();
        assert!(err.is_missing_resource());
        assert!(matches!(err, EngineError::Shader(_)));
        assert!(!recording
            .calls()
            .iter()
            .any(|call| matches!(call, Call::DrawArrays(_) | Call::DrawElements(_))));
    }
}
