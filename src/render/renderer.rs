// renderer.rs - Per-frame clear, bind, draw sequence shared by every scene

use crate::render::backend::Gl;
use crate::render::mesh::Mesh;
use crate::render::shaders::{ShaderError, ShaderProgram};
use crate::render::texture::Texture;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Batch '{batch}' failed to set uniforms: {source}")]
    Uniforms {
        batch: String,
        #[source]
        source: ShaderError,
    },
}

/// Timing handed to per-frame uniform callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub elapsed: Duration,
    pub frame: u64,
}

impl FrameTime {
    pub fn new(elapsed: Duration, frame: u64) -> Self {
        Self { elapsed, frame }
    }
}

/// `sin(t)` mapped from [-1, 1] into [0, 1].
pub fn pulse(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32().sin() / 2.0 + 0.5
}

pub type UniformCallback = Box<dyn FnMut(&mut ShaderProgram, FrameTime) -> Result<(), ShaderError>>;

/// One program + mesh pairing drawn every frame.
pub struct DrawBatch {
    name: String,
    program: ShaderProgram,
    mesh: Mesh,
    textures: Vec<(u32, Texture)>,
    uniforms: Option<UniformCallback>,
}

impl DrawBatch {
    pub fn new(name: impl Into<String>, program: ShaderProgram, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            program,
            mesh,
            textures: Vec::new(),
            uniforms: None,
        }
    }

    /// Binds `texture` to `unit` before each draw of this batch.
    pub fn with_texture(mut self, unit: u32, texture: Texture) -> Self {
        self.textures.push((unit, texture));
        self
    }

    pub fn with_uniforms<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut ShaderProgram, FrameTime) -> Result<(), ShaderError> + 'static,
    {
        self.uniforms = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program_mut(&mut self) -> &mut ShaderProgram {
        &mut self.program
    }

    fn draw(&mut self, time: FrameTime) -> Result<usize, RenderError> {
        self.mesh.bind();
        for (unit, texture) in &self.textures {
            texture.bind(*unit);
        }
        self.program.use_program();
        if let Some(callback) = self.uniforms.as_mut() {
            callback(&mut self.program, time).map_err(|source| RenderError::Uniforms {
                batch: self.name.clone(),
                source,
            })?;
        }
        self.mesh.draw();
        Ok(self.mesh.triangle_count())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles: usize,
}

pub struct FrameRenderer {
    gl: Gl,
    clear_color: [f32; 4],
    batches: Vec<DrawBatch>,
}

impl FrameRenderer {
    pub fn new(gl: &Gl, clear_color: [f32; 4]) -> Self {
        Self {
            gl: gl.clone(),
            clear_color,
            batches: Vec::new(),
        }
    }

    pub fn push(&mut self, batch: DrawBatch) {
        self.batches.push(batch);
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Clears the framebuffer and draws every batch in insertion order. The
    /// first uniform failure aborts the frame.
    pub fn render_frame(&mut self, time: FrameTime) -> Result<FrameStats, RenderError> {
        self.gl.clear_color(self.clear_color);
        self.gl.clear();

        let mut stats = FrameStats::default();
        for batch in &mut self.batches {
            stats.triangles += batch.draw(time)?;
            stats.draw_calls += 1;
        }

        log::trace!(
            "Frame {}: {} draw calls, {} triangles",
            time.frame,
            stats.draw_calls,
            stats.triangles
        );
        Ok(stats)
    }
}
