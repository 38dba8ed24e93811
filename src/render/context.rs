use crate::config::AppConfig;
use crate::render::backend::Gl;
use crate::render::renderer::{FrameRenderer, FrameStats, FrameTime, RenderError};
use crate::scene::SceneKind;
use crate::utils::Result;
use std::time::{Duration, Instant};

/// Everything a running scene owns: the backend handle, the viewport and the
/// frame renderer with its batches. Dropping it releases every GL object the
/// scene created.
pub struct RenderContext {
    gl: Gl,
    viewport: (u32, u32),
    renderer: FrameRenderer,
    started: Instant,
    frame: u64,
}

impl RenderContext {
    pub fn new(gl: Gl, config: &AppConfig, scene: SceneKind) -> Result<Self> {
        let viewport = (config.window.width, config.window.height);
        gl.viewport(viewport.0, viewport.1);
        if config.render.depth_test {
            gl.enable_depth_test();
        }

        let mut renderer = FrameRenderer::new(&gl, config.render.clear_color);
        for batch in scene.build(&gl, &config.assets)? {
            renderer.push(batch);
        }

        Ok(Self {
            gl,
            viewport,
            renderer,
            started: Instant::now(),
            frame: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.gl.viewport(width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Renders one frame timed from context creation.
    pub fn render(&mut self) -> std::result::Result<FrameStats, RenderError> {
        self.render_at(self.started.elapsed())
    }

    pub fn render_at(&mut self, elapsed: Duration) -> std::result::Result<FrameStats, RenderError> {
        let stats = self.renderer.render_frame(FrameTime::new(elapsed, self.frame))?;
        self.frame += 1;
        Ok(stats)
    }
}
