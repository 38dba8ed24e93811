// app.rs - Window, GL context and event loop around one scene

use crate::config::core::CONFIG_FILE;
use crate::config::{AppConfig, WindowConfig};
use crate::render::{Gl, NativeGl, RenderContext};
use crate::scene::SceneKind;
use anyhow::{anyhow, Context, Result};
use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::GetGlDisplay,
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::info;
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use std::{ffi::CString, num::NonZeroU32, ptr, rc::Rc};
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

/// A scene with a live window and current GL context. Field order matters:
/// the scene's GL objects are released before the context goes away.
struct Running {
    render: RenderContext,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

impl Running {
    fn start(event_loop: &EventLoop<()>, config: &AppConfig, scene: SceneKind) -> Result<Self> {
        let window_builder = window_builder(&config.window, scene);
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display_builder
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("Failed to create window: {e}"))?;
        let window = window.context("Display builder returned no window")?;

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let gl_display = gl_config.display();
        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .context("Failed to create OpenGL context")?
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .context("Failed to create GL surface")?
        };
        let gl_context = not_current
            .make_current(&gl_surface)
            .context("Failed to make context current")?;

        if config.window.vsync {
            if let Err(e) =
                gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                log::warn!("Could not enable vsync: {}", e);
            }
        }

        let gl: Gl = Rc::new(NativeGl::load(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
            Err(_) => ptr::null(),
        }));
        info!("OpenGL context ready for '{}'", scene.title());

        let mut render = RenderContext::new(gl, config, scene)?;
        let size = window.inner_size();
        render.resize(size.width, size.height);

        Ok(Self {
            render,
            gl_surface,
            gl_context,
            window,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.gl_surface.resize(&self.gl_context, w, h);
            self.render.resize(width, height);
        }
    }

    fn redraw(&mut self) -> Result<()> {
        self.render.render()?;
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("Failed to swap buffers")?;
        Ok(())
    }
}

fn window_builder(config: &WindowConfig, scene: SceneKind) -> WindowBuilder {
    let title = config.title.as_deref().unwrap_or(scene.title());
    WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
}

/// Prefers the configuration with the most samples.
///
/// glutin's picker has to return a `Config`, so there is no error path here.
/// `DisplayBuilder::build` only calls it with at least one candidate.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("the display offered no GL configurations")
}

/// Opens a window for `scene` and renders it until the window is closed.
pub fn run(scene: SceneKind) -> Result<()> {
    let config = AppConfig::load_or_default(CONFIG_FILE)?;
    SimpleLogger::new()
        .with_level(config.level_filter()?)
        .init()?;
    info!("Starting '{}'", scene.title());

    let event_loop = EventLoop::new()?;
    let mut running = Running::start(&event_loop, &config, scene)?;
    let mut failure: Option<anyhow::Error> = None;

    event_loop.run(|event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                info!("Window closed after {} frames", running.render.frame());
                elwt.exit();
            }
            WindowEvent::Resized(size) => running.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if let Err(e) = running.redraw() {
                    log::error!("Frame {} failed: {:#}", running.render.frame(), e);
                    failure = Some(e);
                    elwt.exit();
                }
            }
            _ => (),
        },
        Event::AboutToWait => running.window.request_redraw(),
        _ => (),
    })?;

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
