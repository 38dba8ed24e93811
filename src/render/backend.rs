// backend.rs - The narrow slice of OpenGL the renderer talks to

use gl::types::*;
use std::ffi::{c_void, CStr};
use std::fmt;
use std::ptr;
use std::rc::Rc;

/// Shared handle to the graphics backend. `Rc` keeps every GL object on the
/// thread that owns the context.
pub type Gl = Rc<dyn GlBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl ShaderStageKind {
    fn to_gl(self) -> GLenum {
        match self {
            ShaderStageKind::Vertex => gl::VERTEX_SHADER,
            ShaderStageKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

impl BufferTarget {
    fn to_gl(self) -> GLenum {
        match self {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
            BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Everything the tutorial scenes need from the driver. Object names are the
/// raw GL names; zero is never a valid object.
pub trait GlBackend {
    // Shader stages and programs
    fn create_shader(&self, stage: ShaderStageKind) -> u32;
    fn compile_shader(&self, shader: u32, source: &CStr);
    fn shader_compiled(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_linked(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);

    /// `None` when the name is not an active uniform of `program`.
    fn uniform_location(&self, program: u32, name: &CStr) -> Option<i32>;
    fn uniform_1i(&self, location: i32, value: i32);
    fn uniform_1f(&self, location: i32, value: f32);
    fn uniform_4f(&self, location: i32, value: [f32; 4]);

    // Geometry
    fn create_vertex_array(&self) -> u32;
    fn bind_vertex_array(&self, vao: u32);
    fn delete_vertex_array(&self, vao: u32);
    fn create_buffer(&self) -> u32;
    fn bind_buffer(&self, target: BufferTarget, buffer: u32);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: u32);
    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: usize);
    fn enable_vertex_attrib_array(&self, location: u32);

    // Textures
    fn create_texture(&self) -> u32;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: u32);
    /// Linear filtering and clamp-to-edge wrapping on the bound 2D texture.
    fn set_texture_parameters(&self);
    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]);
    fn generate_mipmap(&self);
    fn delete_texture(&self, texture: u32);

    // Frame
    fn enable_depth_test(&self);
    fn viewport(&self, width: u32, height: u32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self);
    fn draw_arrays(&self, first: i32, count: i32);
    fn draw_elements(&self, count: i32);
}

/// Backend over the global function pointers of the `gl` crate.
pub struct NativeGl {
    _loaded: (),
}

impl NativeGl {
    /// Loads every GL entry point through `loader`. The context the loader
    /// belongs to must be current on this thread.
    pub fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        Self { _loaded: () }
    }

    fn info_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
        if len <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; len as usize];
        let mut written = 0;
        fetch(len, &mut written, buffer.as_mut_ptr() as *mut GLchar);
        buffer.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl GlBackend for NativeGl {
    fn create_shader(&self, stage: ShaderStageKind) -> u32 {
        unsafe { gl::CreateShader(stage.to_gl()) }
    }

    fn compile_shader(&self, shader: u32, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
            gl::CompileShader(shader);
        }
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        }
        Self::info_log(len, |len, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, len, written, buf)
        })
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: u32) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_linked(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        }
        Self::info_log(len, |len, written, buf| unsafe {
            gl::GetProgramInfoLog(program, len, written, buf)
        })
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn uniform_location(&self, program: u32, name: &CStr) -> Option<i32> {
        let location = unsafe { gl::GetUniformLocation(program, name.as_ptr()) };
        (location >= 0).then_some(location)
    }

    fn uniform_1i(&self, location: i32, value: i32) {
        unsafe { gl::Uniform1i(location, value) }
    }

    fn uniform_1f(&self, location: i32, value: f32) {
        unsafe { gl::Uniform1f(location, value) }
    }

    fn uniform_4f(&self, location: i32, value: [f32; 4]) {
        unsafe { gl::Uniform4f(location, value[0], value[1], value[2], value[3]) }
    }

    fn create_vertex_array(&self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vao: u32) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: u32) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn create_buffer(&self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(target.to_gl(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                target.to_gl(),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { gl::EnableVertexAttribArray(location) }
    }

    fn create_texture(&self) -> u32 {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        texture
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, texture: u32) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, texture) }
    }

    fn set_texture_parameters(&self) {
        unsafe {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        }
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as i32,
                width as i32,
                height as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
        }
    }

    fn generate_mipmap(&self) {
        unsafe { gl::GenerateMipmap(gl::TEXTURE_2D) }
    }

    fn delete_texture(&self, texture: u32) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn enable_depth_test(&self) {
        unsafe { gl::Enable(gl::DEPTH_TEST) }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as i32, height as i32) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT) }
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count) }
    }

    fn draw_elements(&self, count: i32) {
        unsafe { gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, ptr::null()) }
    }
}
