// shaders.rs - Shader stage compilation, program linking and uniforms

use crate::render::backend::{Gl, ShaderStageKind};
use glam::Vec4;
use std::collections::HashMap;
use std::ffi::{CString, NulError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const EMPTY_LOG: &str = "driver returned no diagnostic output";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation failed: {log}")]
    Compilation { stage: ShaderStageKind, log: String },
    #[error("Program linking failed: {0}")]
    Linking(String),
    #[error("Shader source {path:?} could not be read: {source}")]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Null byte error: {0}")]
    Nul(#[from] NulError),
    #[error("Uniform not found: {0}")]
    UniformNotFound(String),
}

/// A typed value for a named shader input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec4(Vec4),
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

/// One compiled shader object. The object is deleted when the guard drops,
/// which is always safe after linking: the program keeps its own copy.
pub struct ShaderStage {
    gl: Gl,
    id: u32,
    kind: ShaderStageKind,
}

impl ShaderStage {
    pub fn compile(gl: &Gl, kind: ShaderStageKind, source: &str) -> Result<Self, ShaderError> {
        let source = CString::new(source)?;
        let stage = ShaderStage {
            gl: gl.clone(),
            id: gl.create_shader(kind),
            kind,
        };
        gl.compile_shader(stage.id, &source);

        if !gl.shader_compiled(stage.id) {
            let log = non_empty(gl.shader_info_log(stage.id));
            log::error!("Failed to compile {} shader: {}", kind, log);
            return Err(ShaderError::Compilation { stage: kind, log });
        }

        Ok(stage)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> ShaderStageKind {
        self.kind
    }
}

impl Drop for ShaderStage {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// A successfully linked program. Holding one is proof the link succeeded.
pub struct ShaderProgram {
    gl: Gl,
    id: u32,
    uniforms: HashMap<String, Option<i32>>,
}

impl ShaderProgram {
    /// Reads both stage sources from disk, then compiles and links them.
    pub fn from_files<P: AsRef<Path>>(
        gl: &Gl,
        vertex_path: P,
        fragment_path: P,
    ) -> Result<Self, ShaderError> {
        let vertex_source = read_source(vertex_path.as_ref())?;
        let fragment_source = read_source(fragment_path.as_ref())?;
        Self::from_sources(gl, &vertex_source, &fragment_source)
    }

    pub fn from_sources(
        gl: &Gl,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = ShaderStage::compile(gl, ShaderStageKind::Vertex, vertex_source)?;
        let fragment = ShaderStage::compile(gl, ShaderStageKind::Fragment, fragment_source)?;
        Self::link(gl, &vertex, &fragment)
    }

    /// Links two compiled stages. The stages stay owned by the caller and are
    /// released when their guards drop, whatever the outcome here.
    pub fn link(
        gl: &Gl,
        vertex: &ShaderStage,
        fragment: &ShaderStage,
    ) -> Result<Self, ShaderError> {
        let program = gl.create_program();
        gl.attach_shader(program, vertex.id());
        gl.attach_shader(program, fragment.id());
        gl.link_program(program);

        if !gl.program_linked(program) {
            let log = non_empty(gl.program_info_log(program));
            gl.delete_program(program);
            log::error!("Failed to link shader program: {}", log);
            return Err(ShaderError::Linking(log));
        }

        log::debug!("Linked shader program {}", program);
        Ok(ShaderProgram {
            gl: gl.clone(),
            id: program,
            uniforms: HashMap::new(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn use_program(&self) {
        self.gl.use_program(self.id);
    }

    fn uniform_location(&mut self, name: &str) -> Result<i32, ShaderError> {
        let location = match self.uniforms.get(name) {
            Some(cached) => *cached,
            None => {
                let cname = CString::new(name)?;
                let location = self.gl.uniform_location(self.id, &cname);
                if location.is_none() {
                    log::warn!("Uniform '{}' not found in shader program {}", name, self.id);
                }
                self.uniforms.insert(name.to_string(), location);
                location
            }
        };
        location.ok_or_else(|| ShaderError::UniformNotFound(name.to_string()))
    }

    /// Activates the program and uploads `value` to the uniform `name`.
    pub fn set_uniform(
        &mut self,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), ShaderError> {
        self.use_program();
        let location = self.uniform_location(name)?;
        match value.into() {
            UniformValue::Bool(value) => self.gl.uniform_1i(location, value as i32),
            UniformValue::Int(value) => self.gl.uniform_1i(location, value),
            UniformValue::Float(value) => self.gl.uniform_1f(location, value),
            UniformValue::Vec4(value) => self.gl.uniform_4f(location, value.to_array()),
        }
        Ok(())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty(log: String) -> String {
    let trimmed = log.trim_end_matches(['\0', '\n', ' ']);
    if trimmed.is_empty() {
        EMPTY_LOG.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::recording::{Call, RecordingGl};
    use std::rc::Rc;
    use tempfile::tempdir;

    const VERTEX: &str =
        "#version 330 core\nlayout (location = 0) in vec3 aPos; void main(){gl_Position = vec4(aPos,1);}";
    const FRAGMENT: &str = "#version 330 core\nout vec4 FragColor;\nuniform vec4 ourColor;\nuniform int flag;\nuniform float mixValue;\nvoid main(){FragColor = vec4(1.0, 0.5, 0.2, 1.0);}";

    fn backend() -> (Rc<RecordingGl>, Gl) {
        let recording = RecordingGl::new();
        let gl: Gl = recording.clone();
        (recording, gl)
    }

    #[test]
    fn test_valid_pair_links_and_releases_stages() {
        let (recording, gl) = backend();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();

        assert_ne!(program.id(), 0);
        assert_eq!(recording.link_attempts(), 1);
        assert_eq!(recording.live_shaders(), 0);
        assert_eq!(recording.live_programs(), 1);
    }

    #[test]
    fn test_vertex_failure_skips_link() {
        let (recording, gl) = backend();
        let result = ShaderProgram::from_sources(&gl, "void main(){}", FRAGMENT);

        match result {
            Err(ShaderError::Compilation { stage, log }) => {
                assert_eq!(stage, ShaderStageKind::Vertex);
                assert!(!log.is_empty());
            }
            _ => panic!("expected a vertex compilation error"),
        }
        assert_eq!(recording.link_attempts(), 0);
        assert_eq!(recording.live_shaders(), 0);
        // The fragment stage is never compiled once the vertex stage fails
        assert_eq!(
            recording.calls(),
            vec![Call::CompileShader(ShaderStageKind::Vertex)]
        );
    }

    #[test]
    fn test_fragment_failure_releases_vertex_stage() {
        let (recording, gl) = backend();
        let result = ShaderProgram::from_sources(&gl, VERTEX, "#version 330 core\n");

        assert!(matches!(
            result,
            Err(ShaderError::Compilation { stage: ShaderStageKind::Fragment, ref log }) if !log.is_empty()
        ));
        assert_eq!(recording.link_attempts(), 0);
        assert_eq!(recording.live_shaders(), 0);
    }

    #[test]
    fn test_link_failure_reports_log_and_frees_everything() {
        let (recording, gl) = backend();
        recording.fail_links_with("error: vertex output 'vColor' not consumed\n");

        let err = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).err().unwrap();
        match err {
            ShaderError::Linking(log) => assert_eq!(log, "error: vertex output 'vColor' not consumed"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(recording.live_shaders(), 0);
        assert_eq!(recording.live_programs(), 0);
    }

    #[test]
    fn test_empty_driver_log_still_carries_diagnostic() {
        assert_eq!(non_empty(String::new()), EMPTY_LOG);
        assert_eq!(non_empty("\0".to_string()), EMPTY_LOG);
        assert_eq!(non_empty("bad token\n\0".to_string()), "bad token");
    }

    #[test]
    fn test_program_drop_deletes_program() {
        let (recording, gl) = backend();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        let id = program.id();
        drop(program);
        assert!(recording.is_deleted(id));
    }

    #[test]
    fn test_missing_file_is_resource_not_found() {
        let (recording, gl) = backend();
        let dir = tempdir().unwrap();
        let fragment = dir.path().join("frag.glsl");
        fs::write(&fragment, FRAGMENT).unwrap();

        let err = ShaderProgram::from_files(&gl, dir.path().join("missing.glsl"), fragment)
            .err()
            .unwrap();
        assert!(matches!(err, ShaderError::ResourceNotFound { .. }));
        assert!(recording.calls().is_empty());
    }

    #[test]
    fn test_from_files_links() {
        let (_recording, gl) = backend();
        let dir = tempdir().unwrap();
        let vertex = dir.path().join("vertex.glsl");
        let fragment = dir.path().join("fragment.glsl");
        fs::write(&vertex, VERTEX).unwrap();
        fs::write(&fragment, FRAGMENT).unwrap();

        assert!(ShaderProgram::from_files(&gl, vertex, fragment).is_ok());
    }

    #[test]
    fn test_uniform_values_upload_with_program_active() {
        let (recording, gl) = backend();
        let mut program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        recording.clear_calls();

        program.set_vec4("ourColor", Vec4::new(0.0, 0.5, 0.0, 1.0)).unwrap();
        program.set_bool("flag", true).unwrap();
        program.set_bool("flag", false).unwrap();

        let id = program.id();
        assert_eq!(
            recording.calls(),
            vec![
                Call::UseProgram(id),
                Call::Uniform4f(0, [0.0, 0.5, 0.0, 1.0]),
                Call::UseProgram(id),
                Call::Uniform1i(1, 1),
                Call::UseProgram(id),
                Call::Uniform1i(1, 0),
            ]
        );
    }

    #[test]
    fn test_float_and_int_uniforms_upload() {
        let (recording, gl) = backend();
        let mut program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        recording.clear_calls();

        program.set_float("mixValue", 0.25).unwrap();
        program.set_int("flag", 7).unwrap();
        program.set_uniform("mixValue", UniformValue::Float(0.75)).unwrap();

        let id = program.id();
        assert_eq!(
            recording.calls(),
            vec![
                Call::UseProgram(id),
                Call::Uniform1f(2, 0.25),
                Call::UseProgram(id),
                Call::Uniform1i(1, 7),
                Call::UseProgram(id),
                Call::Uniform1f(2, 0.75),
            ]
        );
    }

    #[test]
    fn test_unknown_uniform_is_reported() {
        let (recording, gl) = backend();
        let mut program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        recording.clear_calls();

        let err = program.set_float("ourColour", 1.0).err().unwrap();
        assert!(matches!(err, ShaderError::UniformNotFound(ref name) if name == "ourColour"));
        // Cached misses keep failing rather than going quiet
        assert!(program.set_float("ourColour", 1.0).is_err());
        assert!(!recording
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Uniform1f(..))));
    }

    #[test]
    fn test_scenario_literal_sources_link_cleanly() {
        let (recording, gl) = backend();
        let vertex = ShaderStage::compile(&gl, ShaderStageKind::Vertex, VERTEX).unwrap();
        let fragment = ShaderStage::compile(
            &gl,
            ShaderStageKind::Fragment,
            "#version 330 core\nout vec4 FragColor;\nvoid main(){FragColor = vec4(1.0);}",
        )
        .unwrap();

        assert!(gl.shader_info_log(vertex.id()).is_empty());
        assert!(gl.shader_info_log(fragment.id()).is_empty());

        let program = ShaderProgram::link(&gl, &vertex, &fragment).unwrap();
        assert!(gl.program_info_log(program.id()).is_empty());

        drop(vertex);
        drop(fragment);
        assert_eq!(recording.live_shaders(), 0);
        assert_eq!(recording.live_programs(), 1);
    }
}
