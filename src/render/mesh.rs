use crate::render::backend::{BufferTarget, Gl};
use crate::render::layout::VertexLayout;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{len} floats do not split into records of {per_vertex}")]
    RaggedVertices { len: usize, per_vertex: usize },
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("{0} elements do not form whole triangles")]
    PartialTriangle(usize),
    #[error("Index list is empty")]
    EmptyIndices,
}

/// Static vertex data for one draw: interleaved records plus optional
/// triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<f32>,
    indices: Option<Vec<u32>>,
    layout: VertexLayout,
}

impl Geometry {
    pub fn new(
        vertices: Vec<f32>,
        indices: Option<Vec<u32>>,
        layout: VertexLayout,
    ) -> Result<Self, GeometryError> {
        let per_vertex = layout.floats_per_vertex();
        if vertices.is_empty() || vertices.len() % per_vertex != 0 {
            return Err(GeometryError::RaggedVertices {
                len: vertices.len(),
                per_vertex,
            });
        }

        let vertex_count = vertices.len() / per_vertex;
        let element_count = match &indices {
            Some(indices) if indices.is_empty() => return Err(GeometryError::EmptyIndices),
            Some(indices) => {
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(GeometryError::IndexOutOfRange { index, vertex_count });
                }
                indices.len()
            }
            None => vertex_count,
        };
        if element_count % 3 != 0 {
            return Err(GeometryError::PartialTriangle(element_count));
        }

        Ok(Self {
            vertices,
            indices,
            layout,
        })
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Vertices (or indices, when present) consumed by one draw.
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.vertex_count(), |indices| indices.len())
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }
}

/// GPU copy of a [`Geometry`]: vertex array, vertex buffer and optional
/// element buffer, released on drop.
pub struct Mesh {
    gl: Gl,
    geometry: Geometry,
    vao: u32,
    vbo: u32,
    ebo: Option<u32>,
}

impl Mesh {
    pub fn new(gl: &Gl, geometry: Geometry) -> Self {
        let mesh = Self {
            gl: gl.clone(),
            vao: gl.create_vertex_array(),
            vbo: gl.create_buffer(),
            ebo: geometry.indices().map(|_| gl.create_buffer()),
            geometry,
        };
        mesh.upload();
        mesh
    }

    /// Sends the vertex and index data to the GPU. Uploading again replaces
    /// the buffer contents with the same bytes.
    pub fn upload(&self) {
        self.gl.bind_vertex_array(self.vao);
        self.gl.bind_buffer(BufferTarget::Vertex, self.vbo);
        self.gl
            .buffer_data(BufferTarget::Vertex, self.geometry.vertex_bytes());

        if let (Some(ebo), Some(bytes)) = (self.ebo, self.geometry.index_bytes()) {
            self.gl.bind_buffer(BufferTarget::Index, ebo);
            self.gl.buffer_data(BufferTarget::Index, bytes);
        }
        self.configure_attributes();
    }

    /// Rebinds every buffer and attribute pointer. Binding state is global,
    /// so callers bind before each draw instead of trusting the last frame.
    pub fn bind(&self) {
        self.gl.bind_vertex_array(self.vao);
        self.gl.bind_buffer(BufferTarget::Vertex, self.vbo);
        if let Some(ebo) = self.ebo {
            self.gl.bind_buffer(BufferTarget::Index, ebo);
        }
        self.configure_attributes();
    }

    fn configure_attributes(&self) {
        let layout = self.geometry.layout();
        let stride = layout.stride() as i32;
        for attribute in layout.attributes() {
            self.gl.vertex_attrib_pointer(
                attribute.location,
                attribute.components as i32,
                stride,
                attribute.offset,
            );
            self.gl.enable_vertex_attrib_array(attribute.location);
        }
    }

    /// Issues the triangle draw for the bound mesh.
    pub fn draw(&self) {
        let count = self.geometry.element_count() as i32;
        match self.ebo {
            Some(_) => self.gl.draw_elements(count),
            None => self.gl.draw_arrays(0, count),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.geometry.element_count() / 3
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn vertex_buffer(&self) -> u32 {
        self.vbo
    }

    pub fn index_buffer(&self) -> Option<u32> {
        self.ebo
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        if let Some(ebo) = self.ebo {
            self.gl.delete_buffer(ebo);
        }
        self.gl.delete_buffer(self.vbo);
        self.gl.delete_vertex_array(self.vao);
    }
}
