use crate::render::backend::Gl;
use image::ImageReader;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Image {path:?} could not be opened: {source}")]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Unsupported pixel layout: {width} px wide rows with stride {stride} over {len} bytes")]
    UnsupportedFormat {
        width: u32,
        stride: usize,
        len: usize,
    },
}

/// Decoded RGBA8 pixels whose rows may carry trailing padding.
#[derive(Debug, Clone)]
pub struct PixelRows<'a> {
    width: u32,
    height: u32,
    stride: usize,
    data: Cow<'a, [u8]>,
}

impl<'a> PixelRows<'a> {
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Result<Self, TextureError> {
        let data = data.into();
        let unsupported = |len| TextureError::UnsupportedFormat { width, stride, len };
        let row_bytes = (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| unsupported(data.len()))?;
        let needed = match height as usize {
            0 => Some(0),
            rows => stride
                .checked_mul(rows - 1)
                .and_then(|n| n.checked_add(row_bytes)),
        };
        match needed {
            Some(needed) if stride >= row_bytes && data.len() >= needed => {}
            _ => return Err(unsupported(data.len())),
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Rows already packed at `width * 4` bytes.
    pub fn packed(width: u32, height: u32, data: impl Into<Cow<'a, [u8]>>) -> Result<Self, TextureError> {
        Self::new(width, height, width as usize * BYTES_PER_PIXEL, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn needs_repack(&self) -> bool {
        self.stride != self.row_bytes()
    }

    /// The pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.stride + x as usize * BYTES_PER_PIXEL;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[start..start + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Pixel data with rows packed back to back, borrowed when no padding
    /// has to be dropped.
    pub fn tightly_packed(&self) -> Cow<'_, [u8]> {
        let row_bytes = self.row_bytes();
        let total = row_bytes * self.height as usize;
        if !self.needs_repack() {
            return Cow::Borrowed(&self.data[..total]);
        }

        log::debug!(
            "Repacking {}x{} image from stride {} to {}",
            self.width,
            self.height,
            self.stride,
            row_bytes
        );
        let mut packed = Vec::with_capacity(total);
        for row in 0..self.height as usize {
            let start = row * self.stride;
            packed.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Cow::Owned(packed)
    }
}

/// 2D RGBA texture with linear filtering and clamp-to-edge wrapping.
pub struct Texture {
    gl: Gl,
    id: u32,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn from_file<P: AsRef<Path>>(gl: &Gl, path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = ImageReader::open(path)
            .map_err(|source| TextureError::ResourceNotFound {
                path: path.to_path_buf(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| TextureError::ResourceNotFound {
                path: path.to_path_buf(),
                source,
            })?
            .decode()?
            .to_rgba8();

        let (width, height) = img.dimensions();
        let pixels = PixelRows::packed(width, height, img.into_raw())?;
        log::info!("Loaded texture {:?} ({}x{})", path, width, height);
        Ok(Self::from_pixels(gl, &pixels))
    }

    pub fn from_pixels(gl: &Gl, pixels: &PixelRows<'_>) -> Self {
        let id = gl.create_texture();
        gl.active_texture(0);
        gl.bind_texture(id);
        gl.set_texture_parameters();
        gl.tex_image_rgba(pixels.width(), pixels.height(), &pixels.tightly_packed());
        gl.generate_mipmap();
        gl.bind_texture(0);

        Self {
            gl: gl.clone(),
            id,
            width: pixels.width(),
            height: pixels.height(),
        }
    }

    pub fn bind(&self, unit: u32) {
        self.gl.active_texture(unit);
        self.gl.bind_texture(self.id);
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gl.delete_texture(self.id);
    }
}
