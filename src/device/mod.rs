//! Device boundary: the traits the geometry core talks to.
//!
//! The core never calls a graphics API directly. Uploading goes through
//! [`UploadDevice`], drawing through [`DrawEncoder`] — narrow traits shaped
//! after the handful of calls the mesh lifecycle actually needs. This keeps
//! the geometry logic testable without hardware and leaves renderers free
//! to implement the draw side on whatever pass structure they own.
//!
//! Implementations:
//! - [`GpuContext`](crate::GpuContext) implements [`UploadDevice`] on wgpu.
//! - [`mock`] provides in-memory implementations of both traits that store
//!   uploads and record draw commands for test assertions.

pub mod mock;

use glam::{Mat4, Vec2};
use std::fmt;

use crate::channel::VertexLayout;

/// Error type for device operations.
///
/// Device failures are opaque to the geometry core; it forwards them to the
/// caller as [`GeometryError::Device`](crate::GeometryError::Device).
#[derive(Debug)]
pub enum DeviceError {
    /// Buffer allocation or upload failed.
    Allocation(String),
    /// Texture creation failed.
    Texture(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Allocation(msg) => write!(f, "buffer allocation failed: {msg}"),
            DeviceError::Texture(msg) => write!(f, "texture creation failed: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Primitive topology for draw calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

/// Texture bind slots, one per material role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse = 0,
    Specular = 1,
    Normal = 2,
    Displacement = 3,
    AmbientOcclusion = 4,
}

impl TextureSlot {
    /// The numeric bind slot.
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Pixel format of raw texture data, chosen from the decoded image's
/// channel count: one channel, three, or four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Parameters for device texture creation.
#[derive(Clone, Debug)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Debug label, usually the source path.
    pub label: String,
}

/// Uploads mesh buffers and creates textures on a graphics device.
///
/// Associated types keep handles backend-specific: wgpu buffers for
/// [`GpuContext`](crate::GpuContext), plain ids for the mock. Handles are
/// exclusively owned by the mesh that uploaded them and come back to the
/// device by value in [`release_mesh`](Self::release_mesh), so a double
/// free is unrepresentable.
pub trait UploadDevice {
    /// Handles for one mesh's uploaded buffers.
    type Buffers: fmt::Debug;
    /// Device texture handle.
    type Texture: fmt::Debug;

    /// Allocates device buffers and uploads the interleaved vertex data
    /// described by `layout`, plus the index list when non-empty.
    fn upload_mesh(
        &self,
        vertex_data: &[f32],
        layout: &VertexLayout,
        indices: &[u32],
    ) -> Result<Self::Buffers, DeviceError>;

    /// Frees buffers returned by [`upload_mesh`](Self::upload_mesh).
    fn release_mesh(&self, buffers: Self::Buffers);

    /// Creates a texture from raw pixel bytes in the descriptor's format.
    fn create_texture(
        &self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<Self::Texture, DeviceError>;
}

/// Receives the device calls for one draw.
///
/// [`Mesh::draw`](crate::Mesh::draw) emits through this trait: texture
/// binds first, then the `model` matrix and `uv_scale` uniforms, then
/// exactly one draw call.
pub trait DrawEncoder {
    /// Device texture handle bound by [`bind_texture`](Self::bind_texture).
    type Texture;

    fn bind_texture(&mut self, slot: TextureSlot, texture: &Self::Texture);
    fn set_mat4(&mut self, name: &str, value: Mat4);
    fn set_vec2(&mut self, name: &str, value: Vec2);
    fn draw_indexed(&mut self, mode: DrawMode, count: u32);
    fn draw_arrays(&mut self, mode: DrawMode, count: u32);
}
