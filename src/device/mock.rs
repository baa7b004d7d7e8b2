//! In-memory device implementations for tests.
//!
//! [`MockDevice`] keeps uploaded data around so tests can assert on exactly
//! what reached the "GPU"; [`MockEncoder`] records draw commands in order.
//! Neither needs hardware, so the whole mesh lifecycle runs under plain
//! `cargo test`.

use std::cell::{Cell, RefCell};

use glam::{Mat4, Vec2};

use super::{
    DeviceError, DrawEncoder, DrawMode, PixelFormat, TextureDescriptor, TextureSlot, UploadDevice,
};
use crate::channel::{Channel, VertexLayout};

/// A device that stores uploads in memory and tracks releases.
#[derive(Debug, Default)]
pub struct MockDevice {
    next_id: Cell<u64>,
    live_meshes: Cell<usize>,
    released: RefCell<Vec<u64>>,
    /// When set, the next upload fails, for exercising error propagation.
    pub fail_allocation: Cell<bool>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploaded meshes not yet released.
    pub fn live_meshes(&self) -> usize {
        self.live_meshes.get()
    }

    /// Ids of released meshes, in release order.
    pub fn released(&self) -> Vec<u64> {
        self.released.borrow().clone()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

/// Uploaded mesh data, retained verbatim.
#[derive(Clone, Debug)]
pub struct MockBuffers {
    pub id: u64,
    pub vertex_data: Vec<f32>,
    pub stride: usize,
    pub attributes: Vec<(Channel, usize)>,
    pub indices: Vec<u32>,
}

/// Created texture data, retained verbatim.
#[derive(Clone, Debug)]
pub struct MockTexture {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl UploadDevice for MockDevice {
    type Buffers = MockBuffers;
    type Texture = MockTexture;

    fn upload_mesh(
        &self,
        vertex_data: &[f32],
        layout: &VertexLayout,
        indices: &[u32],
    ) -> Result<MockBuffers, DeviceError> {
        if self.fail_allocation.get() {
            return Err(DeviceError::Allocation("mock allocation failure".into()));
        }
        self.live_meshes.set(self.live_meshes.get() + 1);
        Ok(MockBuffers {
            id: self.next_id(),
            vertex_data: vertex_data.to_vec(),
            stride: layout.stride(),
            attributes: layout.slots().to_vec(),
            indices: indices.to_vec(),
        })
    }

    fn release_mesh(&self, buffers: MockBuffers) {
        self.live_meshes.set(self.live_meshes.get() - 1);
        self.released.borrow_mut().push(buffers.id);
    }

    fn create_texture(
        &self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<MockTexture, DeviceError> {
        let expected = (desc.width * desc.height * desc.format.bytes_per_pixel()) as usize;
        if pixels.len() != expected {
            return Err(DeviceError::Texture(format!(
                "'{}': got {} bytes, expected {}",
                desc.label,
                pixels.len(),
                expected
            )));
        }
        Ok(MockTexture {
            id: self.next_id(),
            width: desc.width,
            height: desc.height,
            format: desc.format,
            pixels: pixels.to_vec(),
        })
    }
}

/// One recorded encoder call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    BindTexture { slot: TextureSlot, texture: u64 },
    SetMat4 { name: String, value: Mat4 },
    SetVec2 { name: String, value: Vec2 },
    DrawIndexed { mode: DrawMode, count: u32 },
    DrawArrays { mode: DrawMode, count: u32 },
}

/// An encoder that records commands instead of drawing.
#[derive(Debug, Default)]
pub struct MockEncoder {
    pub commands: Vec<DrawCommand>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawEncoder for MockEncoder {
    type Texture = MockTexture;

    fn bind_texture(&mut self, slot: TextureSlot, texture: &MockTexture) {
        self.commands.push(DrawCommand::BindTexture {
            slot,
            texture: texture.id,
        });
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.commands.push(DrawCommand::SetMat4 {
            name: name.to_string(),
            value,
        });
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.commands.push(DrawCommand::SetVec2 {
            name: name.to_string(),
            value,
        });
    }

    fn draw_indexed(&mut self, mode: DrawMode, count: u32) {
        self.commands.push(DrawCommand::DrawIndexed { mode, count });
    }

    fn draw_arrays(&mut self, mode: DrawMode, count: u32) {
        self.commands.push(DrawCommand::DrawArrays { mode, count });
    }
}
