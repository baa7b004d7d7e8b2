//! # Peltast
//!
//! **Dynamic vertex-channel mesh geometry with wgpu upload.**
//!
//! Describe a mesh as up to six independent attribute channels — positions,
//! normals, colors, UVs, tangents, bitangents — plus optional indices. Any
//! subset may be present; the interleaved buffer layout (stride and
//! per-attribute offsets) is computed at runtime from whichever channels
//! actually hold data, so the same code path serves a position-only
//! wireframe and a fully-attributed PBR mesh.
//!
//! ## Quick Start
//!
//! ```
//! use peltast::{DrawParams, Material, Mesh, MeshData, Vec3};
//! use peltast::device::mock::{MockDevice, MockEncoder};
//!
//! // Author geometry and derive what wasn't provided
//! let mut data = MeshData::cube();
//! data.subdivide(1).unwrap();
//! data.fill_color(Vec3::new(1.0, 0.5, 0.2));
//!
//! // Upload once, draw many
//! let device = MockDevice::new();
//! let mut mesh = Mesh::new(data);
//! mesh.upload(&device).unwrap();
//!
//! let mut encoder = MockEncoder::new();
//! mesh.draw(&mut encoder, &Material::new(), &DrawParams::new()).unwrap();
//! ```
//!
//! Swap `MockDevice` for [`GpuContext`] and the same mesh lands in wgpu
//! buffers, with [`MeshBuffers::buffer_layout`] describing exactly what was
//! uploaded.
//!
//! ## Philosophy
//!
//! - **Presence is data, not configuration** — a channel exists when it
//!   holds elements; layout follows from emptiness checks, never from flags
//!   you have to keep in sync.
//! - **Validate before the device sees it** — size mismatches, bad indices,
//!   and degenerate UVs are explicit errors, not corrupted buffers.
//! - **The device is a trait** — the whole lifecycle runs under `cargo
//!   test` against an in-memory mock.

mod channel;
pub mod device;
mod geometry;
mod gpu;
mod mesh;
mod texture;

pub use channel::{Channel, ChannelSet, VertexLayout};
pub use device::{
    DeviceError, DrawEncoder, DrawMode, PixelFormat, TextureDescriptor, TextureSlot, UploadDevice,
};
pub use geometry::{GeometryError, MAX_SUBDIVISIONS, MeshData};
pub use gpu::{GpuContext, GpuTexture, MeshBuffers, primitive_topology, vertex_attributes};
pub use mesh::{DrawParams, Mesh, Transform};
pub use texture::{Material, TextureError, TextureKind};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
