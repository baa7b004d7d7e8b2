//! Headless wgpu context and the wgpu upload backend.
//!
//! [`GpuContext`] owns a wgpu device and queue acquired without a window —
//! surface creation and presentation belong to the application, not to
//! geometry upload. It implements [`UploadDevice`], turning interleaved
//! float buffers into vertex/index buffers and raw pixels into textures.
//!
//! The draw side is a renderer concern: a pipeline that consumes these
//! buffers gets its vertex state from [`MeshBuffers::buffer_layout`], which
//! reproduces at runtime exactly the stride and attribute offsets the mesh
//! was interleaved with.
//!
//! # Example
//!
//! ```no_run
//! use peltast::{GpuContext, Mesh, MeshData};
//!
//! let gpu = GpuContext::new();
//! let mut mesh = Mesh::new(MeshData::cube());
//! mesh.upload(&gpu).unwrap();
//!
//! let buffers = mesh.buffers().unwrap();
//! let layout = buffers.buffer_layout(); // for render pipeline creation
//! ```

use std::borrow::Cow;

use crate::channel::VertexLayout;
use crate::device::{DeviceError, DrawMode, PixelFormat, TextureDescriptor, UploadDevice};

/// wgpu device and queue, acquired headless.
///
/// All fields are public for direct wgpu access when needed.
pub struct GpuContext {
    /// The logical GPU device for creating resources.
    pub device: wgpu::Device,
    /// The command queue for submitting work.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Creates a headless GPU context.
    ///
    /// # Panics
    ///
    /// Panics if no suitable GPU adapter is found or device creation fails.
    pub fn new() -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");
        log::info!("using GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Peltast Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        Self { device, queue }
    }
}

impl Default for GpuContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertex and index buffers for one uploaded mesh.
#[derive(Debug)]
pub struct MeshBuffers {
    /// The interleaved vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// The index buffer; present iff the mesh was indexed at upload.
    pub index_buffer: Option<wgpu::Buffer>,
    attributes: Vec<wgpu::VertexAttribute>,
    stride_bytes: u64,
}

impl MeshBuffers {
    /// The vertex buffer layout matching the uploaded data, for pipeline
    /// creation.
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride_bytes,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Builds the wgpu attribute list for a runtime vertex layout.
///
/// Offsets are byte offsets within one vertex; shader locations are the
/// fixed per-channel locations, so absent channels leave gaps rather than
/// renumbering.
pub fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .slots()
        .iter()
        .map(|&(channel, offset)| wgpu::VertexAttribute {
            offset: (offset * size_of::<f32>()) as wgpu::BufferAddress,
            shader_location: channel.location(),
            format: match channel.width() {
                2 => wgpu::VertexFormat::Float32x2,
                _ => wgpu::VertexFormat::Float32x3,
            },
        })
        .collect()
}

/// Maps a draw mode to the wgpu primitive topology.
pub fn primitive_topology(mode: DrawMode) -> wgpu::PrimitiveTopology {
    match mode {
        DrawMode::Points => wgpu::PrimitiveTopology::PointList,
        DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        DrawMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
        DrawMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

/// A GPU texture with its view and sampler, ready for bind groups.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl UploadDevice for GpuContext {
    type Buffers = MeshBuffers;
    type Texture = GpuTexture;

    fn upload_mesh(
        &self,
        vertex_data: &[f32],
        layout: &VertexLayout,
        indices: &[u32],
    ) -> Result<MeshBuffers, DeviceError> {
        use wgpu::util::DeviceExt;

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertex_data),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = (!indices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Index Buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        Ok(MeshBuffers {
            vertex_buffer,
            index_buffer,
            attributes: vertex_attributes(layout),
            stride_bytes: layout.stride_bytes() as u64,
        })
    }

    fn release_mesh(&self, buffers: MeshBuffers) {
        buffers.vertex_buffer.destroy();
        if let Some(index_buffer) = buffers.index_buffer {
            index_buffer.destroy();
        }
    }

    fn create_texture(
        &self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<GpuTexture, DeviceError> {
        use wgpu::util::DeviceExt;

        let expected = (desc.width * desc.height * desc.format.bytes_per_pixel()) as usize;
        if pixels.len() != expected {
            return Err(DeviceError::Texture(format!(
                "'{}': got {} bytes, expected {}",
                desc.label,
                pixels.len(),
                expected
            )));
        }

        // wgpu has no 3-channel format; widen RGB to RGBA on the way in
        let (format, data): (wgpu::TextureFormat, Cow<'_, [u8]>) = match desc.format {
            PixelFormat::R8 => (wgpu::TextureFormat::R8Unorm, Cow::Borrowed(pixels)),
            PixelFormat::Rgba8 => (wgpu::TextureFormat::Rgba8UnormSrgb, Cow::Borrowed(pixels)),
            PixelFormat::Rgb8 => {
                let mut rgba = Vec::with_capacity(pixels.len() / 3 * 4);
                for rgb in pixels.chunks_exact(3) {
                    rgba.extend_from_slice(rgb);
                    rgba.push(u8::MAX);
                }
                (wgpu::TextureFormat::Rgba8UnormSrgb, Cow::Owned(rgba))
            }
        };

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(&desc.label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", desc.label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(GpuTexture {
            texture,
            view,
            sampler,
            width: desc.width,
            height: desc.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Channel, ChannelSet};

    #[test]
    fn attributes_carry_byte_offsets_and_fixed_locations() {
        let layout = VertexLayout::new(
            ChannelSet::EMPTY
                .with(Channel::Position)
                .with(Channel::Uv)
                .with(Channel::Tangent),
        );
        let attributes = vertex_attributes(&layout);

        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[0].shader_location, 0);
        assert_eq!(attributes[0].format, wgpu::VertexFormat::Float32x3);

        // uv sits right after position, still at location 3
        assert_eq!(attributes[1].offset, 12);
        assert_eq!(attributes[1].shader_location, 3);
        assert_eq!(attributes[1].format, wgpu::VertexFormat::Float32x2);

        assert_eq!(attributes[2].offset, 20);
        assert_eq!(attributes[2].shader_location, 4);
        assert_eq!(attributes[2].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn topology_mapping_is_total() {
        assert_eq!(
            primitive_topology(DrawMode::Triangles),
            wgpu::PrimitiveTopology::TriangleList
        );
        assert_eq!(
            primitive_topology(DrawMode::Points),
            wgpu::PrimitiveTopology::PointList
        );
        assert_eq!(
            primitive_topology(DrawMode::LineStrip),
            wgpu::PrimitiveTopology::LineStrip
        );
    }
}
