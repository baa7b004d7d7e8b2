//! Mesh lifecycle: cached transforms, upload, and draw.
//!
//! A [`Mesh`] owns its [`MeshData`] and walks a three-state lifecycle:
//!
//! ```text
//! Unloaded ──upload()──▶ Uploaded ──release()──▶ Released
//!                          │   ▲
//!                          └───┘ draw() (any number of times)
//! ```
//!
//! Upload validates the geometry (at least one channel, matching lengths,
//! indices in range), interleaves it, and hands the buffer to an
//! [`UploadDevice`]. Draw is only valid while uploaded; anywhere else it
//! returns [`GeometryError::NotUploaded`] without touching the encoder.
//! Release is explicit and idempotent; dropping an uploaded mesh frees its
//! handles through ownership.
//!
//! Mutating `mesh.data` after upload does **not** re-upload. Call
//! [`upload`](Mesh::upload) again; the previous buffers are released first.
//!
//! # Example
//!
//! ```
//! use peltast::{DrawParams, Material, Mesh, MeshData, Vec3};
//! use peltast::device::mock::{MockDevice, MockEncoder};
//!
//! let device = MockDevice::new();
//! let mut mesh = Mesh::new(MeshData::cube());
//! mesh.set_translation(Vec3::new(0.0, 1.0, 0.0));
//! mesh.upload(&device).unwrap();
//!
//! let mut encoder = MockEncoder::new();
//! let params = DrawParams::new().uniform_scale(2.0);
//! mesh.draw(&mut encoder, &Material::new(), &params).unwrap();
//!
//! mesh.release(&device);
//! ```

use glam::{Mat4, Vec2, Vec3};

use crate::device::{DrawEncoder, DrawMode, UploadDevice};
use crate::geometry::{GeometryError, MeshData};
use crate::texture::Material;

fn rotation_matrix(radians: f32, axis: Vec3) -> Mat4 {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        Mat4::IDENTITY
    } else {
        Mat4::from_axis_angle(axis, radians)
    }
}

/// Cached object-local transform.
///
/// Each setter builds its 4x4 matrix once, at set time; the accessors
/// return the cached matrix by reference. [`set_scale`](Self::set_scale)
/// additionally records the XY scale factors as the UV scale used for
/// texture-tiling compensation at draw time.
#[derive(Clone, Debug)]
pub struct Transform {
    scale: Mat4,
    rotation: Mat4,
    translation: Mat4,
    uv_scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            translation: Mat4::IDENTITY,
            uv_scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches the scale matrix and records `(x, y)` as the UV scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = Mat4::from_scale(scale);
        self.uv_scale = Vec2::new(scale.x, scale.y);
    }

    /// Caches the rotation matrix from an angle in radians about `axis`.
    ///
    /// The axis is normalized; a zero axis leaves the rotation at identity.
    pub fn set_rotation(&mut self, radians: f32, axis: Vec3) {
        self.rotation = rotation_matrix(radians, axis);
    }

    /// Caches the translation matrix.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = Mat4::from_translation(translation);
    }

    pub fn scale(&self) -> &Mat4 {
        &self.scale
    }

    pub fn rotation(&self) -> &Mat4 {
        &self.rotation
    }

    pub fn translation(&self) -> &Mat4 {
        &self.translation
    }

    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }
}

/// Per-draw transform parameters, composed with the mesh's cached
/// [`Transform`].
///
/// Defaults: position at the origin, unit scale, zero rotation about `+Y`.
/// Rotation is in radians.
///
/// ```
/// use peltast::{DrawParams, Vec3};
///
/// let params = DrawParams::new()
///     .position(Vec3::new(0.0, 2.0, -5.0))
///     .rotation(std::f32::consts::FRAC_PI_4, Vec3::Y)
///     .uniform_scale(2.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DrawParams {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: f32,
    pub rotation_axis: Vec3,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: 0.0,
            rotation_axis: Vec3::Y,
        }
    }
}

impl DrawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the world position.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets non-uniform scale factors.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the same scale on all axes.
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Sets the rotation angle (radians) and axis.
    pub fn rotation(mut self, radians: f32, axis: Vec3) -> Self {
        self.rotation = radians;
        self.rotation_axis = axis;
        self
    }
}

#[derive(Debug)]
enum UploadState<B> {
    Unloaded,
    Uploaded(B),
    Released,
}

/// Geometry plus its device-side lifecycle.
///
/// Generic over the [`UploadDevice`] so the same mesh code runs against
/// wgpu ([`GpuContext`](crate::GpuContext)) and the in-memory mock.
pub struct Mesh<D: UploadDevice> {
    /// Geometry channels. Mutations do not reach the device until the next
    /// [`upload`](Self::upload).
    pub data: MeshData,
    transform: Transform,
    draw_mode: DrawMode,
    scale_textures: bool,
    state: UploadState<D::Buffers>,
}

impl<D: UploadDevice> Mesh<D> {
    /// Wraps geometry in an unloaded mesh with default transform state.
    pub fn new(data: MeshData) -> Self {
        Self {
            data,
            transform: Transform::new(),
            draw_mode: DrawMode::default(),
            scale_textures: false,
            state: UploadState::Unloaded,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Sets the cached scale matrix (and the derived UV scale).
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.set_scale(scale);
    }

    /// Sets the cached rotation matrix (radians about `axis`).
    pub fn set_rotation(&mut self, radians: f32, axis: Vec3) {
        self.transform.set_rotation(radians, axis);
    }

    /// Sets the cached translation matrix.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.set_translation(translation);
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Sets the primitive topology used by draw calls.
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw_mode = mode;
    }

    /// When enabled, texture tiling follows the object's scale instead of
    /// being compensated through the `uv_scale` uniform. Off by default.
    pub fn set_scale_textures(&mut self, enable: bool) {
        self.scale_textures = enable;
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self.state, UploadState::Uploaded(_))
    }

    /// The device buffers, while uploaded.
    pub fn buffers(&self) -> Option<&D::Buffers> {
        match &self.state {
            UploadState::Uploaded(buffers) => Some(buffers),
            _ => None,
        }
    }

    /// Validates and interleaves the geometry, then uploads it.
    ///
    /// Fails with [`GeometryError::EmptyGeometry`] when no channel holds
    /// data, and with the usual validation errors for mismatched channel
    /// lengths or out-of-range indices — all before any device call. A mesh
    /// that is already uploaded is re-uploaded; the old buffers are
    /// released once the new ones exist.
    pub fn upload(&mut self, device: &D) -> Result<(), GeometryError> {
        let layout = self.data.layout();
        if layout.is_empty() {
            log::warn!("upload skipped: no vertex channel present");
            return Err(GeometryError::EmptyGeometry);
        }
        if !self.data.indices.is_empty() {
            self.data.validate_indices(self.data.positions.len())?;
        }
        let vertex_data = self.data.interleave()?;
        let buffers = device.upload_mesh(&vertex_data, &layout, &self.data.indices)?;
        log::debug!(
            "uploaded mesh: {} vertices, stride {}, {} indices",
            self.data.vertex_count(),
            layout.stride(),
            self.data.indices.len()
        );
        if let UploadState::Uploaded(old) =
            std::mem::replace(&mut self.state, UploadState::Uploaded(buffers))
        {
            device.release_mesh(old);
        }
        Ok(())
    }

    /// Frees the device buffers. Idempotent: releasing an unloaded or
    /// already-released mesh does nothing.
    pub fn release(&mut self, device: &D) {
        match std::mem::replace(&mut self.state, UploadState::Released) {
            UploadState::Uploaded(buffers) => device.release_mesh(buffers),
            other => self.state = other,
        }
    }

    /// Binds the material, uploads the composed transform uniforms, and
    /// issues one draw call through `encoder`.
    ///
    /// The model matrix composes the per-draw parameters with the cached
    /// transform in a fixed order:
    ///
    /// ```text
    /// model = T(params) * T(cached) * R(params) * R(cached) * S(params) * S(cached)
    /// ```
    ///
    /// Unless texture scaling is enabled, the `uv_scale` uniform carries
    /// `params.scale.xy * cached uv_scale` so tiling stays independent of
    /// geometric scale.
    ///
    /// Outside the uploaded state this returns
    /// [`GeometryError::NotUploaded`] before emitting anything.
    pub fn draw<E>(
        &self,
        encoder: &mut E,
        material: &Material<D::Texture>,
        params: &DrawParams,
    ) -> Result<(), GeometryError>
    where
        E: DrawEncoder<Texture = D::Texture>,
    {
        if !self.is_uploaded() {
            log::warn!("draw skipped: mesh is not uploaded");
            return Err(GeometryError::NotUploaded);
        }

        for (slot, texture) in material.bound() {
            encoder.bind_texture(slot, texture);
        }

        let model = Mat4::from_translation(params.position)
            * self.transform.translation
            * rotation_matrix(params.rotation, params.rotation_axis)
            * self.transform.rotation
            * Mat4::from_scale(params.scale)
            * self.transform.scale;
        encoder.set_mat4("model", model);

        let uv_scale = if self.scale_textures {
            Vec2::ONE
        } else {
            Vec2::new(
                params.scale.x * self.transform.uv_scale.x,
                params.scale.y * self.transform.uv_scale.y,
            )
        };
        encoder.set_vec2("uv_scale", uv_scale);

        if self.data.indices.is_empty() {
            encoder.draw_arrays(self.draw_mode, self.data.vertex_count() as u32);
        } else {
            encoder.draw_indexed(self.draw_mode, self.data.indices.len() as u32);
        }
        Ok(())
    }
}
