//! Geometry channels, interleaving, and derivation.
//!
//! [`MeshData`] is the central geometry record: up to six per-vertex
//! attribute channels plus an optional index list. Channels are plain
//! `Vec`s — any subset may be empty, and presence is re-evaluated from
//! emptiness whenever a layout is needed.
//!
//! Beyond storage, `MeshData` derives geometry in place:
//!
//! - [`face_normals`](MeshData::face_normals) — flat per-triangle normals
//!   from the cross product
//! - [`tangent_basis`](MeshData::tangent_basis) — per-triangle tangent and
//!   bitangent vectors from UV deltas
//! - [`fill_color`](MeshData::fill_color) — one color for every vertex
//! - [`unwrap_indices`](MeshData::unwrap_indices) — expand indexed geometry
//!   into flat channels
//! - [`subdivide`](MeshData::subdivide) — recursive 4-way midpoint
//!   subdivision
//!
//! and packs the present channels into a single interleaved float buffer
//! via [`interleave`](MeshData::interleave), matching the layout computed
//! by [`VertexLayout`].
//!
//! # Example
//!
//! ```
//! use peltast::{MeshData, Vec3};
//!
//! let mut quad = MeshData::plane(2.0);
//! quad.subdivide(1).unwrap();
//! assert!(quad.indices.is_empty());
//! assert_eq!(quad.positions.len(), 24); // 2 triangles -> 8, 3 corners each
//!
//! quad.face_normals().unwrap();
//! quad.fill_color(Vec3::new(0.8, 0.8, 0.8));
//! let buffer = quad.interleave().unwrap();
//! assert_eq!(buffer.len(), 24 * quad.layout().stride());
//! ```

use glam::{Vec2, Vec3};
use std::fmt;

use crate::channel::{Channel, ChannelSet, VertexLayout};
use crate::device::DeviceError;

/// Hard cap on subdivision depth. Each level quadruples the triangle
/// count, so 6 levels already mean 4096x growth.
pub const MAX_SUBDIVISIONS: u32 = 6;

/// Errors from geometry validation, derivation, and the mesh lifecycle.
#[derive(Debug)]
pub enum GeometryError {
    /// Upload was attempted with no channel present.
    EmptyGeometry,
    /// Draw was attempted before upload (or after release).
    NotUploaded,
    /// Two present channels disagree on element count.
    ChannelSizeMismatch {
        channel: Channel,
        expected: usize,
        actual: usize,
    },
    /// A triangle's UV-delta determinant is zero, so no tangent basis
    /// exists for it.
    DegenerateTangentBasis { triangle: usize },
    /// An index refers past the end of the channel it indexes into.
    IndexOutOfRange { index: u32, limit: usize },
    /// The device rejected an allocation, upload, or texture creation.
    Device(DeviceError),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::EmptyGeometry => {
                write!(f, "no vertex channel present; nothing to upload")
            }
            GeometryError::NotUploaded => {
                write!(f, "mesh is not uploaded; call upload() first")
            }
            GeometryError::ChannelSizeMismatch {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "channel '{channel}' has {actual} elements, expected {expected}"
            ),
            GeometryError::DegenerateTangentBasis { triangle } => write!(
                f,
                "triangle {triangle} has a zero UV-delta determinant; no tangent basis"
            ),
            GeometryError::IndexOutOfRange { index, limit } => {
                write!(f, "index {index} out of range (channel length {limit})")
            }
            GeometryError::Device(e) => write!(f, "device error: {e}"),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for GeometryError {
    fn from(e: DeviceError) -> Self {
        GeometryError::Device(e)
    }
}

/// Raw mesh geometry as independent attribute channels.
///
/// All fields are public: the channels are owned data, and mutating them is
/// how geometry gets authored. Consistency (equal channel lengths, indices
/// in range) is validated when it matters — at interleave and upload time —
/// rather than enforced on every edit.
///
/// When `indices` is empty the geometry is non-indexed and every three
/// consecutive vertices form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates empty geometry with no channels present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates geometry from positions and an (optionally empty) index list.
    pub fn from_positions(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Self::default()
        }
    }

    /// The set of channels that currently hold data.
    ///
    /// Recomputed on every call; presence is never cached.
    pub fn present_channels(&self) -> ChannelSet {
        let mut set = ChannelSet::EMPTY;
        for channel in Channel::ALL {
            if self.channel_len(channel) > 0 {
                set.insert(channel);
            }
        }
        set
    }

    /// The interleaved layout for the currently present channels.
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::new(self.present_channels())
    }

    /// Element count of one channel.
    pub fn channel_len(&self, channel: Channel) -> usize {
        match channel {
            Channel::Position => self.positions.len(),
            Channel::Normal => self.normals.len(),
            Channel::Color => self.colors.len(),
            Channel::Uv => self.uvs.len(),
            Channel::Tangent => self.tangents.len(),
            Channel::Bitangent => self.bitangents.len(),
        }
    }

    /// Total number of floats across all channels.
    pub fn float_count(&self) -> usize {
        Channel::ALL
            .into_iter()
            .map(|c| self.channel_len(c) * c.width())
            .sum()
    }

    /// Number of interleaved vertices: [`float_count`](Self::float_count)
    /// divided by the stride, or 0 when no channel is present.
    pub fn vertex_count(&self) -> usize {
        let stride = self.layout().stride();
        if stride == 0 {
            0
        } else {
            self.float_count() / stride
        }
    }

    /// Checks that all present channels agree on one element count, and
    /// returns it.
    fn validate_lengths(&self) -> Result<usize, GeometryError> {
        let mut expected = None;
        for channel in Channel::ALL {
            let len = self.channel_len(channel);
            if len == 0 {
                continue;
            }
            match expected {
                None => expected = Some(len),
                Some(n) if n != len => {
                    return Err(GeometryError::ChannelSizeMismatch {
                        channel,
                        expected: n,
                        actual: len,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(0))
    }

    /// Checks that every index is below `limit`.
    pub(crate) fn validate_indices(&self, limit: usize) -> Result<(), GeometryError> {
        match self.indices.iter().find(|&&i| i as usize >= limit) {
            Some(&index) => Err(GeometryError::IndexOutOfRange { index, limit }),
            None => Ok(()),
        }
    }

    /// Packs the present channels into one interleaved float buffer.
    ///
    /// Per vertex, channels appear in fixed order (position, normal, color,
    /// uv, tangent, bitangent), absent channels skipped. The output length
    /// is vertex count x stride, and the element positions agree exactly
    /// with [`layout`](Self::layout).
    ///
    /// Fails with [`GeometryError::ChannelSizeMismatch`] if the present
    /// channels disagree on element count.
    pub fn interleave(&self) -> Result<Vec<f32>, GeometryError> {
        let layout = self.layout();
        let count = self.validate_lengths()?;
        let mut data = Vec::with_capacity(count * layout.stride());
        for i in 0..count {
            for &(channel, _) in layout.slots() {
                match channel {
                    Channel::Position => data.extend(self.positions[i].to_array()),
                    Channel::Normal => data.extend(self.normals[i].to_array()),
                    Channel::Color => data.extend(self.colors[i].to_array()),
                    Channel::Uv => data.extend(self.uvs[i].to_array()),
                    Channel::Tangent => data.extend(self.tangents[i].to_array()),
                    Channel::Bitangent => data.extend(self.bitangents[i].to_array()),
                }
            }
        }
        Ok(data)
    }

    /// Replaces `normals` with flat per-triangle face normals.
    ///
    /// Each triangle's normal is `cross(p2 - p1, p3 - p1)`, stored
    /// identically on all three corners. The cross product is deliberately
    /// left unnormalized — its length encodes twice the triangle's area —
    /// so normalize downstream if unit normals are required.
    ///
    /// For indexed geometry this produces one normal per index (three per
    /// triangle), leaving the channel face-expanded until
    /// [`unwrap_indices`](Self::unwrap_indices) flattens the rest of the
    /// mesh to match.
    pub fn face_normals(&mut self) -> Result<(), GeometryError> {
        self.normals.clear();
        if self.indices.is_empty() {
            for tri in self.positions.chunks_exact(3) {
                let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                self.normals.extend([normal; 3]);
            }
        } else {
            self.validate_indices(self.positions.len())?;
            for tri in self.indices.chunks_exact(3) {
                let p1 = self.positions[tri[0] as usize];
                let p2 = self.positions[tri[1] as usize];
                let p3 = self.positions[tri[2] as usize];
                let normal = (p2 - p1).cross(p3 - p1);
                self.normals.extend([normal; 3]);
            }
        }
        Ok(())
    }

    /// Replaces `tangents` and `bitangents` with flat per-triangle basis
    /// vectors derived from positions and UVs.
    ///
    /// Per triangle, solves the 2x2 system relating position deltas to UV
    /// deltas in closed form. A triangle whose UV-delta determinant is zero
    /// (duplicate or collinear UVs) has no basis; the call fails with
    /// [`GeometryError::DegenerateTangentBasis`] naming the first such
    /// triangle, and both channels are left empty rather than half-written.
    ///
    /// Requires `uvs` aligned with `positions`. Like
    /// [`face_normals`](Self::face_normals), indexed geometry produces
    /// face-expanded output.
    pub fn tangent_basis(&mut self) -> Result<(), GeometryError> {
        self.tangents.clear();
        self.bitangents.clear();
        if self.uvs.len() != self.positions.len() {
            return Err(GeometryError::ChannelSizeMismatch {
                channel: Channel::Uv,
                expected: self.positions.len(),
                actual: self.uvs.len(),
            });
        }

        let mut tangents = Vec::new();
        let mut bitangents = Vec::new();
        let mut emit =
            |triangle: usize, p: [Vec3; 3], uv: [Vec2; 3]| -> Result<(), GeometryError> {
                let delta_pos1 = p[1] - p[0];
                let delta_pos2 = p[2] - p[0];
                let delta_uv1 = uv[1] - uv[0];
                let delta_uv2 = uv[2] - uv[0];

                let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
                if det.abs() <= f32::EPSILON {
                    return Err(GeometryError::DegenerateTangentBasis { triangle });
                }
                let r = 1.0 / det;
                let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
                let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;
                tangents.extend([tangent; 3]);
                bitangents.extend([bitangent; 3]);
                Ok(())
            };

        if self.indices.is_empty() {
            for (triangle, (p, uv)) in self
                .positions
                .chunks_exact(3)
                .zip(self.uvs.chunks_exact(3))
                .enumerate()
            {
                emit(triangle, [p[0], p[1], p[2]], [uv[0], uv[1], uv[2]])?;
            }
        } else {
            self.validate_indices(self.positions.len())?;
            for (triangle, tri) in self.indices.chunks_exact(3).enumerate() {
                let [i1, i2, i3] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                emit(
                    triangle,
                    [self.positions[i1], self.positions[i2], self.positions[i3]],
                    [self.uvs[i1], self.uvs[i2], self.uvs[i3]],
                )?;
            }
        }

        self.tangents = tangents;
        self.bitangents = bitangents;
        Ok(())
    }

    /// Replaces `colors` with one color per interleaved vertex.
    ///
    /// The count comes from [`vertex_count`](Self::vertex_count), so a mesh
    /// whose other channels are already populated gets a color for each of
    /// them.
    pub fn fill_color(&mut self, color: Vec3) {
        let count = self.vertex_count();
        self.colors = vec![color; count];
    }

    /// Expands indexed geometry into flat, non-indexed channels.
    ///
    /// Every present channel is rebuilt as `channel[indices[i]]` for each
    /// index in turn, then `indices` is cleared. Non-indexed geometry is
    /// left untouched. Fails without modifying anything if an index is out
    /// of range for a channel it would read.
    pub fn unwrap_indices(&mut self) -> Result<(), GeometryError> {
        if self.indices.is_empty() {
            return Ok(());
        }
        for channel in Channel::ALL {
            let len = self.channel_len(channel);
            if len > 0 {
                self.validate_indices(len)?;
            }
        }

        let indices = std::mem::take(&mut self.indices);
        if !self.positions.is_empty() {
            self.positions = unwrap_channel(&self.positions, &indices);
        }
        if !self.normals.is_empty() {
            self.normals = unwrap_channel(&self.normals, &indices);
        }
        if !self.colors.is_empty() {
            self.colors = unwrap_channel(&self.colors, &indices);
        }
        if !self.uvs.is_empty() {
            self.uvs = unwrap_channel(&self.uvs, &indices);
        }
        if !self.tangents.is_empty() {
            self.tangents = unwrap_channel(&self.tangents, &indices);
        }
        if !self.bitangents.is_empty() {
            self.bitangents = unwrap_channel(&self.bitangents, &indices);
        }
        Ok(())
    }

    /// Splits every triangle into four, `levels` times.
    ///
    /// Indexed geometry is unwrapped first, since subdivision rewrites
    /// channels in triangle order. Each triangle `(v1, v2, v3)` becomes
    /// `(v1, va, vc), (va, vb, vc), (va, v2, vb), (vc, vb, v3)` with
    /// `va/vb/vc` the edge midpoints, applied identically to every present
    /// channel so they stay vertex-aligned.
    ///
    /// `levels` is clamped to [`MAX_SUBDIVISIONS`]. Trailing elements that
    /// do not form a full triangle are dropped.
    pub fn subdivide(&mut self, levels: u32) -> Result<(), GeometryError> {
        self.unwrap_indices()?;
        for _ in 0..levels.min(MAX_SUBDIVISIONS) {
            if !self.positions.is_empty() {
                self.positions = subdivide_channel(&self.positions, Vec3::midpoint);
            }
            if !self.normals.is_empty() {
                self.normals = subdivide_channel(&self.normals, Vec3::midpoint);
            }
            if !self.colors.is_empty() {
                self.colors = subdivide_channel(&self.colors, Vec3::midpoint);
            }
            if !self.uvs.is_empty() {
                self.uvs = subdivide_channel(&self.uvs, Vec2::midpoint);
            }
            if !self.tangents.is_empty() {
                self.tangents = subdivide_channel(&self.tangents, Vec3::midpoint);
            }
            if !self.bitangents.is_empty() {
                self.bitangents = subdivide_channel(&self.bitangents, Vec3::midpoint);
            }
        }
        Ok(())
    }

    /// A unit cube centered at the origin, with per-face normals and UVs.
    ///
    /// 24 vertices (4 per face, so each face gets its own normal) and 36
    /// indices, counter-clockwise front faces.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // normal              corners, CCW from outside
            ([ 0.0,  0.0,  1.0], [[-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5]]),
            ([ 0.0,  0.0, -1.0], [[ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5]]),
            ([ 0.0,  1.0,  0.0], [[-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5]]),
            ([ 0.0, -1.0,  0.0], [[-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5]]),
            ([ 1.0,  0.0,  0.0], [[ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5]]),
            ([-1.0,  0.0,  0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5]]),
        ];
        const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut data = MeshData::new();
        for (face, (normal, corners)) in FACES.iter().enumerate() {
            let base = (face * 4) as u32;
            for (corner, position) in corners.iter().enumerate() {
                data.positions.push(Vec3::from_array(*position));
                data.normals.push(Vec3::from_array(*normal));
                data.uvs.push(Vec2::from_array(CORNER_UVS[corner]));
            }
            data.indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        data
    }

    /// A flat square plane of the given size on the XZ axis, normals up.
    pub fn plane(size: f32) -> Self {
        let half = size * 0.5;
        Self {
            positions: vec![
                Vec3::new(-half, 0.0, -half),
                Vec3::new(half, 0.0, -half),
                Vec3::new(half, 0.0, half),
                Vec3::new(-half, 0.0, half),
            ],
            normals: vec![Vec3::Y; 4],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
            ..Self::default()
        }
    }

    /// A bipyramid: a square equator of the given width, apexes at
    /// `+-height / 2`.
    ///
    /// Positions and indices only; call
    /// [`face_normals`](Self::face_normals) for flat shading.
    pub fn diamond(width: f32, height: f32) -> Self {
        let r = width * 0.5;
        let h = height * 0.5;
        Self::from_positions(
            vec![
                Vec3::new(0.0, h, 0.0),
                Vec3::new(r, 0.0, 0.0),
                Vec3::new(0.0, 0.0, r),
                Vec3::new(-r, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -r),
                Vec3::new(0.0, -h, 0.0),
            ],
            vec![
                0, 2, 1, 0, 3, 2, 0, 4, 3, 0, 1, 4, // upper faces
                5, 1, 2, 5, 2, 3, 5, 3, 4, 5, 4, 1, // lower faces
            ],
        )
    }
}

fn unwrap_channel<T: Copy>(data: &[T], indices: &[u32]) -> Vec<T> {
    indices.iter().map(|&i| data[i as usize]).collect()
}

fn subdivide_channel<T: Copy>(data: &[T], midpoint: fn(T, T) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(data.len() * 4);
    for tri in data.chunks_exact(3) {
        let (v1, v2, v3) = (tri[0], tri[1], tri[2]);
        let va = midpoint(v1, v2);
        let vb = midpoint(v2, v3);
        let vc = midpoint(v1, v3);
        out.extend([v1, va, vc, va, vb, vc, va, v2, vb, vc, vb, v3]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_channels(bits: u8, n: usize) -> MeshData {
        let mut data = MeshData::new();
        for channel in Channel::ALL {
            if bits & (1 << channel as u8) == 0 {
                continue;
            }
            match channel {
                Channel::Position => data.positions = vec![Vec3::ONE; n],
                Channel::Normal => data.normals = vec![Vec3::ONE; n],
                Channel::Color => data.colors = vec![Vec3::ONE; n],
                Channel::Uv => data.uvs = vec![Vec2::ONE; n],
                Channel::Tangent => data.tangents = vec![Vec3::ONE; n],
                Channel::Bitangent => data.bitangents = vec![Vec3::ONE; n],
            }
        }
        data
    }

    fn unit_triangle() -> MeshData {
        MeshData::from_positions(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![],
        )
    }

    #[test]
    fn interleave_length_is_count_times_stride_for_every_combination() {
        for bits in 0u8..64 {
            let data = with_channels(bits, 2);
            let buffer = data.interleave().unwrap();
            assert_eq!(buffer.len(), 2 * data.layout().stride(), "bits {bits:#08b}");
        }
    }

    #[test]
    fn interleave_orders_channels_per_vertex() {
        let data = MeshData {
            positions: vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
            uvs: vec![Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4)],
            ..MeshData::default()
        };
        let buffer = data.interleave().unwrap();
        assert_eq!(
            buffer,
            vec![1.0, 2.0, 3.0, 0.1, 0.2, 4.0, 5.0, 6.0, 0.3, 0.4]
        );
    }

    #[test]
    fn interleave_rejects_mismatched_channels() {
        let mut data = unit_triangle();
        data.normals = vec![Vec3::Z; 2];
        let err = data.interleave().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::ChannelSizeMismatch {
                channel: Channel::Normal,
                expected: 3,
                actual: 2,
            }
        ));
    }

    #[test]
    fn vertex_count_is_zero_for_empty_geometry() {
        assert_eq!(MeshData::new().vertex_count(), 0);
    }

    #[test]
    fn face_normals_are_flat_and_unnormalized() {
        let mut data = unit_triangle();
        data.positions.iter_mut().for_each(|p| *p *= 2.0);
        data.face_normals().unwrap();
        // doubled edges -> cross product (0, 0, 4), not rescaled to unit
        assert_eq!(data.normals, vec![Vec3::new(0.0, 0.0, 4.0); 3]);
    }

    #[test]
    fn face_normals_of_unit_triangle_point_up_z() {
        let mut data = unit_triangle();
        data.face_normals().unwrap();
        assert_eq!(data.normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn face_normals_on_indexed_geometry_expand_per_corner() {
        let mut data = MeshData::plane(1.0);
        data.face_normals().unwrap();
        assert_eq!(data.normals.len(), data.indices.len());
        assert!(data.normals.iter().all(|&n| n == Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn face_normals_reject_out_of_range_indices() {
        let mut data = MeshData::from_positions(vec![Vec3::ZERO; 3], vec![0, 1, 7]);
        let err = data.face_normals().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { index: 7, limit: 3 }
        ));
    }

    #[test]
    fn tangents_align_with_uv_axes() {
        let mut data = unit_triangle();
        data.uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        data.tangent_basis().unwrap();
        // U axis follows the +X edge, V axis the +Y edge
        assert_eq!(data.tangents, vec![Vec3::X; 3]);
        assert_eq!(data.bitangents, vec![Vec3::Y; 3]);
    }

    #[test]
    fn degenerate_uvs_fail_without_partial_output() {
        let mut data = MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ZERO, Vec3::X, Vec3::Y],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                // second triangle collapses to one UV point
                Vec2::new(0.5, 0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(0.5, 0.5),
            ],
            ..MeshData::default()
        };
        let err = data.tangent_basis().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::DegenerateTangentBasis { triangle: 1 }
        ));
        assert!(data.tangents.is_empty());
        assert!(data.bitangents.is_empty());
    }

    #[test]
    fn tangents_require_uvs() {
        let mut data = unit_triangle();
        let err = data.tangent_basis().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::ChannelSizeMismatch {
                channel: Channel::Uv,
                expected: 3,
                actual: 0,
            }
        ));
    }

    #[test]
    fn fill_color_covers_every_interleaved_vertex() {
        let mut data = unit_triangle();
        data.normals = vec![Vec3::Z; 3];
        data.fill_color(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(data.colors, vec![Vec3::new(0.2, 0.4, 0.6); 3]);
    }

    #[test]
    fn unwrap_applies_the_index_mapping() {
        let mut data = MeshData::plane(2.0);
        let original = data.clone();
        data.unwrap_indices().unwrap();

        assert!(data.indices.is_empty());
        assert_eq!(data.positions.len(), original.indices.len());
        for (i, &index) in original.indices.iter().enumerate() {
            assert_eq!(data.positions[i], original.positions[index as usize]);
            assert_eq!(data.uvs[i], original.uvs[index as usize]);
        }
    }

    #[test]
    fn unwrap_is_a_no_op_without_indices() {
        let mut data = unit_triangle();
        let before = data.clone();
        data.unwrap_indices().unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn unwrap_rejects_out_of_range_indices() {
        let mut data = MeshData::from_positions(vec![Vec3::ZERO; 2], vec![0, 1, 2]);
        let err = data.unwrap_indices().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { index: 2, limit: 2 }
        ));
        // nothing was modified
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.positions.len(), 2);
    }

    #[test]
    fn subdivision_quadruples_triangles_per_level() {
        for levels in 0..=3 {
            let mut data = unit_triangle();
            data.subdivide(levels).unwrap();
            assert_eq!(data.positions.len(), 3 * 4usize.pow(levels));
        }
    }

    #[test]
    fn subdivision_levels_clamp_at_six() {
        let mut data = unit_triangle();
        data.subdivide(9).unwrap();
        assert_eq!(data.positions.len(), 3 * 4usize.pow(MAX_SUBDIVISIONS));
    }

    #[test]
    fn subdivision_emits_exact_edge_midpoints() {
        let mut data = unit_triangle();
        data.subdivide(1).unwrap();
        let va = Vec3::new(0.5, 0.0, 0.0);
        let vb = Vec3::new(0.5, 0.5, 0.0);
        let vc = Vec3::new(0.0, 0.5, 0.0);
        assert_eq!(
            data.positions,
            vec![
                Vec3::ZERO, va, vc, //
                va, vb, vc, //
                va, Vec3::X, vb, //
                vc, vb, Vec3::Y,
            ]
        );
    }

    #[test]
    fn subdividing_indexed_positions_unwraps_first() {
        let mut data = MeshData::from_positions(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
            vec![0, 1, 2, 2, 1, 3],
        );
        data.subdivide(1).unwrap();
        assert!(data.indices.is_empty());
        assert_eq!(data.positions.len(), 6 * 4);
        assert!(data.normals.is_empty());
        assert!(data.colors.is_empty());
        assert!(data.uvs.is_empty());
    }

    #[test]
    fn subdivision_keeps_channels_aligned() {
        let mut data = unit_triangle();
        data.uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        data.colors = vec![Vec3::ONE; 3];
        data.subdivide(1).unwrap();
        assert_eq!(data.positions.len(), 12);
        assert_eq!(data.uvs.len(), 12);
        assert_eq!(data.colors.len(), 12);
        // UVs subdivide with 2-D midpoints in the same topology
        assert_eq!(data.uvs[1], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn cube_interleaves_cleanly() {
        let data = MeshData::cube();
        assert_eq!(data.positions.len(), 24);
        assert_eq!(data.indices.len(), 36);
        let buffer = data.interleave().unwrap();
        // position + normal + uv = 8 floats per vertex
        assert_eq!(buffer.len(), 24 * 8);
        assert_eq!(data.layout().stride(), 8);
    }

    #[test]
    fn diamond_indices_are_in_range() {
        let data = MeshData::diamond(1.0, 2.0);
        assert_eq!(data.positions.len(), 6);
        assert_eq!(data.indices.len(), 24);
        data.validate_indices(data.positions.len()).unwrap();
    }
}
