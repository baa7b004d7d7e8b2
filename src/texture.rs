//! Material textures: loading, roles, and bind slots.

use std::fmt;
use std::path::Path;

use crate::device::{DeviceError, PixelFormat, TextureDescriptor, TextureSlot, UploadDevice};

/// Material texture roles. Each role binds to a fixed slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Displacement,
    AmbientOcclusion,
}

impl TextureKind {
    /// The bind slot for this role.
    pub const fn slot(self) -> TextureSlot {
        match self {
            TextureKind::Diffuse => TextureSlot::Diffuse,
            TextureKind::Specular => TextureSlot::Specular,
            TextureKind::Normal => TextureSlot::Normal,
            TextureKind::Displacement => TextureSlot::Displacement,
            TextureKind::AmbientOcclusion => TextureSlot::AmbientOcclusion,
        }
    }
}

/// Errors from loading a material texture.
#[derive(Debug)]
pub enum TextureError {
    /// The image file could not be read or decoded.
    Image(image::ImageError),
    /// The device rejected the texture.
    Device(DeviceError),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Image(e) => write!(f, "image error: {e}"),
            TextureError::Device(e) => write!(f, "device error: {e}"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Image(e) => Some(e),
            TextureError::Device(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Image(e)
    }
}

impl From<DeviceError> for TextureError {
    fn from(e: DeviceError) -> Self {
        TextureError::Device(e)
    }
}

/// One optional texture per material role.
///
/// `T` is the device's texture handle type ([`GpuTexture`](crate::GpuTexture)
/// on wgpu, `MockTexture` in tests). [`Mesh::draw`](crate::Mesh::draw) binds
/// only the roles that are set, always in slot order.
#[derive(Clone, Debug)]
pub struct Material<T> {
    pub diffuse: Option<T>,
    pub specular: Option<T>,
    pub normal: Option<T>,
    pub displacement: Option<T>,
    pub ambient_occlusion: Option<T>,
}

impl<T> Default for Material<T> {
    fn default() -> Self {
        Self {
            diffuse: None,
            specular: None,
            normal: None,
            displacement: None,
            ambient_occlusion: None,
        }
    }
}

impl<T> Material<T> {
    /// A material with no textures bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a texture to a role, replacing any previous one.
    pub fn set(&mut self, kind: TextureKind, texture: T) {
        *self.slot_mut(kind) = Some(texture);
    }

    /// The texture for a role, if set.
    pub fn get(&self, kind: TextureKind) -> Option<&T> {
        match kind {
            TextureKind::Diffuse => self.diffuse.as_ref(),
            TextureKind::Specular => self.specular.as_ref(),
            TextureKind::Normal => self.normal.as_ref(),
            TextureKind::Displacement => self.displacement.as_ref(),
            TextureKind::AmbientOcclusion => self.ambient_occlusion.as_ref(),
        }
    }

    /// The set roles with their bind slots, in slot order.
    pub fn bound(&self) -> impl Iterator<Item = (TextureSlot, &T)> {
        [
            (TextureSlot::Diffuse, self.diffuse.as_ref()),
            (TextureSlot::Specular, self.specular.as_ref()),
            (TextureSlot::Normal, self.normal.as_ref()),
            (TextureSlot::Displacement, self.displacement.as_ref()),
            (TextureSlot::AmbientOcclusion, self.ambient_occlusion.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, texture)| texture.map(|t| (slot, t)))
    }

    fn slot_mut(&mut self, kind: TextureKind) -> &mut Option<T> {
        match kind {
            TextureKind::Diffuse => &mut self.diffuse,
            TextureKind::Specular => &mut self.specular,
            TextureKind::Normal => &mut self.normal,
            TextureKind::Displacement => &mut self.displacement,
            TextureKind::AmbientOcclusion => &mut self.ambient_occlusion,
        }
    }

    /// Loads an image file and creates the device texture for `kind`.
    pub fn load_file<D>(
        &mut self,
        device: &D,
        path: impl AsRef<Path>,
        kind: TextureKind,
    ) -> Result<(), TextureError>
    where
        D: UploadDevice<Texture = T>,
    {
        let path = path.as_ref();
        let image = image::open(path)?;
        self.create(device, image, path.display().to_string(), kind)
    }

    /// Decodes image bytes and creates the device texture for `kind`.
    pub fn load_bytes<D>(
        &mut self,
        device: &D,
        bytes: &[u8],
        label: &str,
        kind: TextureKind,
    ) -> Result<(), TextureError>
    where
        D: UploadDevice<Texture = T>,
    {
        let image = image::load_from_memory(bytes)?;
        self.create(device, image, label.to_string(), kind)
    }

    fn create<D>(
        &mut self,
        device: &D,
        image: image::DynamicImage,
        label: String,
        kind: TextureKind,
    ) -> Result<(), TextureError>
    where
        D: UploadDevice<Texture = T>,
    {
        let (format, width, height, pixels) = pixel_data(image);
        let desc = TextureDescriptor {
            width,
            height,
            format,
            label,
        };
        let texture = device.create_texture(&desc, &pixels)?;
        log::debug!(
            "created {kind:?} texture '{}' ({width}x{height}, {format:?})",
            desc.label
        );
        self.set(kind, texture);
        Ok(())
    }
}

/// Maps a decoded image to the pixel-format contract: one channel stays
/// single-channel, three stays RGB, four stays RGBA. Anything else is
/// converted to RGBA.
fn pixel_data(image: image::DynamicImage) -> (PixelFormat, u32, u32, Vec<u8>) {
    match image {
        image::DynamicImage::ImageLuma8(buf) => {
            let (w, h) = buf.dimensions();
            (PixelFormat::R8, w, h, buf.into_raw())
        }
        image::DynamicImage::ImageRgb8(buf) => {
            let (w, h) = buf.dimensions();
            (PixelFormat::Rgb8, w, h, buf.into_raw())
        }
        image::DynamicImage::ImageRgba8(buf) => {
            let (w, h) = buf.dimensions();
            (PixelFormat::Rgba8, w, h, buf.into_raw())
        }
        other => {
            let buf = other.to_rgba8();
            let (w, h) = buf.dimensions();
            (PixelFormat::Rgba8, w, h, buf.into_raw())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    #[test]
    fn pixel_format_follows_channel_count() {
        let gray = image::DynamicImage::ImageLuma8(image::GrayImage::new(2, 3));
        let (format, w, h, pixels) = pixel_data(gray);
        assert_eq!(format, PixelFormat::R8);
        assert_eq!((w, h), (2, 3));
        assert_eq!(pixels.len(), 6);

        let rgb = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        assert_eq!(pixel_data(rgb).0, PixelFormat::Rgb8);

        let rgba = image::DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        assert_eq!(pixel_data(rgba).0, PixelFormat::Rgba8);
    }

    #[test]
    fn other_color_types_convert_to_rgba() {
        let luma16 = image::DynamicImage::ImageLuma16(image::ImageBuffer::new(2, 2));
        let (format, _, _, pixels) = pixel_data(luma16);
        assert_eq!(format, PixelFormat::Rgba8);
        assert_eq!(pixels.len(), 2 * 2 * 4);
    }

    #[test]
    fn roles_map_to_fixed_slots() {
        assert_eq!(TextureKind::Diffuse.slot().index(), 0);
        assert_eq!(TextureKind::Specular.slot().index(), 1);
        assert_eq!(TextureKind::Normal.slot().index(), 2);
        assert_eq!(TextureKind::Displacement.slot().index(), 3);
        assert_eq!(TextureKind::AmbientOcclusion.slot().index(), 4);
    }

    #[test]
    fn bound_iterates_set_roles_in_slot_order() {
        let device = MockDevice::new();
        let desc = TextureDescriptor {
            width: 1,
            height: 1,
            format: PixelFormat::R8,
            label: "ao".into(),
        };
        let ao = device.create_texture(&desc, &[255]).unwrap();
        let diffuse = device.create_texture(&desc, &[128]).unwrap();

        let mut material = Material::new();
        material.set(TextureKind::AmbientOcclusion, ao);
        material.set(TextureKind::Diffuse, diffuse);

        let slots: Vec<TextureSlot> = material.bound().map(|(slot, _)| slot).collect();
        assert_eq!(
            slots,
            vec![TextureSlot::Diffuse, TextureSlot::AmbientOcclusion]
        );
        assert!(material.get(TextureKind::Specular).is_none());
    }
}
