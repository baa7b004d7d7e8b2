//! Attribute channels and interleaved vertex layout.
//!
//! A mesh is described as up to six independent per-vertex attribute streams
//! ("channels"). Which channels are present varies per mesh, so the
//! interleaved buffer layout — stride and per-channel offsets — is computed
//! at runtime from a [`ChannelSet`] instead of being baked into a vertex
//! struct.
//!
//! Channel order in the interleaved buffer is fixed:
//!
//! | Channel   | Width (floats) | Shader location |
//! |-----------|----------------|-----------------|
//! | position  | 3              | 0               |
//! | normal    | 3              | 1               |
//! | color     | 3              | 2               |
//! | uv        | 2              | 3               |
//! | tangent   | 3              | 4               |
//! | bitangent | 3              | 5               |
//!
//! Absent channels are skipped entirely; each present channel's offset is
//! the sum of the widths of the present channels before it. Shader locations
//! stay fixed per channel regardless of which others are present, so the
//! same shader can consume any subset.
//!
//! [`VertexLayout::new`] is a pure function of a [`ChannelSet`]. The
//! interleaver and the attribute bindings are both derived from the same
//! set in the same call path, so they cannot drift apart.

use std::fmt;

/// One per-vertex attribute stream.
///
/// Declaration order is interleave order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Normal,
    Color,
    Uv,
    Tangent,
    Bitangent,
}

impl Channel {
    /// All channels, in interleave order.
    pub const ALL: [Channel; 6] = [
        Channel::Position,
        Channel::Normal,
        Channel::Color,
        Channel::Uv,
        Channel::Tangent,
        Channel::Bitangent,
    ];

    /// Floats per vertex for this channel.
    pub const fn width(self) -> usize {
        match self {
            Channel::Uv => 2,
            _ => 3,
        }
    }

    /// Fixed shader location of this channel's attribute.
    pub const fn location(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Position => "position",
            Channel::Normal => "normal",
            Channel::Color => "color",
            Channel::Uv => "uv",
            Channel::Tangent => "tangent",
            Channel::Bitangent => "bitangent",
        };
        f.write_str(name)
    }
}

/// Presence flags for the six channels.
///
/// A `ChannelSet` is recomputed from channel emptiness every time a layout
/// is needed; it is never stored on a mesh, so stale presence information
/// cannot leak into an upload.
///
/// ```
/// use peltast::{Channel, ChannelSet};
///
/// let set = ChannelSet::EMPTY.with(Channel::Position).with(Channel::Uv);
/// assert!(set.contains(Channel::Uv));
/// assert!(!set.contains(Channel::Normal));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// The set with no channels present.
    pub const EMPTY: ChannelSet = ChannelSet(0);

    /// Returns this set with `channel` added.
    pub fn with(mut self, channel: Channel) -> Self {
        self.insert(channel);
        self
    }

    /// Adds `channel` to the set.
    pub fn insert(&mut self, channel: Channel) {
        self.0 |= 1 << channel as u8;
    }

    /// Whether `channel` is in the set.
    pub fn contains(self, channel: Channel) -> bool {
        self.0 & (1 << channel as u8) != 0
    }

    /// Whether no channel is present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of present channels.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Present channels, in interleave order.
    pub fn iter(self) -> impl Iterator<Item = Channel> {
        Channel::ALL.into_iter().filter(move |&c| self.contains(c))
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Stride and per-channel offsets for one interleaved vertex buffer.
///
/// ```
/// use peltast::{Channel, ChannelSet, VertexLayout};
///
/// let layout = VertexLayout::new(
///     ChannelSet::EMPTY.with(Channel::Position).with(Channel::Uv),
/// );
/// assert_eq!(layout.stride(), 5);
/// assert_eq!(layout.offset(Channel::Position), Some(0));
/// assert_eq!(layout.offset(Channel::Uv), Some(3));
/// assert_eq!(layout.offset(Channel::Normal), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    stride: usize,
    slots: Vec<(Channel, usize)>,
}

impl VertexLayout {
    /// Computes the layout for the given set of present channels.
    pub fn new(present: ChannelSet) -> Self {
        let mut slots = Vec::with_capacity(present.len());
        let mut stride = 0;
        for channel in Channel::ALL {
            if present.contains(channel) {
                slots.push((channel, stride));
                stride += channel.width();
            }
        }
        Self { stride, slots }
    }

    /// Floats per interleaved vertex.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per interleaved vertex.
    pub fn stride_bytes(&self) -> usize {
        self.stride * size_of::<f32>()
    }

    /// Float offset of `channel` within one vertex, if present.
    pub fn offset(&self, channel: Channel) -> Option<usize> {
        self.slots
            .iter()
            .find(|&&(c, _)| c == channel)
            .map(|&(_, offset)| offset)
    }

    /// Byte offset of `channel` within one vertex, if present.
    pub fn offset_bytes(&self, channel: Channel) -> Option<usize> {
        self.offset(channel).map(|o| o * size_of::<f32>())
    }

    /// Present channels with their float offsets, in interleave order.
    pub fn slots(&self) -> &[(Channel, usize)] {
        &self.slots
    }

    /// True when no channel is present (stride 0).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
