//! GPU-facing records and the encoder that produces them.
//!
//! All types here are `#[repr(C)]` and [`Pod`], so a slice of them can be handed to a
//! buffer upload as bytes without copying. The field order of [`RenderRecord`] is the
//! layout the raymarching shader reads; change both together or not at all.

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::math::quat_to_euler_degrees;
use crate::primitive::Primitive;
use crate::registry::SceneRegistry;
use crate::shape::ShapeKind;

/// One primitive as the shader sees it: 19 tightly packed floats.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderRecord {
    /// Shape parameters, see [`crate::Shape::sdf_options`]
    pub options: [f32; 4],
    pub position: [f32; 3],
    /// Pitch, yaw, roll in degrees, each in `[0, 360)`
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 4],
    pub material: [f32; 2],
}

impl RenderRecord {
    pub const FLOATS: usize = 19;
}

impl From<&Primitive> for RenderRecord {
    fn from(primitive: &Primitive) -> Self {
        let transform = &primitive.transform;
        Self {
            options: primitive.sdf_options().to_array(),
            position: transform.position.to_array(),
            rotation: quat_to_euler_degrees(transform.rotation()).to_array(),
            scale: transform.scale.to_array(),
            color: primitive.color.to_array(),
            material: primitive.material,
        }
    }
}

/// Per-frame camera block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Camera position in xyz, aspect ratio in w
    pub position_aspect: [f32; 4],
    /// Camera direction in xyz, seconds since start in w
    pub direction_time: [f32; 4],
}

/// Where one kind's slots live inside a slot-addressed record buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SlotRange {
    pub offset: u32,
    /// Number of claimed slots in the range
    pub count: u32,
    pub capacity: u32,
    pub _pad: u32,
}

/// Offsets table accompanying [`RenderDataEncoder::encode_slotted`], indexed by
/// [`ShapeKind::index`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SceneLayout {
    pub ranges: [SlotRange; ShapeKind::COUNT],
}

impl SceneLayout {
    #[must_use]
    pub fn range(&self, kind: ShapeKind) -> SlotRange {
        self.ranges[kind.index()]
    }
}

#[must_use]
pub fn encode_primitive(primitive: &Primitive) -> RenderRecord {
    RenderRecord::from(primitive)
}

/// Builds the camera block for one frame.
#[must_use]
pub fn encode_frame(camera: &Camera, time: f32) -> FrameUniform {
    FrameUniform {
        view: camera.view_matrix().to_cols_array_2d(),
        projection: camera.projection_matrix().to_cols_array_2d(),
        position_aspect: camera.transform.position.extend(camera.aspect).to_array(),
        direction_time: camera.direction().extend(time).to_array(),
    }
}

/// Converts primitives to [`RenderRecord`]s, reusing its buffers between frames.
///
/// Encoding reads primitives only. The same input always produces the same bytes.
#[derive(Debug, Default, Clone)]
pub struct RenderDataEncoder {
    records: Vec<RenderRecord>,
    slotted: Vec<RenderRecord>,
    layout: SceneLayout,
}

impl RenderDataEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One record per primitive, in input order.
    pub fn encode<'a>(&mut self, primitives: impl IntoIterator<Item = &'a Primitive>) -> &[RenderRecord] {
        self.records.clear();
        self.records.extend(primitives.into_iter().map(RenderRecord::from));
        &self.records
    }

    /// Encodes the registry's primitives in claim order.
    pub fn encode_registry(&mut self, registry: &SceneRegistry) -> &[RenderRecord] {
        self.encode(registry.all_primitives())
    }

    /// One record per pool slot, pools concatenated in [`ShapeKind::ALL`] order.
    ///
    /// Unclaimed slots are zeroed, so a claimed primitive keeps its buffer address for
    /// as long as it lives.
    pub fn encode_slotted(&mut self, registry: &SceneRegistry) -> (&[RenderRecord], SceneLayout) {
        self.slotted.clear();
        for pool in registry.pools() {
            #[allow(clippy::cast_possible_truncation)]
            let range = SlotRange {
                offset: self.slotted.len() as u32,
                count: pool.claimed_count() as u32,
                capacity: pool.capacity() as u32,
                _pad: 0,
            };
            self.layout.ranges[pool.kind().index()] = range;
            self.slotted.extend(pool.slots().map(|(claimed, primitive)| {
                if claimed {
                    RenderRecord::from(primitive)
                } else {
                    RenderRecord::zeroed()
                }
            }));
        }
        (&self.slotted, self.layout)
    }

    /// Both layouts of the registry at once: `(claim order, per slot, slot table)`.
    pub fn encode_scene(&mut self, registry: &SceneRegistry) -> (&[RenderRecord], &[RenderRecord], SceneLayout) {
        self.encode_registry(registry);
        self.encode_slotted(registry);
        (&self.records, &self.slotted, self.layout)
    }

    /// Records from the last [`Self::encode`] call.
    #[must_use]
    pub fn records(&self) -> &[RenderRecord] {
        &self.records
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }
}
