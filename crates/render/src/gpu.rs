//! Device-side storage for encoded frames.
//!
//! [`SceneBuffers`] owns one uniform buffer for the camera block, one for the slot
//! table and two storage buffers for the claim-order and slot-addressed records.
//! Storage buffers grow when a frame no longer fits and the bind group is rebuilt
//! with them; they never shrink.

use std::sync::Arc;

use bytemuck::Zeroable;
use scene::{BackendError, FramePacket, FrameUniform, RenderBackend, RenderRecord, SceneLayout};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::error::RenderError;

/// A device and its queue, shared between the backend and whatever draws with it.
#[derive(Clone, Debug)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Requests a device without a surface.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoAdapter`] when no adapter is available, or the device request error.
    pub fn headless() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;
        info!(adapter = ?adapter.get_info().name, "using GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Scene Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))?;
        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}

const RECORD_SIZE: u64 = std::mem::size_of::<RenderRecord>() as u64;

fn storage_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size.max(RECORD_SIZE),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT | wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// GPU copies of the latest frame.
#[derive(Debug)]
pub struct SceneBuffers {
    pub frame_buffer: wgpu::Buffer,
    pub layout_buffer: wgpu::Buffer,
    pub records_buffer: wgpu::Buffer,
    pub slots_buffer: wgpu::Buffer,
    /// Claim-order records written by the last upload
    pub record_count: u32,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl SceneBuffers {
    /// Bindings: 0 camera block, 1 slot table, 2 claim-order records, 3 slot records.
    #[must_use]
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let storage = wgpu::BufferBindingType::Storage { read_only: true };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene bind layout"),
            entries: &[
                buffer_entry(0, wgpu::BufferBindingType::Uniform),
                buffer_entry(1, wgpu::BufferBindingType::Uniform),
                buffer_entry(2, storage),
                buffer_entry(3, storage),
            ],
        })
    }

    /// Sizes the storage buffers for `slot_capacity` records.
    #[must_use]
    pub fn new(device: &wgpu::Device, slot_capacity: usize) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Layout"),
            contents: bytemuck::bytes_of(&SceneLayout::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let size = RECORD_SIZE * slot_capacity as u64;
        let records_buffer = storage_buffer(device, "records", size);
        let slots_buffer = storage_buffer(device, "slots", size);
        let bind_group_layout = Self::bind_group_layout(device);
        let bind_group = Self::bind(
            device,
            &bind_group_layout,
            [&frame_buffer, &layout_buffer, &records_buffer, &slots_buffer],
        );
        Self {
            frame_buffer,
            layout_buffer,
            records_buffer,
            slots_buffer,
            record_count: 0,
            bind_group_layout,
            bind_group,
        }
    }

    fn bind(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, buffers: [&wgpu::Buffer; 4]) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
            .iter()
            .zip(0u32..)
            .map(|(buffer, binding)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout,
            entries: &entries,
        })
    }

    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Writes one frame, growing the storage buffers if needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, packet: &FramePacket<'_>) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&packet.camera));
        queue.write_buffer(&self.layout_buffer, 0, bytemuck::bytes_of(&packet.layout));

        let mut regrown = false;
        regrown |= write_records(device, queue, &mut self.records_buffer, "records", packet.records);
        regrown |= write_records(device, queue, &mut self.slots_buffer, "slots", packet.slots);
        if regrown {
            self.bind_group = Self::bind(
                device,
                &self.bind_group_layout,
                [&self.frame_buffer, &self.layout_buffer, &self.records_buffer, &self.slots_buffer],
            );
        }
        #[allow(clippy::cast_possible_truncation)]
        let count = packet.records.len() as u32;
        self.record_count = count;
    }
}

/// Returns whether `buffer` had to be replaced.
fn write_records(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &mut wgpu::Buffer,
    label: &str,
    records: &[RenderRecord],
) -> bool {
    if records.is_empty() {
        return false;
    }
    let bytes: &[u8] = bytemuck::cast_slice(records);
    if buffer.size() < bytes.len() as u64 {
        debug!(label, from = buffer.size(), to = bytes.len(), "growing storage buffer");
        *buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        true
    } else {
        queue.write_buffer(buffer, 0, bytes);
        false
    }
}

/// Uploads each frame to [`SceneBuffers`] and submits the queue on present.
#[derive(Debug)]
pub struct GpuBackend {
    context: GpuContext,
    buffers: SceneBuffers,
    frames: u64,
}

impl GpuBackend {
    #[must_use]
    pub fn new(context: GpuContext, slot_capacity: usize) -> Self {
        let buffers = SceneBuffers::new(&context.device, slot_capacity);
        Self {
            context,
            buffers,
            frames: 0,
        }
    }

    #[must_use]
    pub fn buffers(&self) -> &SceneBuffers {
        &self.buffers
    }

    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for GpuBackend {
    fn upload(&mut self, packet: &FramePacket<'_>) -> Result<(), BackendError> {
        self.buffers.write(&self.context.device, &self.context.queue, packet);
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        self.context.queue.submit(std::iter::empty());
        self.context.device.poll(wgpu::Maintain::Wait);
        self.frames += 1;
        Ok(())
    }
}
