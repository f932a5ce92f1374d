//! A backend that keeps frames in memory instead of sending them to a device.
//!
//! Used by the runtime when no GPU is requested and by tests that want to look at
//! exactly what a renderer would have received.

use std::collections::VecDeque;

use glam::Vec3;
use scene::{BackendError, FramePacket, FrameTime, FrameUniform, RenderBackend, RenderRecord, SceneLayout};
use tracing::{debug, trace};

use crate::error::RenderError;

/// An owned copy of one uploaded frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    pub time: FrameTime,
    pub camera: FrameUniform,
    pub records: Vec<RenderRecord>,
    pub slots: Vec<RenderRecord>,
    pub layout: SceneLayout,
}

impl CapturedFrame {
    fn from_packet(packet: &FramePacket<'_>) -> Self {
        Self {
            time: packet.time,
            camera: packet.camera,
            records: packet.records.to_vec(),
            slots: packet.slots.to_vec(),
            layout: packet.layout,
        }
    }

    #[must_use]
    pub fn camera_position(&self) -> Vec3 {
        Vec3::from_slice(&self.camera.position_aspect[..3])
    }

    /// Bytes a device upload of this frame would write.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        bytemuck::cast_slice::<_, u8>(&self.records).len()
            + bytemuck::cast_slice::<_, u8>(&self.slots).len()
            + std::mem::size_of::<FrameUniform>()
            + std::mem::size_of::<SceneLayout>()
    }
}

/// Keeps the last `retain` presented frames.
#[derive(Debug)]
pub struct HeadlessBackend {
    retain: usize,
    pending: Option<CapturedFrame>,
    presented: VecDeque<CapturedFrame>,
    uploads: u64,
    presents: u64,
    bytes_uploaded: u64,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(1)
    }
}

impl HeadlessBackend {
    /// `retain` is clamped to at least one frame.
    #[must_use]
    pub fn new(retain: usize) -> Self {
        let retain = retain.max(1);
        Self {
            retain,
            pending: None,
            presented: VecDeque::with_capacity(retain),
            uploads: 0,
            presents: 0,
            bytes_uploaded: 0,
        }
    }

    /// Most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&CapturedFrame> {
        self.presented.back()
    }

    /// Retained frames, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &CapturedFrame> {
        self.presented.iter()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&CapturedFrame> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    #[must_use]
    pub fn presents(&self) -> u64 {
        self.presents
    }

    #[must_use]
    pub fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }

    fn accept(&mut self, packet: &FramePacket<'_>) -> Result<(), RenderError> {
        if let Some(pending) = &self.pending {
            return Err(RenderError::UploadPending {
                frame: packet.time.frame,
                pending: pending.time.frame,
            });
        }
        let frame = CapturedFrame::from_packet(packet);
        self.bytes_uploaded += frame.byte_len() as u64;
        self.uploads += 1;
        trace!(
            frame = frame.time.frame,
            records = frame.records.len(),
            slots = frame.slots.len(),
            "captured frame"
        );
        self.pending = Some(frame);
        Ok(())
    }

    fn flip(&mut self) -> Result<(), RenderError> {
        let frame = self.pending.take().ok_or(RenderError::NothingToPresent)?;
        if self.presented.len() == self.retain {
            self.presented.pop_front();
        }
        self.presented.push_back(frame);
        self.presents += 1;
        if self.presents % 600 == 0 {
            debug!(presents = self.presents, bytes = self.bytes_uploaded, "headless backend");
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload(&mut self, packet: &FramePacket<'_>) -> Result<(), BackendError> {
        Ok(self.accept(packet)?)
    }

    fn present(&mut self) -> Result<(), BackendError> {
        Ok(self.flip()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;
    use scene::Camera;

    fn packet<'a>(frame: u64, records: &'a [RenderRecord]) -> FramePacket<'a> {
        FramePacket {
            time: FrameTime {
                frame,
                ..FrameTime::default()
            },
            camera: scene::encode_frame(&Camera::default(), 0.0),
            records,
            slots: records,
            layout: SceneLayout::default(),
        }
    }

    #[test]
    fn keeps_only_the_newest_frames() {
        let mut backend = HeadlessBackend::new(2);
        for frame in 0..5 {
            backend.upload(&packet(frame, &[])).unwrap();
            backend.present().unwrap();
        }
        let kept: Vec<u64> = backend.frames().map(|f| f.time.frame).collect();
        assert_eq!(kept, vec![3, 4]);
        assert_eq!(backend.presents(), 5);
        assert_eq!(backend.uploads(), 5);
    }

    #[test]
    fn upload_and_present_must_alternate() {
        let mut backend = HeadlessBackend::default();
        assert!(backend.present().is_err());

        backend.upload(&packet(0, &[])).unwrap();
        let err = backend.upload(&packet(1, &[])).unwrap_err();
        assert_eq!(err.to_string(), RenderError::UploadPending { frame: 1, pending: 0 }.to_string());
        assert_eq!(backend.pending().unwrap().time.frame, 0);
        assert!(backend.last_frame().is_none());
    }

    #[test]
    fn counts_uploaded_bytes() {
        let mut backend = HeadlessBackend::default();
        let records = [RenderRecord::zeroed(); 3];
        backend.upload(&packet(0, &records)).unwrap();
        let expected = 2 * 3 * RenderRecord::FLOATS * 4
            + std::mem::size_of::<FrameUniform>()
            + std::mem::size_of::<SceneLayout>();
        assert_eq!(backend.bytes_uploaded(), expected as u64);
    }
}
