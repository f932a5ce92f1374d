use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("frame {frame} uploaded while frame {pending} is still waiting to be presented")]
    UploadPending { frame: u64, pending: u64 },
    #[error("present called without an uploaded frame")]
    NothingToPresent,
    #[cfg(feature = "gpu")]
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[cfg(feature = "gpu")]
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}
