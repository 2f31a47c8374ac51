//! Core backend abstraction traits
//!
//! These traits define the interface a rendering backend must implement for
//! the frame graph to materialize transient resources through it.

use crate::backend::types::FramebufferSpec;
use std::any::Any;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create framebuffer: {0}")]
    FramebufferCreationFailed(String),
    #[error("Failed to create storage buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a backend framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(u64);

impl FramebufferHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a backend storage buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageBufferHandle(u64);

impl StorageBufferHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a backend texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Resource factory trait implemented by rendering backends.
///
/// The frame graph calls the `create_*` factories while materializing
/// transient resources and the matching `destroy_*` methods when the graph
/// releases them (recompile or teardown). Everything else a backend can do
/// (draw submission, shader binding, uploads) happens inside pass bodies and
/// is of no concern to the graph.
pub trait RendererBackend {
    /// Backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Create a framebuffer matching the given spec
    fn create_framebuffer(&mut self, spec: &FramebufferSpec) -> BackendResult<FramebufferHandle>;

    /// Create a storage buffer of `size` bytes
    fn create_storage_buffer(&mut self, size: u64) -> BackendResult<StorageBufferHandle>;

    /// Destroy a framebuffer previously created by this backend
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Destroy a storage buffer previously created by this backend
    fn destroy_storage_buffer(&mut self, buffer: StorageBufferHandle);

    /// Allow downcasting to the concrete backend
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
