//! Dummy backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but provides a valid
//! implementation for exercising the frame graph without GPU hardware.

use std::collections::HashSet;

use crate::backend::traits::{
    BackendResult, FramebufferHandle, RendererBackend, StorageBufferHandle,
};
use crate::backend::types::FramebufferSpec;

/// Dummy backend.
///
/// Hands out monotonically increasing handles and keeps a live set per
/// resource kind so tests can assert on allocation behavior.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_handle: u64,
    live_framebuffers: HashSet<FramebufferHandle>,
    live_storage_buffers: HashSet<StorageBufferHandle>,
    framebuffers_created: usize,
    storage_buffers_created: usize,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total framebuffers created over the backend's lifetime.
    pub fn framebuffers_created(&self) -> usize {
        self.framebuffers_created
    }

    /// Total storage buffers created over the backend's lifetime.
    pub fn storage_buffers_created(&self) -> usize {
        self.storage_buffers_created
    }

    /// Framebuffers currently alive (created and not destroyed).
    pub fn live_framebuffers(&self) -> usize {
        self.live_framebuffers.len()
    }

    /// Storage buffers currently alive (created and not destroyed).
    pub fn live_storage_buffers(&self) -> usize {
        self.live_storage_buffers.len()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RendererBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_framebuffer(&mut self, spec: &FramebufferSpec) -> BackendResult<FramebufferHandle> {
        log::trace!(
            "DummyBackend: creating framebuffer {}x{} ({:?}, {} samples)",
            spec.width,
            spec.height,
            spec.format,
            spec.samples
        );
        let handle = FramebufferHandle::new(self.next());
        self.live_framebuffers.insert(handle);
        self.framebuffers_created += 1;
        Ok(handle)
    }

    fn create_storage_buffer(&mut self, size: u64) -> BackendResult<StorageBufferHandle> {
        log::trace!("DummyBackend: creating storage buffer ({size} bytes)");
        let handle = StorageBufferHandle::new(self.next());
        self.live_storage_buffers.insert(handle);
        self.storage_buffers_created += 1;
        Ok(handle)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        log::trace!("DummyBackend: destroying framebuffer {framebuffer:?}");
        if !self.live_framebuffers.remove(&framebuffer) {
            log::warn!("DummyBackend: destroy of unknown framebuffer {framebuffer:?}");
        }
    }

    fn destroy_storage_buffer(&mut self, buffer: StorageBufferHandle) {
        log::trace!("DummyBackend: destroying storage buffer {buffer:?}");
        if !self.live_storage_buffers.remove(&buffer) {
            log::warn!("DummyBackend: destroy of unknown storage buffer {buffer:?}");
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::TextureFormat;

    #[test]
    fn test_handles_are_unique() {
        let mut backend = DummyBackend::new();
        let spec = FramebufferSpec::new(64, 64, TextureFormat::Rgba8Unorm);
        let a = backend.create_framebuffer(&spec).unwrap();
        let b = backend.create_framebuffer(&spec).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.framebuffers_created(), 2);
    }

    #[test]
    fn test_destroy_accounting() {
        let mut backend = DummyBackend::new();
        let spec = FramebufferSpec::new(64, 64, TextureFormat::Rgba8Unorm);
        let fb = backend.create_framebuffer(&spec).unwrap();
        let sb = backend.create_storage_buffer(1024).unwrap();
        assert_eq!(backend.live_framebuffers(), 1);
        assert_eq!(backend.live_storage_buffers(), 1);

        backend.destroy_framebuffer(fb);
        backend.destroy_storage_buffer(sb);
        assert_eq!(backend.live_framebuffers(), 0);
        assert_eq!(backend.live_storage_buffers(), 0);
        // Creation counters are cumulative
        assert_eq!(backend.framebuffers_created(), 1);
        assert_eq!(backend.storage_buffers_created(), 1);
    }
}
