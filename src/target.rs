//! Render target context.
//!
//! [`RenderTarget`] is the explicit context object threaded through graph
//! compilation and execution. It owns the rendering backend and, optionally,
//! the default (swapchain-backed) framebuffer a frame presents into. Pass
//! bodies receive it in every lifecycle hook instead of reaching for
//! ambient globals.

use crate::backend::{FramebufferHandle, RendererBackend};

/// Owns the rendering backend for one output target.
pub struct RenderTarget {
    backend: Box<dyn RendererBackend>,
    default_framebuffer: Option<FramebufferHandle>,
}

impl RenderTarget {
    /// Create a render target around a backend.
    pub fn new(backend: Box<dyn RendererBackend>) -> Self {
        log::info!("Render target using backend: {}", backend.name());
        Self {
            backend,
            default_framebuffer: None,
        }
    }

    /// Attach the default framebuffer handle (e.g. the swapchain image).
    ///
    /// Clients import this into a graph via
    /// [`import_persistent_framebuffer`](crate::render_graph::FrameGraphBuilder::import_persistent_framebuffer).
    pub fn with_default_framebuffer(mut self, framebuffer: FramebufferHandle) -> Self {
        self.default_framebuffer = Some(framebuffer);
        self
    }

    /// The default framebuffer, if one was attached.
    pub fn default_framebuffer(&self) -> Option<FramebufferHandle> {
        self.default_framebuffer
    }

    pub fn backend(&self) -> &dyn RendererBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn RendererBackend {
        self.backend.as_mut()
    }

    /// Get the backend as its concrete type.
    pub fn backend_as<B: RendererBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }

    /// Get the backend as its concrete type, mutably.
    pub fn backend_as_mut<B: RendererBackend + 'static>(&mut self) -> Option<&mut B> {
        self.backend.as_any_mut().downcast_mut::<B>()
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("backend", &self.backend.name())
            .field("default_framebuffer", &self.default_framebuffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    #[test]
    fn test_default_framebuffer() {
        let target = RenderTarget::new(Box::new(DummyBackend::new()));
        assert!(target.default_framebuffer().is_none());

        let fb = FramebufferHandle::new(7);
        let target = target.with_default_framebuffer(fb);
        assert_eq!(target.default_framebuffer(), Some(fb));
        assert_eq!(target.backend().name(), "Dummy");
    }
}
