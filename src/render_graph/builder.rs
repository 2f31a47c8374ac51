//! Fluent construction of frame graphs.
//!
//! [`FrameGraphBuilder`] accumulates resource descriptors and pass
//! declarations; [`build`](FrameGraphBuilder::build) validates the
//! accumulated declarations and freezes them into a [`FrameGraph`].

use crate::backend::types::TextureFormat;
use crate::backend::{FramebufferHandle, TextureHandle};
use crate::render_graph::graph::FrameGraph;
use crate::render_graph::pass::{AccessMode, GraphPass, PassType, RenderPass};
use crate::render_graph::resource::{
    LogicalBufferSpec, Resource, ResourceContent, ResourceDescriptor, ResourceHandle,
    ResourceKind, ResourceLifetime, ResourceSpec, StorageBufferSpec, TextureSpec,
};
use crate::render_graph::{GraphError, GraphResult};

/// Accumulates resource and pass declarations prior to compilation.
///
/// Declaration order is significant: resource lifetimes and inferred
/// dependencies are computed over passes in the order they were added.
/// Resources may be declared at any point before [`build`](Self::build);
/// handles are stable and never reused within one builder.
#[derive(Default)]
pub struct FrameGraphBuilder {
    descriptors: Vec<ResourceDescriptor>,
    passes: Vec<GraphPass>,
}

impl FrameGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, desc: ResourceDescriptor) -> ResourceHandle {
        let handle = ResourceHandle::new(self.descriptors.len() as u32);
        self.descriptors.push(desc);
        handle
    }

    /// Declare a transient 2D texture.
    pub fn declare_texture_2d(
        &mut self,
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        mip_levels: u32,
        sample_count: u32,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::Texture2D,
            name: name.into(),
            lifetime: ResourceLifetime::Transient,
            spec: ResourceSpec::Texture(TextureSpec {
                width,
                height,
                depth: 1,
                format,
                mip_levels,
                sample_count,
            }),
            imported: ResourceContent::None,
        })
    }

    /// Declare a framebuffer with the given lifetime.
    pub fn declare_framebuffer(
        &mut self,
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        sample_count: u32,
        lifetime: ResourceLifetime,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::Framebuffer,
            name: name.into(),
            lifetime,
            spec: ResourceSpec::Texture(TextureSpec {
                width,
                height,
                format,
                sample_count,
                ..Default::default()
            }),
            imported: ResourceContent::None,
        })
    }

    /// Declare a storage buffer of `size` bytes with the given lifetime.
    pub fn declare_storage_buffer(
        &mut self,
        name: impl Into<String>,
        size: u64,
        lifetime: ResourceLifetime,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::StorageBuffer,
            name: name.into(),
            lifetime,
            spec: ResourceSpec::StorageBuffer(StorageBufferSpec { size }),
            imported: ResourceContent::None,
        })
    }

    /// Declare a transient logical buffer holding a `T`.
    ///
    /// The value is default-constructed during compilation and reachable
    /// from pass bodies through [`Resource::logical`].
    pub fn declare_logical_buffer<T: Default + 'static>(
        &mut self,
        name: impl Into<String>,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::LogicalBuffer,
            name: name.into(),
            lifetime: ResourceLifetime::Transient,
            spec: ResourceSpec::Logical(LogicalBufferSpec::of::<T>()),
            imported: ResourceContent::None,
        })
    }

    /// Import an externally owned framebuffer as a persistent resource.
    pub fn import_persistent_framebuffer(
        &mut self,
        name: impl Into<String>,
        framebuffer: FramebufferHandle,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::Framebuffer,
            name: name.into(),
            lifetime: ResourceLifetime::Persistent,
            spec: ResourceSpec::Texture(TextureSpec::default()),
            imported: ResourceContent::Framebuffer(framebuffer),
        })
    }

    /// Import an externally owned texture as a persistent resource.
    pub fn import_persistent_texture(
        &mut self,
        name: impl Into<String>,
        texture: TextureHandle,
    ) -> ResourceHandle {
        self.declare(ResourceDescriptor {
            kind: ResourceKind::Texture2D,
            name: name.into(),
            lifetime: ResourceLifetime::Persistent,
            spec: ResourceSpec::Texture(TextureSpec::default()),
            imported: ResourceContent::Texture(texture),
        })
    }

    /// Add a pass body to the graph.
    ///
    /// Returns a [`PassBuilder`] for recording the pass's resource
    /// accesses; call [`end`](PassBuilder::end) to return to the graph
    /// builder.
    pub fn add_pass<P: RenderPass + 'static>(
        &mut self,
        body: P,
        pass_type: PassType,
    ) -> PassBuilder<'_> {
        let index = self.passes.len();
        self.passes.push(GraphPass::new(Box::new(body), pass_type));
        PassBuilder {
            builder: self,
            index,
        }
    }

    /// Freeze the accumulated declarations into a [`FrameGraph`].
    ///
    /// Converts descriptors into runtime resources index-for-index and
    /// validates every recorded access against the declared resource
    /// count. Out-of-range handles are a programmer error and fail here
    /// rather than being silently ignored.
    pub fn build(self) -> GraphResult<FrameGraph> {
        for pass in &self.passes {
            for access in pass.accesses() {
                let index = access.resource.index();
                if index >= self.descriptors.len() {
                    return Err(GraphError::InvalidResourceIndex {
                        pass: pass.name().to_string(),
                        index: index as u32,
                        resource_count: self.descriptors.len(),
                    });
                }
            }
        }

        let resources: Vec<Resource> = self.descriptors.into_iter().map(Resource::new).collect();
        log::debug!(
            "Built frame graph: {} passes, {} resources",
            self.passes.len(),
            resources.len()
        );
        Ok(FrameGraph::new(resources, self.passes))
    }
}

/// Fluent sub-builder recording accesses against the just-added pass.
pub struct PassBuilder<'a> {
    builder: &'a mut FrameGraphBuilder,
    index: usize,
}

impl<'a> PassBuilder<'a> {
    /// The handle of the pass being configured.
    pub fn handle(&self) -> crate::render_graph::pass::PassHandle {
        crate::render_graph::pass::PassHandle::new(self.index as u32)
    }

    /// Record a read access.
    pub fn read(self, resource: ResourceHandle) -> Self {
        self.builder.passes[self.index].record_access(resource, AccessMode::Read);
        self
    }

    /// Record a write access.
    pub fn write(self, resource: ResourceHandle) -> Self {
        self.builder.passes[self.index].record_access(resource, AccessMode::Write);
        self
    }

    /// Record a read-write access.
    pub fn read_write(self, resource: ResourceHandle) -> Self {
        self.builder.passes[self.index].record_access(resource, AccessMode::ReadWrite);
        self
    }

    /// Impose a manual ordering constraint on the named pass.
    pub fn depends_on(self, name: impl Into<String>) -> Self {
        self.builder.passes[self.index].add_dependency(name);
        self
    }

    /// Finish configuring this pass and return to the graph builder.
    pub fn end(self) -> &'a mut FrameGraphBuilder {
        self.builder
    }
}
