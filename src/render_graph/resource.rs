//! Resource declarations and their runtime state.
//!
//! Resources are declared up front through the builder and addressed by
//! [`ResourceHandle`] afterwards. A declaration is an immutable
//! [`ResourceDescriptor`]; the graph turns each descriptor into a runtime
//! [`Resource`] that carries the lifetime markers, alias group and content
//! binding produced by compilation.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{FramebufferHandle, StorageBufferHandle, TextureHandle};
use crate::backend::types::TextureFormat;
use crate::render_graph::{GraphError, GraphResult};

/// Unique identifier for a frame graph resource.
///
/// `ResourceHandle` is `Copy` and cheap to pass around. It is only valid
/// within the builder/graph that created it; handles are never reused
/// within one builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub(crate) u32);

impl ResourceHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Resource kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture2D,
    Texture3D,
    Framebuffer,
    StorageBuffer,
    DepthStencil,
    LogicalBuffer,
}

/// Whether a resource lives inside one frame or outlives the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLifetime {
    /// Exists only between its first write and last read within one frame;
    /// eligible for aliasing.
    Transient,
    /// Externally owned and imported (e.g. the swapchain framebuffer).
    Persistent,
}

/// Image spec shared by texture and framebuffer declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSpec {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
    pub sample_count: u32,
}

impl Default for TextureSpec {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            depth: 1,
            format: TextureFormat::Rgba8Unorm,
            mip_levels: 1,
            sample_count: 1,
        }
    }
}

/// Byte-sized spec for storage buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageBufferSpec {
    pub size: u64,
}

/// Spec for a logical (CPU-side, typed) buffer.
///
/// A logical buffer is an opaque value the graph constructs during
/// materialization and hands to passes through a typed accessor. It is the
/// escape hatch for CPU-side per-frame scratch data such as a mesh-batching
/// collector. Construction is deferred to compile time; destruction is the
/// value's own `Drop`.
pub struct LogicalBufferSpec {
    pub size_hint: usize,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) construct: Box<dyn Fn() -> Rc<dyn Any>>,
}

impl LogicalBufferSpec {
    /// Spec for a logical buffer holding a `T`, default-constructed at
    /// materialization time.
    pub fn of<T: Default + 'static>() -> Self {
        Self {
            size_hint: std::mem::size_of::<T>(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            construct: Box::new(|| Rc::new(RefCell::new(T::default())) as Rc<dyn Any>),
        }
    }
}

impl std::fmt::Debug for LogicalBufferSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalBufferSpec")
            .field("size_hint", &self.size_hint)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Kind-specific spec payload of a declaration
#[derive(Debug)]
pub enum ResourceSpec {
    Texture(TextureSpec),
    StorageBuffer(StorageBufferSpec),
    Logical(LogicalBufferSpec),
}

/// Immutable declaration of a resource.
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub name: String,
    pub lifetime: ResourceLifetime,
    pub spec: ResourceSpec,
    /// Externally supplied content for persistent/imported resources.
    pub imported: ResourceContent,
}

/// What a resource is bound to at execution time.
///
/// Bound by the compiler during transient materialization, or pre-bound
/// from the descriptor for imported resources. Passes never see an empty
/// binding: the typed accessors on [`Resource`] fail loudly instead.
#[derive(Clone, Default)]
pub enum ResourceContent {
    #[default]
    None,
    Framebuffer(FramebufferHandle),
    StorageBuffer(StorageBufferHandle),
    Texture(TextureHandle),
    Logical(Rc<dyn Any>),
}

impl ResourceContent {
    pub fn is_bound(&self) -> bool {
        !matches!(self, ResourceContent::None)
    }
}

impl std::fmt::Debug for ResourceContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Framebuffer(h) => f.debug_tuple("Framebuffer").field(h).finish(),
            Self::StorageBuffer(h) => f.debug_tuple("StorageBuffer").field(h).finish(),
            Self::Texture(h) => f.debug_tuple("Texture").field(h).finish(),
            Self::Logical(_) => write!(f, "Logical(..)"),
        }
    }
}

/// Runtime state of a declared resource, index-addressed by
/// [`ResourceHandle`].
///
/// Lifetime markers index into the pass array in declaration order and stay
/// `-1` until the corresponding access is observed during compilation.
#[derive(Debug)]
pub struct Resource {
    pub(crate) desc: ResourceDescriptor,
    pub(crate) first_write_pass: i32,
    pub(crate) last_read_pass: i32,
    pub(crate) is_written: bool,
    pub(crate) is_read: bool,
    pub(crate) alias_group: i32,
    pub(crate) content: ResourceContent,
}

impl Resource {
    pub(crate) fn new(desc: ResourceDescriptor) -> Self {
        let content = desc.imported.clone();
        Self {
            desc,
            first_write_pass: -1,
            last_read_pass: -1,
            is_written: false,
            is_read: false,
            alias_group: -1,
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.desc.kind
    }

    pub fn lifetime(&self) -> ResourceLifetime {
        self.desc.lifetime
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.desc.spec
    }

    pub fn is_transient(&self) -> bool {
        self.desc.lifetime == ResourceLifetime::Transient
    }

    pub fn is_persistent(&self) -> bool {
        self.desc.lifetime == ResourceLifetime::Persistent
    }

    /// Declaration index of the first pass writing this resource, `-1` if
    /// never written.
    pub fn first_write_pass(&self) -> i32 {
        self.first_write_pass
    }

    /// Declaration index of the last pass reading this resource, `-1` if
    /// never read.
    pub fn last_read_pass(&self) -> i32 {
        self.last_read_pass
    }

    pub fn is_written(&self) -> bool {
        self.is_written
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// Alias group id assigned during compilation, `-1` if unassigned.
    pub fn alias_group(&self) -> i32 {
        self.alias_group
    }

    pub fn is_bound(&self) -> bool {
        self.content.is_bound()
    }

    /// The framebuffer this resource is bound to.
    pub fn framebuffer(&self) -> GraphResult<FramebufferHandle> {
        match &self.content {
            ResourceContent::Framebuffer(handle) => Ok(*handle),
            ResourceContent::None => Err(self.not_bound()),
            _ => Err(self.kind_mismatch("framebuffer")),
        }
    }

    /// The storage buffer this resource is bound to.
    pub fn storage_buffer(&self) -> GraphResult<StorageBufferHandle> {
        match &self.content {
            ResourceContent::StorageBuffer(handle) => Ok(*handle),
            ResourceContent::None => Err(self.not_bound()),
            _ => Err(self.kind_mismatch("storage buffer")),
        }
    }

    /// The texture this resource is bound to.
    pub fn texture(&self) -> GraphResult<TextureHandle> {
        match &self.content {
            ResourceContent::Texture(handle) => Ok(*handle),
            ResourceContent::None => Err(self.not_bound()),
            _ => Err(self.kind_mismatch("texture")),
        }
    }

    /// Typed access to a logical buffer's shared cell.
    ///
    /// Pass bodies clone the returned `Rc` in `setup` and borrow it during
    /// execution; the graph keeps the value alive until teardown.
    pub fn logical<T: 'static>(&self) -> GraphResult<Rc<RefCell<T>>> {
        match &self.content {
            ResourceContent::Logical(any) => Rc::clone(any)
                .downcast::<RefCell<T>>()
                .map_err(|_| self.kind_mismatch("logical buffer of the requested type")),
            ResourceContent::None => Err(self.not_bound()),
            _ => Err(self.kind_mismatch("logical buffer")),
        }
    }

    fn not_bound(&self) -> GraphError {
        GraphError::ResourceNotBound {
            name: self.desc.name.clone(),
        }
    }

    fn kind_mismatch(&self, expected: &'static str) -> GraphError {
        GraphError::ContentKindMismatch {
            name: self.desc.name.clone(),
            expected,
        }
    }
}
