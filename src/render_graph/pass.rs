//! Pass bodies and their graph-side wrapper.
//!
//! A pass body implements [`RenderPass`], a fixed five-hook lifecycle. The
//! graph wraps every body in a [`GraphPass`] that records the declared
//! resource accesses and the scheduling state computed at compile time.

use crate::render_graph::resource::{Resource, ResourceHandle};
use crate::render_graph::GraphResult;
use crate::target::RenderTarget;

/// Unique identifier for a pass in the graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassHandle(pub(crate) u32);

impl PassHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type of pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    Graphics,
    Compute,
    Transfer,
}

/// How a pass accesses a declared resource.
///
/// The mode determines dependency-edge direction and lifetime marking: a
/// `Write` makes the pass a producer, a `Read` makes it a consumer,
/// `ReadWrite` both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    pub fn is_read(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// One recorded resource access of a pass.
///
/// Accesses are kept in declaration order and are not deduplicated; later
/// accesses compound.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAccess {
    pub resource: ResourceHandle,
    pub mode: AccessMode,
}

/// Lifecycle contract implemented by every concrete pass body.
///
/// The graph drives the lifecycle; bodies never call each other. `setup`
/// runs once after compilation and receives references to exactly the
/// [`Resource`] entries the pass declared, in access-declaration order.
/// Bodies copy out the handles (or clone the logical-buffer cells) they
/// need, since the references do not outlive the call. The three per-frame
/// hooks run once per `execute` in `begin` → `execute` → `end` order and
/// are skipped entirely while the pass is culled or disabled. `cleanup`
/// runs once at graph teardown.
pub trait RenderPass {
    /// Pass name, used for diagnostics and manual dependency resolution.
    fn name(&self) -> &str;

    /// Bind to the resources this pass declared access to.
    fn setup(&mut self, target: &mut RenderTarget, resources: &[&Resource]) -> GraphResult<()>;

    /// Per-frame: prepare state before `execute`.
    fn begin(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()>;

    /// Per-frame: perform the pass's work.
    fn execute(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()>;

    /// Per-frame: restore state after `execute`.
    fn end(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()>;

    /// Called once at graph teardown.
    fn cleanup(&mut self);

    /// Scheduling tie-break among simultaneously ready passes; higher
    /// sorts earlier.
    fn priority(&self) -> i32 {
        -1
    }

    /// Names of passes this body must run after, independent of resource
    /// contention. Resolved against pass names at compile time.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Graph-side wrapper around a pass body.
///
/// Records the declared accesses and carries the state the compiler
/// produces: computed dependency indices (rebuilt each compile), the culled
/// flag, and the execution index. The `enabled` flag is a runtime toggle
/// independent of culling.
pub struct GraphPass {
    pub(crate) body: Box<dyn RenderPass>,
    pass_type: PassType,
    accesses: Vec<ResourceAccess>,
    manual_dependencies: Vec<String>,
    pub(crate) computed_dependencies: Vec<u32>,
    pub(crate) execution_index: u32,
    pub(crate) culled: bool,
    enabled: bool,
}

impl GraphPass {
    pub(crate) fn new(body: Box<dyn RenderPass>, pass_type: PassType) -> Self {
        Self {
            body,
            pass_type,
            accesses: Vec::new(),
            manual_dependencies: Vec::new(),
            computed_dependencies: Vec::new(),
            execution_index: 0,
            culled: false,
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        self.body.name()
    }

    pub fn pass_type(&self) -> PassType {
        self.pass_type
    }

    pub fn priority(&self) -> i32 {
        self.body.priority()
    }

    pub fn accesses(&self) -> &[ResourceAccess] {
        &self.accesses
    }

    /// Indices of earlier passes this pass depends on, as computed by the
    /// last compile.
    pub fn computed_dependencies(&self) -> &[u32] {
        &self.computed_dependencies
    }

    pub fn execution_index(&self) -> u32 {
        self.execution_index
    }

    pub fn is_culled(&self) -> bool {
        self.culled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Add a manual ordering constraint on the pass with the given name.
    ///
    /// Used when ordering must be enforced without resource contention,
    /// e.g. for a side-effecting pass. Self-references are ignored.
    pub fn add_dependency(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.body.name() {
            self.manual_dependencies.push(name);
        }
    }

    /// Manual dependency names: those added on the wrapper plus those the
    /// body itself declares.
    pub(crate) fn manual_dependencies(&self) -> Vec<String> {
        let mut names = self.manual_dependencies.clone();
        names.extend(self.body.dependencies());
        names
    }

    pub(crate) fn record_access(&mut self, resource: ResourceHandle, mode: AccessMode) {
        self.accesses.push(ResourceAccess { resource, mode });
    }

    pub(crate) fn clear_computed_dependencies(&mut self) {
        self.computed_dependencies.clear();
    }

    pub(crate) fn add_computed_dependency(&mut self, pass_index: u32) {
        if !self.computed_dependencies.contains(&pass_index) {
            self.computed_dependencies.push(pass_index);
        }
    }

    pub(crate) fn setup(
        &mut self,
        target: &mut RenderTarget,
        resources: &[&Resource],
    ) -> GraphResult<()> {
        self.body.setup(target, resources)
    }

    pub(crate) fn begin(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()> {
        if self.culled || !self.enabled {
            return Ok(());
        }
        self.body.begin(target, dt)
    }

    pub(crate) fn execute(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()> {
        if self.culled || !self.enabled {
            return Ok(());
        }
        self.body.execute(target, dt)
    }

    pub(crate) fn end(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()> {
        if self.culled || !self.enabled {
            return Ok(());
        }
        self.body.end(target, dt)
    }

    pub(crate) fn cleanup(&mut self) {
        self.body.cleanup();
    }
}

impl std::fmt::Debug for GraphPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphPass")
            .field("name", &self.body.name())
            .field("pass_type", &self.pass_type)
            .field("accesses", &self.accesses.len())
            .field("culled", &self.culled)
            .field("enabled", &self.enabled)
            .finish()
    }
}
