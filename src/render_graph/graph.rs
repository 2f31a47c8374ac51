//! Graph compilation and per-frame execution.
//!
//! [`FrameGraph`] owns the declared resources and wrapped passes produced
//! by the builder. `compile` runs the staged pipeline (lifetime
//! computation, dependency inference, topological sort, culling, aliasing,
//! transient materialization, pass setup) once per topology; `execute`
//! replays the resulting fixed order every frame.

use std::collections::{BinaryHeap, HashMap};

use crate::backend::types::FramebufferSpec;
use crate::backend::{FramebufferHandle, StorageBufferHandle};
use crate::render_graph::pass::{GraphPass, PassHandle};
use crate::render_graph::resource::{
    Resource, ResourceContent, ResourceHandle, ResourceKind, ResourceSpec,
};
use crate::render_graph::{GraphError, GraphResult};
use crate::target::RenderTarget;

/// Entry in the topological sort's ready queue. Ordered so that the heap
/// pops the highest priority first and breaks ties by declaration index,
/// keeping the schedule deterministic for a fixed priority assignment.
#[derive(PartialEq, Eq)]
struct ReadyPass {
    priority: i32,
    index: u32,
}

impl Ord for ReadyPass {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for ReadyPass {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A compiled, executable frame graph.
///
/// Built once by [`FrameGraphBuilder`](crate::render_graph::FrameGraphBuilder)
/// with a frozen topology, compiled once (or again after the same topology
/// is re-targeted), then executed once per frame. The graph owns every
/// transient backing it materializes; call [`cleanup`](Self::cleanup)
/// before dropping so those can be returned to the backend.
pub struct FrameGraph {
    resources: Vec<Resource>,
    passes: Vec<GraphPass>,
    execution_order: Vec<PassHandle>,
    transient_framebuffers: Vec<FramebufferHandle>,
    transient_storage_buffers: Vec<StorageBufferHandle>,
    compiled: bool,
    cleaned_up: bool,
}

impl FrameGraph {
    pub(crate) fn new(resources: Vec<Resource>, passes: Vec<GraphPass>) -> Self {
        Self {
            resources,
            passes,
            execution_order: Vec::new(),
            transient_framebuffers: Vec::new(),
            transient_storage_buffers: Vec::new(),
            compiled: false,
            cleaned_up: false,
        }
    }

    /// Compile the graph against a render target.
    ///
    /// Runs the full pipeline over the declared passes and resources and
    /// leaves the graph ready for [`execute`](Self::execute). Compiling an
    /// already-compiled graph first releases the previously materialized
    /// transients and produces an identical schedule for an unchanged
    /// topology.
    pub fn compile(&mut self, target: &mut RenderTarget) -> GraphResult<()> {
        log::info!(
            "Compiling frame graph ({} passes, {} resources)",
            self.passes.len(),
            self.resources.len()
        );
        self.compiled = false;
        self.release_transients(target);
        for pass in &mut self.passes {
            pass.culled = false;
            pass.execution_index = 0;
        }

        self.compute_resource_lifetimes();
        self.infer_dependencies()?;
        self.topological_sort()?;
        self.cull_passes();
        self.alias_resources();
        self.create_transient_resources(target)?;
        self.setup_passes(target)?;

        self.compiled = true;
        log::info!("Frame graph compilation complete");
        Ok(())
    }

    /// Execute one frame: every non-culled, enabled pass runs
    /// `begin`/`execute`/`end` in the compiled order.
    pub fn execute(&mut self, target: &mut RenderTarget, dt: f64) -> GraphResult<()> {
        if !self.compiled {
            return Err(GraphError::NotCompiled);
        }

        for position in 0..self.execution_order.len() {
            let index = self.execution_order[position].index();
            let pass = &mut self.passes[index];
            if pass.is_culled() || !pass.is_enabled() {
                continue;
            }
            if let Err(e) = pass.begin(target, dt) {
                return Err(Self::pass_failed(pass, e));
            }
            if let Err(e) = pass.execute(target, dt) {
                return Err(Self::pass_failed(pass, e));
            }
            if let Err(e) = pass.end(target, dt) {
                return Err(Self::pass_failed(pass, e));
            }
        }
        Ok(())
    }

    /// Tear the graph down: run every pass's `cleanup` hook and release
    /// all owned transient backings through the backend.
    pub fn cleanup(&mut self, target: &mut RenderTarget) {
        if self.cleaned_up {
            return;
        }
        log::debug!("Cleaning up frame graph");
        for pass in &mut self.passes {
            pass.cleanup();
        }
        self.release_transients(target);
        self.compiled = false;
        self.cleaned_up = true;
    }

    // ------------------------------------------------------------------
    // Compilation stages
    // ------------------------------------------------------------------

    /// Stage 1: derive each resource's `[first_write, last_read]` window
    /// from the accesses, in pass declaration order.
    fn compute_resource_lifetimes(&mut self) {
        for resource in &mut self.resources {
            resource.first_write_pass = -1;
            resource.last_read_pass = -1;
            resource.is_written = false;
            resource.is_read = false;
        }

        for (pass_index, pass) in self.passes.iter().enumerate() {
            for access in pass.accesses() {
                let resource = &mut self.resources[access.resource.index()];
                if access.mode.is_write() && !resource.is_written {
                    resource.first_write_pass = pass_index as i32;
                    resource.is_written = true;
                }
                if access.mode.is_read() {
                    resource.last_read_pass = pass_index as i32;
                    resource.is_read = true;
                }
            }
        }

        log::debug!("Resource lifetimes computed");
    }

    /// Stage 2: rebuild computed dependencies from resource accesses and
    /// manual constraints.
    ///
    /// Every earlier writer of a resource a pass reads becomes a
    /// dependency, not just the nearest one. The redundant transitive
    /// edges are deliberate: they keep the ready-queue tie-breaking stable
    /// against edge-minimization changes.
    fn infer_dependencies(&mut self) -> GraphResult<()> {
        for pass in &mut self.passes {
            pass.clear_computed_dependencies();
        }

        for later in 0..self.passes.len() {
            let mut edges: Vec<u32> = Vec::new();

            for access in self.passes[later].accesses() {
                if !access.mode.is_read() {
                    continue;
                }
                for earlier in 0..later {
                    let writes = self.passes[earlier]
                        .accesses()
                        .iter()
                        .any(|a| a.resource == access.resource && a.mode.is_write());
                    if writes {
                        edges.push(earlier as u32);
                    }
                }
            }

            for name in self.passes[later].manual_dependencies() {
                match self.passes.iter().position(|p| p.name() == name) {
                    Some(index) if index != later => edges.push(index as u32),
                    Some(_) => {}
                    None => {
                        return Err(GraphError::UnknownPassDependency {
                            pass: self.passes[later].name().to_string(),
                            dependency: name,
                        })
                    }
                }
            }

            for edge in edges {
                self.passes[later].add_computed_dependency(edge);
            }
        }

        log::debug!("Dependencies inferred");
        Ok(())
    }

    /// Stage 3: Kahn's algorithm over the computed dependencies, with a
    /// priority-ordered ready queue. A short order means a cycle; the
    /// stale order is discarded and compilation fails.
    fn topological_sort(&mut self) -> GraphResult<()> {
        let num_passes = self.passes.len();
        let mut in_degree = vec![0u32; num_passes];
        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); num_passes];

        for (index, pass) in self.passes.iter().enumerate() {
            for &dep in pass.computed_dependencies() {
                adjacency[dep as usize].push(index as u32);
                in_degree[index] += 1;
            }
        }

        let mut ready = BinaryHeap::new();
        for (index, &degree) in in_degree.iter().enumerate() {
            if degree == 0 {
                ready.push(ReadyPass {
                    priority: self.passes[index].priority(),
                    index: index as u32,
                });
            }
        }

        self.execution_order.clear();
        while let Some(ReadyPass { index, .. }) = ready.pop() {
            self.passes[index as usize].execution_index = self.execution_order.len() as u32;
            self.execution_order.push(PassHandle::new(index));

            for &dependent in &adjacency[index as usize] {
                in_degree[dependent as usize] -= 1;
                if in_degree[dependent as usize] == 0 {
                    ready.push(ReadyPass {
                        priority: self.passes[dependent as usize].priority(),
                        index: dependent,
                    });
                }
            }
        }

        if self.execution_order.len() != num_passes {
            let sorted = self.execution_order.len();
            self.execution_order.clear();
            log::error!(
                "Frame graph contains a dependency cycle ({sorted} of {num_passes} passes ordered)"
            );
            return Err(GraphError::CyclicDependency {
                sorted,
                total: num_passes,
            });
        }

        log::debug!("Topological sort complete");
        Ok(())
    }

    /// A transient resource is used only while some non-culled pass still
    /// reads it; persistent resources are always used.
    fn compute_used_resources(&self) -> Vec<bool> {
        let mut used = vec![true; self.resources.len()];
        for (index, resource) in self.resources.iter().enumerate() {
            if !(resource.is_transient() && resource.is_written) {
                continue;
            }
            let has_live_reader = self.passes.iter().any(|pass| {
                !pass.is_culled()
                    && pass
                        .accesses()
                        .iter()
                        .any(|a| a.resource.index() == index && a.mode.is_read())
            });
            if !has_live_reader {
                used[index] = false;
            }
        }
        used
    }

    /// Stage 4: cull passes to a fixed point. A pass survives if it writes
    /// a used resource or a non-culled pass depends on it. The used set is
    /// re-derived after every cull, so removing a sole reader kills the
    /// upstream writer on a later sweep.
    fn cull_passes(&mut self) {
        let mut used = self.compute_used_resources();
        let mut changed = true;
        while changed {
            changed = false;

            for position in 0..self.execution_order.len() {
                let pass_index = self.execution_order[position].index();
                if self.passes[pass_index].is_culled() {
                    continue;
                }

                let mut keep = self.passes[pass_index]
                    .accesses()
                    .iter()
                    .any(|a| a.mode.is_write() && used[a.resource.index()]);

                if !keep {
                    keep = self.passes.iter().enumerate().any(|(other_index, other)| {
                        other_index != pass_index
                            && !other.is_culled()
                            && other
                                .computed_dependencies()
                                .contains(&(pass_index as u32))
                    });
                }

                if !keep {
                    log::debug!("Culling pass '{}'", self.passes[pass_index].name());
                    self.passes[pass_index].culled = true;
                    used = self.compute_used_resources();
                    changed = true;
                }
            }
        }
    }

    /// Stage 5: greedy first-fit aliasing of transient resources with
    /// compatible specs and disjoint lifetime windows.
    fn alias_resources(&mut self) {
        for resource in &mut self.resources {
            resource.alias_group = -1;
        }

        let mut transient: Vec<usize> = (0..self.resources.len())
            .filter(|&i| self.resources[i].is_transient())
            .collect();
        transient.sort_by_key(|&i| self.resources[i].first_write_pass);

        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &index in &transient {
            let mut joined = None;
            'candidates: for (group_id, members) in groups.iter().enumerate() {
                for &member in members {
                    let (resource, other) = (&self.resources[index], &self.resources[member]);
                    if !Self::resources_compatible(resource, other)
                        || Self::lifetimes_overlap(resource, other)
                    {
                        continue 'candidates;
                    }
                }
                joined = Some(group_id);
                break;
            }

            match joined {
                Some(group_id) => {
                    self.resources[index].alias_group = group_id as i32;
                    groups[group_id].push(index);
                }
                None => {
                    self.resources[index].alias_group = groups.len() as i32;
                    groups.push(vec![index]);
                }
            }
        }

        log::debug!(
            "Resource aliasing complete: {} transient resources in {} groups",
            transient.len(),
            groups.len()
        );
    }

    /// Closed-interval overlap test on `[first_write, last_read]`.
    fn lifetimes_overlap(a: &Resource, b: &Resource) -> bool {
        if a.last_read_pass < b.first_write_pass {
            return false;
        }
        if b.last_read_pass < a.first_write_pass {
            return false;
        }
        true
    }

    /// Two resources may share a backing only when the backing is
    /// interchangeable: same kind and matching shape. Volume textures and
    /// depth-stencil targets never alias.
    fn resources_compatible(a: &Resource, b: &Resource) -> bool {
        if a.desc.kind != b.desc.kind {
            return false;
        }

        match (&a.desc.spec, &b.desc.spec) {
            (ResourceSpec::Texture(sa), ResourceSpec::Texture(sb))
                if matches!(a.desc.kind, ResourceKind::Framebuffer | ResourceKind::Texture2D) =>
            {
                sa.width == sb.width
                    && sa.height == sb.height
                    && sa.format == sb.format
                    && sa.sample_count == sb.sample_count
            }
            (ResourceSpec::StorageBuffer(sa), ResourceSpec::StorageBuffer(sb)) => {
                sa.size == sb.size
            }
            (ResourceSpec::Logical(sa), ResourceSpec::Logical(sb)) => sa.type_id == sb.type_id,
            _ => false,
        }
    }

    /// Stage 6: bind every transient resource to its group's backing,
    /// creating the backing through the backend factory the first time a
    /// group is seen. Logical buffers are constructed fresh per resource;
    /// they never share group backings.
    fn create_transient_resources(&mut self, target: &mut RenderTarget) -> GraphResult<()> {
        let mut group_framebuffers: HashMap<i32, FramebufferHandle> = HashMap::new();
        let mut group_storage_buffers: HashMap<i32, StorageBufferHandle> = HashMap::new();

        let resources = &mut self.resources;
        let transient_framebuffers = &mut self.transient_framebuffers;
        let transient_storage_buffers = &mut self.transient_storage_buffers;

        for resource in resources.iter_mut() {
            if !resource.is_transient() {
                continue;
            }

            if let Some(&framebuffer) = group_framebuffers.get(&resource.alias_group) {
                resource.content = ResourceContent::Framebuffer(framebuffer);
                continue;
            }
            if let Some(&buffer) = group_storage_buffers.get(&resource.alias_group) {
                resource.content = ResourceContent::StorageBuffer(buffer);
                continue;
            }

            match (resource.desc.kind, &resource.desc.spec) {
                (ResourceKind::Framebuffer, ResourceSpec::Texture(spec)) => {
                    let framebuffer = target.backend_mut().create_framebuffer(&FramebufferSpec {
                        width: spec.width,
                        height: spec.height,
                        samples: spec.sample_count,
                        format: spec.format,
                    })?;
                    resource.content = ResourceContent::Framebuffer(framebuffer);
                    group_framebuffers.insert(resource.alias_group, framebuffer);
                    transient_framebuffers.push(framebuffer);
                }
                (ResourceKind::StorageBuffer, ResourceSpec::StorageBuffer(spec)) => {
                    let buffer = target.backend_mut().create_storage_buffer(spec.size)?;
                    resource.content = ResourceContent::StorageBuffer(buffer);
                    group_storage_buffers.insert(resource.alias_group, buffer);
                    transient_storage_buffers.push(buffer);
                }
                (ResourceKind::LogicalBuffer, ResourceSpec::Logical(spec)) => {
                    resource.content = ResourceContent::Logical((spec.construct)());
                }
                // Plain textures and depth-stencil targets have no
                // transient factory; they stay unbound and are rejected at
                // setup if a pass accesses them.
                _ => {}
            }
        }

        log::debug!(
            "Transient resources created: {} framebuffers, {} storage buffers",
            transient_framebuffers.len(),
            transient_storage_buffers.len()
        );
        Ok(())
    }

    /// Stage 7: verify bindings and hand each non-culled pass references
    /// to exactly the resources it declared, in access-declaration order.
    fn setup_passes(&mut self, target: &mut RenderTarget) -> GraphResult<()> {
        let passes = &mut self.passes;
        let resources = &self.resources;

        for pass in passes.iter_mut() {
            if pass.is_culled() {
                continue;
            }
            log::debug!("Setting up pass '{}'", pass.name());

            let handles: Vec<ResourceHandle> =
                pass.accesses().iter().map(|a| a.resource).collect();
            let mut gathered: Vec<&Resource> = Vec::with_capacity(handles.len());
            for handle in handles {
                let resource = &resources[handle.index()];
                Self::ensure_bound(resource)?;
                gathered.push(resource);
            }

            if let Err(e) = pass.setup(target, &gathered) {
                return Err(Self::pass_failed(pass, e));
            }
        }
        Ok(())
    }

    /// A pass must never observe an empty or mismatched binding; this is
    /// the coherence check between a descriptor's kind and the content the
    /// compiler (or importer) bound.
    fn ensure_bound(resource: &Resource) -> GraphResult<()> {
        let (matches_kind, expected) = match resource.kind() {
            ResourceKind::Framebuffer => (
                matches!(resource.content, ResourceContent::Framebuffer(_)),
                "framebuffer",
            ),
            ResourceKind::StorageBuffer => (
                matches!(resource.content, ResourceContent::StorageBuffer(_)),
                "storage buffer",
            ),
            ResourceKind::LogicalBuffer => (
                matches!(resource.content, ResourceContent::Logical(_)),
                "logical buffer",
            ),
            ResourceKind::Texture2D | ResourceKind::Texture3D | ResourceKind::DepthStencil => (
                matches!(resource.content, ResourceContent::Texture(_)),
                "texture",
            ),
        };

        if matches_kind {
            Ok(())
        } else if !resource.is_bound() {
            Err(GraphError::ResourceNotBound {
                name: resource.name().to_string(),
            })
        } else {
            Err(GraphError::ContentKindMismatch {
                name: resource.name().to_string(),
                expected,
            })
        }
    }

    fn pass_failed(pass: &GraphPass, source: GraphError) -> GraphError {
        GraphError::PassFailed {
            pass: pass.name().to_string(),
            source: Box::new(source),
        }
    }

    /// Destroy owned transient backings and unbind every transient
    /// resource.
    fn release_transients(&mut self, target: &mut RenderTarget) {
        for framebuffer in self.transient_framebuffers.drain(..) {
            target.backend_mut().destroy_framebuffer(framebuffer);
        }
        for buffer in self.transient_storage_buffers.drain(..) {
            target.backend_mut().destroy_storage_buffer(buffer);
        }
        for resource in &mut self.resources {
            if resource.is_transient() {
                resource.content = ResourceContent::None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn passes(&self) -> &[GraphPass] {
        &self.passes
    }

    pub fn pass(&self, handle: PassHandle) -> Option<&GraphPass> {
        self.passes.get(handle.index())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.resources.get(handle.index())
    }

    /// The compiled execution order; empty before the first successful
    /// compile.
    pub fn execution_order(&self) -> &[PassHandle] {
        &self.execution_order
    }

    /// Passes declaring a Write or ReadWrite access to the resource.
    pub fn resource_writers(&self, handle: ResourceHandle) -> Vec<PassHandle> {
        self.passes
            .iter()
            .enumerate()
            .filter(|(_, pass)| {
                pass.accesses()
                    .iter()
                    .any(|a| a.resource == handle && a.mode.is_write())
            })
            .map(|(index, _)| PassHandle::new(index as u32))
            .collect()
    }

    /// Passes declaring a Read or ReadWrite access to the resource.
    pub fn resource_readers(&self, handle: ResourceHandle) -> Vec<PassHandle> {
        self.passes
            .iter()
            .enumerate()
            .filter(|(_, pass)| {
                pass.accesses()
                    .iter()
                    .any(|a| a.resource == handle && a.mode.is_read())
            })
            .map(|(index, _)| PassHandle::new(index as u32))
            .collect()
    }

    /// Runtime toggle for a pass, independent of culling.
    pub fn set_pass_enabled(&mut self, handle: PassHandle, enabled: bool) {
        if let Some(pass) = self.passes.get_mut(handle.index()) {
            pass.set_enabled(enabled);
        }
    }
}

impl Drop for FrameGraph {
    fn drop(&mut self) {
        if !self.cleaned_up
            && (!self.transient_framebuffers.is_empty()
                || !self.transient_storage_buffers.is_empty())
        {
            log::warn!(
                "Frame graph dropped without cleanup(); {} framebuffers and {} storage buffers leak",
                self.transient_framebuffers.len(),
                self.transient_storage_buffers.len()
            );
        }
    }
}

impl std::fmt::Debug for FrameGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraph")
            .field("passes", &self.passes.len())
            .field("resources", &self.resources.len())
            .field("compiled", &self.compiled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::TextureFormat;
    use crate::backend::DummyBackend;
    use crate::render_graph::builder::FrameGraphBuilder;
    use crate::render_graph::pass::PassType;
    use crate::render_graph::resource::ResourceLifetime;
    use crate::render_graph::tests_support::NoopPass;

    fn dummy_target() -> RenderTarget {
        RenderTarget::new(Box::new(DummyBackend::new()))
    }

    #[test]
    fn test_lifetime_windows() {
        let mut builder = FrameGraphBuilder::new();
        let buffer = builder.declare_storage_buffer("scratch", 256, ResourceLifetime::Transient);
        let out = builder.declare_storage_buffer("out", 256, ResourceLifetime::Persistent);
        builder
            .add_pass(NoopPass::new("produce"), PassType::Compute)
            .write(buffer)
            .end();
        builder
            .add_pass(NoopPass::new("transform"), PassType::Compute)
            .read_write(buffer)
            .end();
        builder
            .add_pass(NoopPass::new("consume"), PassType::Compute)
            .read(buffer)
            .write(out)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();

        let resource = graph.resource(buffer).unwrap();
        assert_eq!(resource.first_write_pass(), 0);
        assert_eq!(resource.last_read_pass(), 2);
        assert!(resource.is_written());
        assert!(resource.is_read());
    }

    #[test]
    fn test_every_earlier_writer_becomes_a_dependency() {
        let mut builder = FrameGraphBuilder::new();
        let shared = builder.declare_storage_buffer("shared", 64, ResourceLifetime::Transient);
        builder
            .add_pass(NoopPass::new("writer_a"), PassType::Compute)
            .write(shared)
            .end();
        builder
            .add_pass(NoopPass::new("writer_b"), PassType::Compute)
            .read_write(shared)
            .end();
        builder
            .add_pass(NoopPass::new("reader"), PassType::Compute)
            .read(shared)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();

        let reader = &graph.passes()[2];
        assert_eq!(reader.computed_dependencies(), &[0, 1]);
        // writer_b reads too, so it depends on writer_a
        assert_eq!(graph.passes()[1].computed_dependencies(), &[0]);
    }

    #[test]
    fn test_priority_breaks_ties_deterministically() {
        let mut builder = FrameGraphBuilder::new();
        builder
            .add_pass(NoopPass::new("low"), PassType::Graphics)
            .end();
        builder
            .add_pass(NoopPass::new("high").with_priority(10), PassType::Graphics)
            .end();
        builder
            .add_pass(NoopPass::new("mid").with_priority(5), PassType::Graphics)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();
        graph.topological_sort().unwrap();

        let names: Vec<&str> = graph
            .execution_order()
            .iter()
            .map(|&h| graph.pass(h).unwrap().name())
            .collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        assert_eq!(graph.passes()[1].execution_index(), 0);
    }

    #[test]
    fn test_equal_priorities_order_by_declaration() {
        let mut builder = FrameGraphBuilder::new();
        for name in ["first", "second", "third"] {
            builder
                .add_pass(NoopPass::new(name).with_priority(3), PassType::Graphics)
                .end();
        }
        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();
        graph.topological_sort().unwrap();

        let names: Vec<&str> = graph
            .execution_order()
            .iter()
            .map(|&h| graph.pass(h).unwrap().name())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cycle_is_fatal_and_discards_order() {
        let mut builder = FrameGraphBuilder::new();
        let r = builder.declare_storage_buffer("r", 64, ResourceLifetime::Transient);
        let r2 = builder.declare_storage_buffer("r2", 64, ResourceLifetime::Transient);
        builder
            .add_pass(
                NoopPass::new("p1").with_dependency("p2"),
                PassType::Compute,
            )
            .write(r)
            .end();
        builder
            .add_pass(NoopPass::new("p2"), PassType::Compute)
            .read(r)
            .write(r2)
            .end();

        let mut graph = builder.build().unwrap();
        let mut target = dummy_target();
        let err = graph.compile(&mut target).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));
        assert!(graph.execution_order().is_empty());
        assert!(!graph.is_compiled());
        assert!(matches!(
            graph.execute(&mut target, 0.016),
            Err(GraphError::NotCompiled)
        ));
    }

    #[test]
    fn test_unknown_manual_dependency_fails() {
        let mut builder = FrameGraphBuilder::new();
        builder
            .add_pass(
                NoopPass::new("lonely").with_dependency("ghost"),
                PassType::Graphics,
            )
            .end();
        let mut graph = builder.build().unwrap();
        let mut target = dummy_target();
        assert!(matches!(
            graph.compile(&mut target),
            Err(GraphError::UnknownPassDependency { .. })
        ));
    }

    #[test]
    fn test_culling_cascades_up_the_chain() {
        // head writes a, mid reads a and writes b, nobody reads b:
        // mid dies first, then head's output loses its only reader.
        let mut builder = FrameGraphBuilder::new();
        let a = builder.declare_storage_buffer("a", 64, ResourceLifetime::Transient);
        let b = builder.declare_storage_buffer("b", 64, ResourceLifetime::Transient);
        builder
            .add_pass(NoopPass::new("head"), PassType::Compute)
            .write(a)
            .end();
        builder
            .add_pass(NoopPass::new("mid"), PassType::Compute)
            .read(a)
            .write(b)
            .end();

        let mut graph = builder.build().unwrap();
        let mut target = dummy_target();
        graph.compile(&mut target).unwrap();

        assert!(graph.passes()[0].is_culled());
        assert!(graph.passes()[1].is_culled());
        graph.cleanup(&mut target);
    }

    #[test]
    fn test_manual_dependency_keeps_pass_alive() {
        let mut builder = FrameGraphBuilder::new();
        let dead = builder.declare_storage_buffer("dead", 64, ResourceLifetime::Transient);
        let out = builder.declare_storage_buffer("out", 64, ResourceLifetime::Persistent);
        builder
            .add_pass(NoopPass::new("side_effect"), PassType::Compute)
            .write(dead)
            .end();
        builder
            .add_pass(
                NoopPass::new("main").with_dependency("side_effect"),
                PassType::Compute,
            )
            .write(out)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();
        graph.topological_sort().unwrap();
        graph.cull_passes();

        assert!(!graph.passes()[0].is_culled());
        assert!(!graph.passes()[1].is_culled());
    }

    #[test]
    fn test_aliasing_requires_disjoint_windows_and_matching_spec() {
        let mut builder = FrameGraphBuilder::new();
        let t1 = builder.declare_framebuffer(
            "t1",
            256,
            256,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let t2 = builder.declare_framebuffer(
            "t2",
            256,
            256,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let overlapping = builder.declare_framebuffer(
            "overlapping",
            256,
            256,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let different = builder.declare_framebuffer(
            "different",
            128,
            128,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let sink = builder.declare_storage_buffer("sink", 64, ResourceLifetime::Persistent);

        // t1 window [0,1]; overlapping window [0,3]; t2 window [2,3]
        builder
            .add_pass(NoopPass::new("p0"), PassType::Graphics)
            .write(t1)
            .write(overlapping)
            .end();
        builder
            .add_pass(NoopPass::new("p1"), PassType::Graphics)
            .read(t1)
            .end();
        builder
            .add_pass(NoopPass::new("p2"), PassType::Graphics)
            .write(t2)
            .write(different)
            .end();
        builder
            .add_pass(NoopPass::new("p3"), PassType::Graphics)
            .read(t2)
            .read(overlapping)
            .read(different)
            .write(sink)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();
        graph.topological_sort().unwrap();
        graph.cull_passes();
        graph.alias_resources();

        let group_of = |h| graph.resource(h).unwrap().alias_group();
        assert_eq!(group_of(t1), group_of(t2));
        assert_ne!(group_of(t1), group_of(overlapping));
        assert_ne!(group_of(t1), group_of(different));
        assert_ne!(group_of(overlapping), group_of(different));
    }

    #[test]
    fn test_overlapping_windows_do_not_alias() {
        let mut builder = FrameGraphBuilder::new();
        let t1 = builder.declare_framebuffer(
            "t1",
            512,
            512,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let t2 = builder.declare_framebuffer(
            "t2",
            512,
            512,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let out = builder.declare_storage_buffer("out", 64, ResourceLifetime::Persistent);
        builder
            .add_pass(NoopPass::new("p0"), PassType::Graphics)
            .write(t1)
            .end();
        builder
            .add_pass(NoopPass::new("p1"), PassType::Graphics)
            .read(t1)
            .write(t2)
            .end();
        builder
            .add_pass(NoopPass::new("p2"), PassType::Graphics)
            .read(t2)
            .write(out)
            .end();

        let mut graph = builder.build().unwrap();
        graph.compute_resource_lifetimes();
        graph.infer_dependencies().unwrap();
        graph.topological_sort().unwrap();
        graph.cull_passes();
        graph.alias_resources();

        // t1 [0,1] and t2 [1,2] overlap on pass 1: distinct groups
        assert_ne!(
            graph.resource(t1).unwrap().alias_group(),
            graph.resource(t2).unwrap().alias_group()
        );
    }

    #[test]
    fn test_recompile_is_deterministic_and_releases_backings() {
        let mut builder = FrameGraphBuilder::new();
        let fb = builder.declare_framebuffer(
            "color",
            320,
            240,
            TextureFormat::Rgba8Unorm,
            1,
            ResourceLifetime::Transient,
        );
        let out = builder.declare_storage_buffer("out", 64, ResourceLifetime::Persistent);
        builder
            .add_pass(NoopPass::new("draw"), PassType::Graphics)
            .write(fb)
            .end();
        builder
            .add_pass(NoopPass::new("post"), PassType::Graphics)
            .read(fb)
            .write(out)
            .end();

        let mut graph = builder.build().unwrap();
        let mut target = dummy_target();
        // Bind the persistent output so setup validation passes
        let handle = target.backend_mut().create_storage_buffer(64).unwrap();
        graph.resources[out.index()].content = ResourceContent::StorageBuffer(handle);

        graph.compile(&mut target).unwrap();
        let first_order: Vec<_> = graph.execution_order().to_vec();
        let first_groups: Vec<_> = graph.resources().iter().map(|r| r.alias_group()).collect();

        graph.compile(&mut target).unwrap();
        assert_eq!(graph.execution_order(), first_order.as_slice());
        let second_groups: Vec<_> = graph.resources().iter().map(|r| r.alias_group()).collect();
        assert_eq!(first_groups, second_groups);

        graph.cleanup(&mut target);
    }
}
