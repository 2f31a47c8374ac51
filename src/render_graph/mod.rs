//! Frame graph system.
//!
//! A declarative system for defining render passes as a directed acyclic
//! graph. Passes declare which resources they read and write; the graph
//! compiler infers dependencies from those declarations, orders passes,
//! culls passes whose outputs are never consumed, and aliases transient
//! resources with disjoint lifetimes onto shared backing allocations.
//!
//! # Architecture
//!
//! | Layer | Type | Purpose |
//! |-------|------|---------|
//! | Builder | [`FrameGraphBuilder`] | Accumulates resource and pass declarations |
//! | Graph | [`FrameGraph`] | Compiles once, executes every frame |
//! | Pass | [`RenderPass`] | Opaque pass body behind a fixed lifecycle |
//! | Resource | [`Resource`] | Declared once, bound during compilation |
//!
//! # Example
//!
//! ```ignore
//! use framegraph::render_graph::{FrameGraphBuilder, PassType};
//!
//! let mut builder = FrameGraphBuilder::new();
//! let shadow_map = builder.declare_framebuffer("shadow_map", 1024, 1024, format, 1, lifetime);
//! builder
//!     .add_pass(ShadowPass::new(), PassType::Graphics)
//!     .write(shadow_map)
//!     .end();
//! let mut graph = builder.build()?;
//! graph.compile(&mut target)?;
//! graph.execute(&mut target, dt)?;
//! ```

pub mod builder;
pub mod export;
pub mod graph;
pub mod pass;
pub mod resource;

#[cfg(test)]
pub(crate) mod tests_support;

pub use builder::{FrameGraphBuilder, PassBuilder};
pub use export::{GraphExporter, GraphvizExporter, MermaidExporter, SummaryExporter};
pub use graph::FrameGraph;
pub use pass::{AccessMode, GraphPass, PassHandle, PassType, RenderPass, ResourceAccess};
pub use resource::{
    LogicalBufferSpec, Resource, ResourceContent, ResourceDescriptor, ResourceHandle,
    ResourceKind, ResourceLifetime, ResourceSpec, StorageBufferSpec, TextureSpec,
};

use crate::backend::BackendError;
use thiserror::Error;

/// Errors that can occur during graph construction, compilation or execution.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The computed dependencies contain a cycle; no valid execution order
    /// exists. The graph must be re-declared and recompiled.
    #[error("frame graph contains a dependency cycle ({sorted} of {total} passes ordered)")]
    CyclicDependency { sorted: usize, total: usize },

    /// A pass access referenced a resource index that was never declared.
    #[error(
        "pass '{pass}' accesses resource index {index}, but only {resource_count} resources are declared"
    )]
    InvalidResourceIndex {
        pass: String,
        index: u32,
        resource_count: usize,
    },

    /// A manual dependency named a pass that does not exist in the graph.
    #[error("pass '{pass}' depends on unknown pass '{dependency}'")]
    UnknownPassDependency { pass: String, dependency: String },

    /// A pass accessed a resource whose content was never materialized or
    /// imported.
    #[error("resource '{name}' is not bound to any content")]
    ResourceNotBound { name: String },

    /// A resource's content does not hold the kind the caller asked for.
    #[error("resource '{name}' content is not a {expected}")]
    ContentKindMismatch {
        name: String,
        expected: &'static str,
    },

    /// `execute` was called before a successful `compile`.
    #[error("frame graph has not been compiled")]
    NotCompiled,

    /// A pass body's lifecycle hook returned an error.
    #[error("pass '{pass}' failed")]
    PassFailed {
        pass: String,
        #[source]
        source: Box<GraphError>,
    },

    /// A backend factory call failed during transient materialization.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type GraphResult<T> = Result<T, GraphError>;
