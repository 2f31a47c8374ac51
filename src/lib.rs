//! # framegraph
//!
//! A compiled frame graph: declarative description of render passes and the
//! resources they read and write, compiled into a validated,
//! dependency-ordered, memory-aliased execution plan for one frame.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`FrameGraphBuilder`] - Fluent accumulation of resource and pass declarations
//! - [`FrameGraph`] - The compiler/executor: dependency inference, topological
//!   scheduling with priority tie-breaks, dead-pass culling, lifetime-based
//!   resource aliasing, transient materialization
//! - [`RenderPass`] - The lifecycle contract pass bodies implement
//! - [`RendererBackend`] - The factory capability a rendering backend provides,
//!   with a [`DummyBackend`] for tests and development
//! - Graph exporters (Graphviz, Mermaid, plain-text summary) for diagnostics
//!
//! ## Example
//!
//! ```ignore
//! use framegraph::{FrameGraphBuilder, PassType, RenderTarget, DummyBackend};
//!
//! let mut target = RenderTarget::new(Box::new(DummyBackend::new()));
//! let mut builder = FrameGraphBuilder::new();
//! let color = builder.declare_framebuffer("color", 1920, 1080, format, 1, lifetime);
//! builder.add_pass(GeometryPass::new(), PassType::Graphics).write(color).end();
//! let mut graph = builder.build()?;
//! graph.compile(&mut target)?;
//! loop {
//!     graph.execute(&mut target, dt)?;
//! }
//! ```
//!
//! Compilation runs once per topology; execution replays the fixed order
//! every frame on a single thread.

pub mod backend;
pub mod render_graph;
pub mod target;

// Re-export main types for convenience
pub use backend::{
    BackendError, BackendResult, DummyBackend, FramebufferHandle, FramebufferSpec,
    RendererBackend, StorageBufferHandle, TextureFormat, TextureHandle,
};
pub use render_graph::{
    AccessMode, FrameGraph, FrameGraphBuilder, GraphError, GraphExporter, GraphPass, GraphResult,
    GraphvizExporter, MermaidExporter, PassBuilder, PassHandle, PassType, RenderPass, Resource,
    ResourceHandle, ResourceKind, ResourceLifetime, SummaryExporter,
};
pub use target::RenderTarget;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
