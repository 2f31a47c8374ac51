//! Diagnostic exporters for compiled graphs.
//!
//! Exporters read the graph through its introspection accessors only and
//! write a human-readable description of passes, resources, accesses and
//! computed dependencies. Intended for debugging pass ordering, culling
//! and aliasing decisions; never on the frame hot path.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::render_graph::graph::FrameGraph;
use crate::render_graph::pass::AccessMode;

/// Writes a graph description in some textual format.
pub trait GraphExporter {
    /// Short format name for diagnostics ("graphviz", "mermaid", ...).
    fn format_name(&self) -> &'static str;

    /// Write the graph description to `out`.
    fn export(&self, graph: &FrameGraph, out: &mut dyn Write) -> io::Result<()>;

    /// Write the graph description to a file at `path`.
    fn export_to_file(&self, graph: &FrameGraph, path: &Path) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.export(graph, &mut file)?;
        file.flush()?;
        log::info!(
            "Exported frame graph to {} ({})",
            path.display(),
            self.format_name()
        );
        Ok(())
    }
}

/// Graphviz DOT exporter.
///
/// Passes render as boxes (gray when culled), resources as ellipses
/// (persistent) or diamonds (transient), access edges colored by mode and
/// computed dependencies as dashed gray edges.
#[derive(Debug, Default)]
pub struct GraphvizExporter;

impl GraphExporter for GraphvizExporter {
    fn format_name(&self) -> &'static str {
        "graphviz"
    }

    fn export(&self, graph: &FrameGraph, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "digraph FrameGraph {{")?;
        writeln!(out, "  rankdir=TB;")?;
        writeln!(out, "  node [shape=box];")?;
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            let color = if pass.is_culled() { "gray" } else { "lightblue" };
            writeln!(
                out,
                "  pass_{i} [label=\"{}\", style=filled, fillcolor={color}];",
                pass.name()
            )?;
        }
        writeln!(out)?;

        for (i, resource) in graph.resources().iter().enumerate() {
            let shape = if resource.is_persistent() {
                "ellipse"
            } else {
                "diamond"
            };
            let color = if resource.is_read() {
                "lightgreen"
            } else {
                "lightyellow"
            };
            write!(out, "  resource_{i} [label=\"{}", resource.name())?;
            if resource.alias_group() >= 0 {
                write!(out, "\\nalias_group={}", resource.alias_group())?;
            }
            writeln!(out, "\", shape={shape}, style=filled, fillcolor={color}];")?;
        }
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            for access in pass.accesses() {
                let r = access.resource.index();
                match access.mode {
                    AccessMode::Write => {
                        writeln!(out, "  pass_{i} -> resource_{r} [label=\"write\", color=red];")?
                    }
                    AccessMode::Read => {
                        writeln!(out, "  resource_{r} -> pass_{i} [label=\"read\", color=blue];")?
                    }
                    AccessMode::ReadWrite => writeln!(
                        out,
                        "  pass_{i} -> resource_{r} [label=\"read_write\", color=purple, dir=both];"
                    )?,
                }
            }
        }
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            for &dep in pass.computed_dependencies() {
                writeln!(out, "  pass_{dep} -> pass_{i} [style=dashed, color=gray];")?;
            }
        }

        writeln!(out, "}}")
    }
}

/// Mermaid `graph TD` exporter.
#[derive(Debug, Default)]
pub struct MermaidExporter;

impl GraphExporter for MermaidExporter {
    fn format_name(&self) -> &'static str {
        "mermaid"
    }

    fn export(&self, graph: &FrameGraph, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "graph TD")?;
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            writeln!(out, "  pass_{i}[{}]", pass.name())?;
        }
        writeln!(out)?;

        for (i, resource) in graph.resources().iter().enumerate() {
            // Persistent resources render as circles, transient as rhombi
            let (open, close) = if resource.is_persistent() {
                ("((", "))")
            } else {
                ("{", "}")
            };
            write!(out, "  resource_{i}{open}{}", resource.name())?;
            if resource.alias_group() >= 0 {
                write!(out, "<br/>alias_group={}", resource.alias_group())?;
            }
            writeln!(out, "{close}")?;
        }
        writeln!(out)?;

        let mut link_index = 0u32;
        for (i, pass) in graph.passes().iter().enumerate() {
            for access in pass.accesses() {
                let r = access.resource.index();
                let style = match access.mode {
                    AccessMode::Write => {
                        writeln!(out, "  pass_{i} -->|write| resource_{r}")?;
                        "red"
                    }
                    AccessMode::Read => {
                        writeln!(out, "  resource_{r} -->|read| pass_{i}")?;
                        "blue"
                    }
                    AccessMode::ReadWrite => {
                        writeln!(out, "  pass_{i} <-->|read_write| resource_{r}")?;
                        "purple"
                    }
                };
                writeln!(out, "  linkStyle {link_index} stroke:{style}")?;
                link_index += 1;
            }
        }
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            for &dep in pass.computed_dependencies() {
                writeln!(out, "  pass_{dep} -.-> pass_{i}")?;
                writeln!(out, "  linkStyle {link_index} stroke:gray")?;
                link_index += 1;
            }
        }
        writeln!(out)?;

        for (i, pass) in graph.passes().iter().enumerate() {
            if pass.is_culled() {
                writeln!(out, "  style pass_{i} fill:#ccc,stroke:#999")?;
            }
        }
        Ok(())
    }
}

/// Plain-text report: pass list, resource list, execution order and
/// statistics.
#[derive(Debug, Default)]
pub struct SummaryExporter;

impl GraphExporter for SummaryExporter {
    fn format_name(&self) -> &'static str {
        "summary"
    }

    fn export(&self, graph: &FrameGraph, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "FRAME GRAPH")?;
        writeln!(out, "===========")?;
        writeln!(out)?;

        writeln!(out, "Passes:")?;
        for (i, pass) in graph.passes().iter().enumerate() {
            let state = if pass.is_culled() {
                "culled"
            } else if !pass.is_enabled() {
                "disabled"
            } else {
                "active"
            };
            writeln!(
                out,
                "  [{i}] {} ({:?}, priority {}, {state})",
                pass.name(),
                pass.pass_type(),
                pass.priority()
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Resources:")?;
        for (i, resource) in graph.resources().iter().enumerate() {
            write!(
                out,
                "  [{i}] {} ({:?}, {:?}",
                resource.name(),
                resource.kind(),
                resource.lifetime()
            )?;
            if resource.is_written() || resource.is_read() {
                write!(
                    out,
                    ", window [{}, {}]",
                    resource.first_write_pass(),
                    resource.last_read_pass()
                )?;
            }
            if resource.alias_group() >= 0 {
                write!(out, ", alias_group {}", resource.alias_group())?;
            }
            writeln!(out, ")")?;
        }
        writeln!(out)?;

        writeln!(out, "Execution order:")?;
        for (position, &handle) in graph.execution_order().iter().enumerate() {
            if let Some(pass) = graph.pass(handle) {
                let marker = if pass.is_culled() { " (culled)" } else { "" };
                writeln!(out, "  {position}: {}{marker}", pass.name())?;
            }
        }
        writeln!(out)?;

        let culled = graph.passes().iter().filter(|p| p.is_culled()).count();
        let transient = graph.resources().iter().filter(|r| r.is_transient()).count();
        let groups = graph
            .resources()
            .iter()
            .filter(|r| r.alias_group() >= 0)
            .map(|r| r.alias_group())
            .collect::<std::collections::HashSet<_>>()
            .len();

        writeln!(out, "Statistics:")?;
        writeln!(out, "  passes:           {}", graph.pass_count())?;
        writeln!(out, "  culled passes:    {culled}")?;
        writeln!(out, "  resources:        {}", graph.resource_count())?;
        writeln!(out, "  transient:        {transient}")?;
        writeln!(out, "  alias groups:     {groups}")?;
        Ok(())
    }
}
