//! Shared pass bodies for unit tests.

use crate::render_graph::resource::Resource;
use crate::render_graph::pass::RenderPass;
use crate::render_graph::GraphResult;
use crate::target::RenderTarget;

/// Pass body that does nothing; configurable priority and manual deps.
pub(crate) struct NoopPass {
    name: String,
    priority: i32,
    dependencies: Vec<String>,
}

impl NoopPass {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            priority: -1,
            dependencies: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_dependency(mut self, name: &str) -> Self {
        self.dependencies.push(name.to_string());
        self
    }
}

impl RenderPass for NoopPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _target: &mut RenderTarget, _resources: &[&Resource]) -> GraphResult<()> {
        Ok(())
    }

    fn begin(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        Ok(())
    }

    fn execute(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        Ok(())
    }

    fn end(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        Ok(())
    }

    fn cleanup(&mut self) {}

    fn priority(&self) -> i32 {
        self.priority
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }
}
