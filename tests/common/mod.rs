//! Common utilities for frame graph integration tests.
//!
//! Provides pass bodies that record their lifecycle calls and resource
//! bindings into shared logs, plus a small deterministic PRNG for
//! property-style tests.

use std::cell::RefCell;
use std::rc::Rc;

use framegraph::{
    DummyBackend, FramebufferHandle, GraphResult, RenderPass, RenderTarget, Resource,
};

/// Shared event log filled in lifecycle order by [`TracingPass`].
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn dummy_target() -> RenderTarget {
    RenderTarget::new(Box::new(DummyBackend::new()))
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pass body that records every lifecycle call into an [`EventLog`] and
/// captures the framebuffer handles of the resources it was set up with.
pub struct TracingPass {
    name: String,
    priority: i32,
    log: EventLog,
    captured: Rc<RefCell<Vec<FramebufferHandle>>>,
}

impl TracingPass {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            priority: -1,
            log: Rc::clone(log),
            captured: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[allow(dead_code)]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Shared handle to the framebuffers captured during `setup`.
    pub fn captured(&self) -> Rc<RefCell<Vec<FramebufferHandle>>> {
        Rc::clone(&self.captured)
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl RenderPass for TracingPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _target: &mut RenderTarget, resources: &[&Resource]) -> GraphResult<()> {
        self.record("setup");
        for resource in resources {
            if let Ok(framebuffer) = resource.framebuffer() {
                self.captured.borrow_mut().push(framebuffer);
            }
        }
        Ok(())
    }

    fn begin(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        self.record("begin");
        Ok(())
    }

    fn execute(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        self.record("execute");
        Ok(())
    }

    fn end(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        self.record("end");
        Ok(())
    }

    fn cleanup(&mut self) {
        self.record("cleanup");
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Pass body with no observable behavior, for property tests that only
/// exercise the compiler.
pub struct SilentPass {
    name: String,
}

impl SilentPass {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

impl RenderPass for SilentPass {
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
}

/// Pass body that appends values into a logical `Vec<u32>` buffer during
/// execution, standing in for a mesh-batching collector client.
pub struct CollectorPass {
    name: String,
    values: Vec<u32>,
    sink: Option<Rc<RefCell<Vec<u32>>>>,
}

impl CollectorPass {
    pub fn new(name: &str, values: Vec<u32>) -> Self {
        Self {
            name: name.to_string(),
            values,
            sink: None,
        }
    }
}

impl RenderPass for CollectorPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _target: &mut RenderTarget, resources: &[&Resource]) -> GraphResult<()> {
        // The logical buffer is the first declared access
        self.sink = Some(resources[0].logical::<Vec<u32>>()?);
        Ok(())
    }

    fn begin(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        Ok(())
    }

    fn execute(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        if let Some(sink) = &self.sink {
            sink.borrow_mut().extend_from_slice(&self.values);
        }
        Ok(())
    }

    fn end(&mut self, _target: &mut RenderTarget, _dt: f64) -> GraphResult<()> {
        Ok(())
    }

    fn cleanup(&mut self) {
        self.sink = None;
    }
}

/// Small xorshift PRNG so property tests stay deterministic without a
/// rand dependency.
pub struct XorShift {
    state: u64,
}

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Uniform-ish value in `0..bound` (`bound > 0`).
    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}
