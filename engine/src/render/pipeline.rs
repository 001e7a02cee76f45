//! Pass Pipeline
//!
//! Decides which passes run in a frame and records them in a fixed order:
//!
//! ```text
//! State -> Static (only when dirty) -> Scene (Full | Fast) -> Accumulation -> LightShaft | Blit
//! ```
//!
//! Every pass writes the write side of its double buffer. The pipeline swaps
//! a pair immediately after the pass that wrote it has been recorded, so the
//! next pass in the frame reads the fresh content. Recording itself is
//! delegated to a [`PassRecorder`], which keeps the ordering and swap rules
//! testable without a GPU.

use super::light_projection::LightProjection;
use super::targets::TargetBundle;
use crate::settings::Settings;
use crate::temporal::AccumulateParams;

/// Scene pass quality
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneVariant {
    /// Full step counts
    Full,
    /// Reduced step counts, used while the camera is being manipulated
    Fast,
}

/// Final pass onto the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    LightShaft,
    Blit,
}

/// One pass in the frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    State,
    Static,
    Scene(SceneVariant),
    Accumulation,
    Composite(Composite),
}

impl PassKind {
    pub fn label(self) -> &'static str {
        match self {
            PassKind::State => "State Pass",
            PassKind::Static => "Static Noise Pass",
            PassKind::Scene(SceneVariant::Full) => "Scene Pass",
            PassKind::Scene(SceneVariant::Fast) => "Scene Pass (Fast)",
            PassKind::Accumulation => "Accumulation Pass",
            PassKind::Composite(Composite::LightShaft) => "Light Shaft Pass",
            PassKind::Composite(Composite::Blit) => "Blit Pass",
        }
    }
}

/// Everything decided about a frame before any command is recorded
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    pub run_static: bool,
    pub scene_variant: SceneVariant,
    pub composite: Composite,
    pub accumulate: AccumulateParams,
}

impl FramePlan {
    pub fn new(
        static_pending: bool,
        interacting: bool,
        settings: &Settings,
        light: &LightProjection,
        accumulate: AccumulateParams,
    ) -> Self {
        let scene_variant = if interacting && settings.fast_while_interacting {
            SceneVariant::Fast
        } else {
            SceneVariant::Full
        };
        let composite = if light.shafts_visible(&settings.godrays) {
            Composite::LightShaft
        } else {
            Composite::Blit
        };
        Self {
            run_static: static_pending,
            scene_variant,
            composite,
            accumulate,
        }
    }

    /// Passes in recording order.
    pub fn passes(&self) -> Vec<PassKind> {
        let mut passes = Vec::with_capacity(5);
        passes.push(PassKind::State);
        if self.run_static {
            passes.push(PassKind::Static);
        }
        passes.push(PassKind::Scene(self.scene_variant));
        passes.push(PassKind::Accumulation);
        passes.push(PassKind::Composite(self.composite));
        passes
    }
}

/// Records one pass against the current targets.
pub trait PassRecorder<T> {
    fn record(&mut self, pass: PassKind, targets: &TargetBundle<T>);
}

/// Swap whatever the pass just wrote.
pub fn swap_after<T>(pass: PassKind, targets: &mut TargetBundle<T>) {
    match pass {
        PassKind::State => targets.state.swap(),
        PassKind::Static => targets.noise.swap(),
        PassKind::Accumulation => {
            targets.history.swap();
            targets.depth.swap();
        }
        // Single-buffered outputs
        PassKind::Scene(_) | PassKind::Composite(_) => {}
    }
}

/// Record every pass of a frame in order.
pub fn execute<T, R>(plan: &FramePlan, targets: &mut TargetBundle<T>, recorder: &mut R)
where
    R: PassRecorder<T>,
{
    for pass in plan.passes() {
        recorder.record(pass, targets);
        swap_after(pass, targets);
    }
}
