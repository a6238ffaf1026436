//! Per-layer touch controller.

use kurbo::{Affine, Rect};

use super::event::TouchEvent;
use super::state::{step, Effects, GestureState};
use super::transform::LayerTransform;
use crate::{ConfigError, GestureConfig};

/// Turns a layer's touch stream into its current transform.
///
/// Owns the gesture state, the transform, and the hit-region derived from
/// them. Events must be fed in arrival order from a single source.
#[derive(Debug, Clone)]
pub struct TouchTransformEngine {
    size: (f64, f64),
    config: GestureConfig,
    state: GestureState,
    transform: LayerTransform,
    hit_region: Rect,
    needs_repaint: bool,
}

impl TouchTransformEngine {
    /// Engine for a layer of `width x height` display pixels placed at
    /// `transform`.
    ///
    /// Fails if the scale limits are not finite or `min_scale > max_scale`.
    pub fn new(
        width: f64,
        height: f64,
        transform: LayerTransform,
        config: GestureConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = (width, height);
        Ok(Self {
            size,
            config,
            state: GestureState::Idle,
            transform,
            hit_region: transform.hit_region(size),
            needs_repaint: true,
        })
    }

    /// Feed one event.
    ///
    /// A declined event (`consumed == false`) should be offered to the next
    /// layer down.
    pub fn handle(&mut self, event: &TouchEvent) -> Effects {
        let next = step(
            &self.state,
            &self.transform,
            self.hit_region,
            event,
            &self.config,
        );

        self.state = next.state;

        if next.transform != self.transform {
            self.transform = next.transform;
            self.hit_region = self.transform.hit_region(self.size);
        }
        if next.effects.repaint {
            self.needs_repaint = true;
        }
        next.effects
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Replace the transform, e.g. when the host restores a layout.
    ///
    /// The scale is clamped to the limits. Returns `false` and keeps the
    /// current transform if any component is NaN or infinite.
    pub fn set_transform(&mut self, transform: LayerTransform) -> bool {
        if !transform.is_finite() {
            tracing::warn!(?transform, "ignoring non-finite layer transform");
            return false;
        }
        let scale = self.config.clamp_scale(transform.scale);
        self.transform = LayerTransform { scale, ..transform };
        self.hit_region = self.transform.hit_region(self.size);
        self.needs_repaint = true;
        true
    }

    pub fn transform(&self) -> LayerTransform {
        self.transform
    }

    /// Matrix for drawing the layer this frame.
    pub fn affine(&self) -> Affine {
        self.transform.to_affine(self.size)
    }

    /// Box that a new touch has to land in to start a gesture.
    pub fn hit_region(&self) -> Rect {
        self.hit_region
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Return and clear the pending repaint flag.
    ///
    /// A new engine starts with a pending repaint so its first frame is drawn.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }
}
