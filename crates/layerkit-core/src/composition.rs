//! A stack of layers sharing one touch surface.
//!
//! A new gesture goes to the top-most layer whose hit-region contains the
//! touch. That layer keeps receiving the gesture's events until it returns
//! to idle, even if the fingers leave its hit-region.

use serde::{Deserialize, Serialize};

use crate::gesture::{Effects, TouchAction, TouchEvent};
use crate::layer::Layer;

/// Stable handle for a layer in a [`Composition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// Layers ordered bottom to top.
#[derive(Debug, Default)]
pub struct Composition {
    layers: Vec<(LayerId, Layer)>,
    captured: Option<LayerId>,
    next_id: u32,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `layer` on top of the stack.
    pub fn push(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.layers.push((id, layer));
        tracing::debug!(layer = id.0, count = self.layers.len(), "pushed layer");
        id
    }

    /// Take a layer out of the stack.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|(lid, _)| *lid == id)?;
        if self.captured == Some(id) {
            self.captured = None;
        }
        Some(self.layers.remove(index).1)
    }

    /// Route one touch event.
    ///
    /// Returns the layer that consumed it, if any.
    pub fn dispatch(&mut self, event: &TouchEvent) -> Option<LayerId> {
        self.dispatch_with_effects(event).map(|(id, _)| id)
    }

    /// Like [`Composition::dispatch`], also returning what the consuming
    /// layer reported.
    pub fn dispatch_with_effects(&mut self, event: &TouchEvent) -> Option<(LayerId, Effects)> {
        if event.action == TouchAction::PointerDown {
            if let Some(id) = self.captured.take() {
                if let Some(layer) = self.get_mut(id) {
                    layer.engine_mut().reset();
                }
            }
            return self.offer_top_down(event);
        }

        let id = self.captured?;
        let layer = self.get_mut(id)?;
        let effects = layer.handle(event);
        if layer.engine().is_idle() {
            self.captured = None;
        }
        effects.consumed.then_some((id, effects))
    }

    fn offer_top_down(&mut self, event: &TouchEvent) -> Option<(LayerId, Effects)> {
        for (id, layer) in self.layers.iter_mut().rev() {
            let effects = layer.handle(event);
            if effects.consumed {
                self.captured = Some(*id);
                tracing::debug!(layer = id.0, "layer captured gesture");
                return Some((*id, effects));
            }
        }
        None
    }

    /// Layer currently receiving a gesture.
    pub fn captured(&self) -> Option<LayerId> {
        self.captured
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, layer)| layer)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|(lid, _)| *lid == id)
            .map(|(_, layer)| layer)
    }

    /// Layers in drawing order, bottom first.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether any layer needs to be redrawn. Clears every layer's flag.
    pub fn take_repaint(&mut self) -> bool {
        self.layers
            .iter_mut()
            .fold(false, |any, (_, layer)| layer.engine_mut().take_repaint() || any)
    }
}
