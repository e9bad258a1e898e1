use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::ObserverId;
use crate::protocol::EntityId;

/// Client-side use action as decoded from the incoming packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseAction {
    Attack,
    Interact,
    InteractAt,
}

/// An incoming use-entity packet, already decoded by the host layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseEntityPacket {
    pub entity_id: EntityId,
    pub action: UseAction,
}

/// Hologram-level click classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractAction {
    LeftClick,
    RightClick,
}

impl InteractAction {
    /// Attack maps to a left click; everything else is a right click.
    pub fn classify(action: UseAction) -> Self {
        match action {
            UseAction::Attack => InteractAction::LeftClick,
            UseAction::Interact | UseAction::InteractAt => InteractAction::RightClick,
        }
    }
}

/// Everything a click callback gets to know about one interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractContext {
    pub observer: ObserverId,
    pub entity_id: EntityId,
    /// Index of the clicked line within its hologram, top to bottom.
    pub line_index: usize,
    pub action: InteractAction,
}

pub type InteractCallback = Box<dyn FnMut(&InteractContext) + Send>;

/// Per-hologram table of click callbacks.
#[derive(Default)]
pub struct InteractHandler {
    actions: HashMap<InteractAction, InteractCallback>,
}

impl InteractHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action<F>(&mut self, action: InteractAction, callback: F)
    where
        F: FnMut(&InteractContext) + Send + 'static,
    {
        self.actions.insert(action, Box::new(callback));
    }

    pub fn remove_action(&mut self, action: InteractAction) {
        self.actions.remove(&action);
    }

    pub fn has_action(&self, action: InteractAction) -> bool {
        self.actions.contains_key(&action)
    }

    /// Invoke the callback registered for `action`, if any.
    pub fn call(&mut self, action: InteractAction, context: &InteractContext) {
        if let Some(callback) = self.actions.get_mut(&action) {
            callback(context);
        }
    }
}

impl fmt::Debug for InteractHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractHandler")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn classify_maps_attack_to_left_click() {
        assert_eq!(
            InteractAction::classify(UseAction::Attack),
            InteractAction::LeftClick
        );
        assert_eq!(
            InteractAction::classify(UseAction::Interact),
            InteractAction::RightClick
        );
        assert_eq!(
            InteractAction::classify(UseAction::InteractAt),
            InteractAction::RightClick
        );
    }

    #[test]
    fn handler_dispatches_only_registered_action() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut handler = InteractHandler::new();
        let counter = hits.clone();
        handler.add_action(InteractAction::LeftClick, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let context = InteractContext {
            observer: 4,
            entity_id: -2,
            line_index: 0,
            action: InteractAction::LeftClick,
        };
        handler.call(InteractAction::LeftClick, &context);
        handler.call(InteractAction::RightClick, &context);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(handler.has_action(InteractAction::LeftClick));
        handler.remove_action(InteractAction::LeftClick);
        assert!(!handler.has_action(InteractAction::LeftClick));
    }
}
