//! Diff-based redraw: reconcile the last-drawn objects with a new layout.

use std::collections::BTreeMap;

use crate::overlay::objects::{DrawCommand, ObjectKey, OverlayObject};

/// The set of overlay objects currently drawn, keyed by stable identity.
///
/// [`OverlayState::apply`] takes the desired layout for the current tick
/// and returns only the commands a renderer needs to reconcile: upserts
/// for new or changed objects, removes for keys that vanished. Applying
/// an identical layout twice returns no commands.
#[derive(Debug, Default)]
pub struct OverlayState {
    objects: BTreeMap<ObjectKey, OverlayObject>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &BTreeMap<ObjectKey, OverlayObject> {
        &self.objects
    }

    pub fn apply(&mut self, next: BTreeMap<ObjectKey, OverlayObject>) -> Vec<DrawCommand> {
        let mut commands = Vec::new();

        for key in self.objects.keys() {
            if !next.contains_key(key) {
                commands.push(DrawCommand::Remove { key: *key });
            }
        }

        for (key, object) in &next {
            if self.objects.get(key) != Some(object) {
                commands.push(DrawCommand::Upsert {
                    key: *key,
                    object: object.clone(),
                });
            }
        }

        self.objects = next;
        commands
    }
}
