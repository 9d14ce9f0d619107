use cm_core::CaseModelError;

use crate::definition::{ReferenceSlot, RemovalEffect};
use crate::document::{forget_node, DefinitionDocument};
use crate::node::NodeRef;

impl DefinitionDocument {
    /// Deletes `node` with its whole subtree and scrubs every remaining node that held it.
    /// Definitions that lose a required reference go as well, once the outer deletion is
    /// done. Returns the ids of every removed node.
    pub fn remove_definition(&mut self, node: NodeRef) -> Result<Vec<String>, CaseModelError> {
        self.ensure_valid()?;
        if !self.is_live(node) {
            return Err(CaseModelError::new(
                "NODE_NOT_FOUND",
                format!("{:?} is not part of \"{}\".", node, self.file_name()),
            ));
        }

        let mut removed = Vec::new();
        self.delete_node(node, &mut removed);
        while !self.pending_orphans.is_empty() {
            let orphan = self.pending_orphans.remove(0);
            self.delete_node(orphan, &mut removed);
        }

        log::debug!(
            "event=definition_remove status=ok file={} removed={}",
            self.file_name(),
            removed.join(",")
        );
        Ok(removed)
    }

    fn delete_node(&mut self, node: NodeRef, removed: &mut Vec<String>) {
        let Some(entry) = self.slot_mut(node) else {
            return;
        };
        if entry.deleting {
            return;
        }
        entry.deleting = true;
        let children = entry.children.clone();
        let id = entry.id.clone();

        for child in children.into_iter().rev() {
            self.delete_node(child, removed);
        }

        for other in self.elements.clone() {
            if other == node {
                continue;
            }
            if self.scrub(other, node, id.as_deref()) {
                self.pending_orphans.push(other);
            }
        }

        self.elements.retain(|entry| *entry != node);
        if self.root == Some(node) {
            self.root = None;
        }
        self.wipe(node);
        if let Some(id) = id {
            removed.push(id);
        }
    }

    /// Drops every trace of `removed` from `holder`. Returns `true` when `holder` asked to be
    /// removed as well.
    fn scrub(&mut self, holder: NodeRef, removed: NodeRef, removed_id: Option<&str>) -> bool {
        let Some(entry) = self.slot_mut(holder) else {
            return false;
        };
        entry.children.retain(|child| *child != removed);
        forget_node(entry.data.node_fields(), removed);

        let mut cleared = Vec::new();
        for field in entry.data.reference_fields() {
            // An unresolved id in a field that may point into another file names that
            // file's element, never this one.
            let removed_id = removed_id.filter(|_| field.warn_if_dangling);
            let hit = match field.slot {
                ReferenceSlot::One(reference) => {
                    let hit = reference.refers_to(removed, removed_id);
                    if hit {
                        reference.clear();
                    }
                    hit
                }
                ReferenceSlot::Many(list) => list.remove_matching(removed, removed_id),
            };
            if hit {
                cleared.push(field.name);
            }
        }

        let mut remove_self = false;
        for field in cleared {
            if entry.data.reference_removed(field) == RemovalEffect::RemoveSelf {
                remove_self = true;
            }
        }
        remove_self && !entry.deleting
    }
}
