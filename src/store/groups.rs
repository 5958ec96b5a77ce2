use tracing::debug;

use super::{ChangeEvent, DiagramStore};
use crate::model::{Shape, ShapeKind};

impl DiagramStore {
    /// Replaces the current selection (two or more top-level shapes) with a
    /// single composite owning them in selection order. Fires a removal per
    /// grouped shape, then the composite's addition, then the selection
    /// change, and finally re-anchors links. Fewer than two selected shapes
    /// is a user no-op.
    pub fn group_selection(&mut self) {
        if self.selection.len() < 2 {
            return;
        }
        let ids = self.selection.clone();

        let mut grouped: Vec<Shape> = Vec::new();
        for id in &ids {
            if let Some(index) = self.shapes.iter().position(|shape| shape.id == *id) {
                let mut shape = self.shapes.remove(index);
                // Grouped composites get their cached bounds refreshed before
                // the union is taken.
                shape.update_bounds();
                grouped.push(shape);
            }
        }
        if grouped.len() < 2 {
            self.shapes.append(&mut grouped);
            return;
        }

        let removed_ids: Vec<u64> = grouped.iter().map(|shape| shape.id).collect();
        let group_id = self.alloc_id();
        debug!(group_id, members = removed_ids.len(), "group selection");
        self.shapes.push(Shape::composite(group_id, grouped));
        self.selection = vec![group_id];

        for id in removed_ids {
            self.notify(ChangeEvent::ShapeRemoved(id));
        }
        self.notify(ChangeEvent::ShapeAdded(group_id));
        self.notify_selection_changed();
        self.reanchor_links();
    }

    /// Dissolves a selected composite one level: its direct children return
    /// to the top level (nested composites stay composite) and become the
    /// selection. Anything but a single selected composite is a user no-op.
    pub fn ungroup_selection(&mut self) {
        if self.selection.len() != 1 {
            return;
        }
        let id = self.selection[0];
        let Some(index) = self.shapes.iter().position(|shape| shape.id == id) else {
            return;
        };
        let shape = self.shapes.remove(index);
        let children = match shape.kind {
            ShapeKind::Composite { children, .. } => children,
            ShapeKind::Basic { .. } => {
                self.shapes.insert(index, shape);
                return;
            }
        };

        debug!(group_id = id, members = children.len(), "ungroup selection");
        self.notify(ChangeEvent::ShapeRemoved(id));

        let mut child_ids = Vec::with_capacity(children.len());
        for mut child in children {
            child.update_bounds();
            child_ids.push(child.id);
            let child_id = child.id;
            self.shapes.push(child);
            self.notify(ChangeEvent::ShapeAdded(child_id));
        }

        self.selection = child_ids;
        self.notify_selection_changed();
        self.reanchor_links();
    }
}
