use std::collections::HashSet;

use eframe::egui;

use super::{ChangeEvent, DiagramStore};
use crate::model::{Shape, ShapeKind};

impl DiagramStore {
    /// Finds the shape a click at `pos` lands on, honoring z-order.
    ///
    /// Composites win outright: a composite is a candidate when the point
    /// falls inside one of its direct children, and the first such composite
    /// in iteration order is returned (composites carry no depth to compare).
    /// Otherwise the hit goes to the deepest basic candidate that is topmost
    /// within its overlap group; a candidate covered by a deeper intersecting
    /// shape yields no hit at all.
    pub fn topmost_shape_at(&self, pos: egui::Pos2) -> Option<u64> {
        let mut basic_candidates: Vec<&Shape> = Vec::new();
        for shape in &self.shapes {
            match &shape.kind {
                ShapeKind::Basic { .. } => {
                    if shape.contains(pos) {
                        basic_candidates.push(shape);
                    }
                }
                ShapeKind::Composite { children, .. } => {
                    if children.iter().any(|child| child.contains(pos)) {
                        return Some(shape.id);
                    }
                }
            }
        }

        basic_candidates
            .into_iter()
            .filter(|shape| self.is_topmost_in_overlap(shape))
            .max_by_key(|shape| shape.depth().unwrap_or(0))
            .map(|shape| shape.id)
    }

    /// A basic shape is topmost when no other basic shape whose box
    /// intersects its box carries a strictly greater depth. Depth is only
    /// meaningful between shapes that actually overlap, so the comparison
    /// never leaves the intersecting set. Composites always pass.
    pub(super) fn is_topmost_in_overlap(&self, target: &Shape) -> bool {
        let Some(depth) = target.depth() else {
            return true;
        };
        let rect = target.bounds();
        !self.shapes.iter().any(|other| {
            other.id != target.id
                && other.depth().is_some_and(|d| d > depth)
                && other.bounds().intersects(rect)
        })
    }

    /// Depth for a shape about to be created: one above everything its box
    /// intersects, or 0 on untouched canvas. Depths elsewhere are undisturbed.
    pub(super) fn depth_for_new(&self, rect: egui::Rect) -> i32 {
        let mut max_overlap_depth = -1;
        for shape in &self.shapes {
            if let Some(depth) = shape.depth() {
                if shape.bounds().intersects(rect) {
                    max_overlap_depth = max_overlap_depth.max(depth);
                }
            }
        }
        max_overlap_depth + 1
    }

    /// Raises a basic shape above every other basic shape, globally. Used on
    /// drag release. No-op for composites, which have no depth.
    pub fn bring_to_front(&mut self, id: u64) -> bool {
        let max_depth = self
            .shapes
            .iter()
            .filter_map(Shape::depth)
            .max()
            .unwrap_or(0);
        let Some(shape) = self.shapes.iter_mut().find(|shape| shape.id == id) else {
            return false;
        };
        match &mut shape.kind {
            ShapeKind::Basic { depth, .. } => {
                *depth = max_depth + 1;
                self.notify(ChangeEvent::ShapeModified(id));
                true
            }
            ShapeKind::Composite { .. } => false,
        }
    }

    /// Marquee selection. Composites whose direct children all fit inside
    /// `rect` are selected whole (their children are claimed and skipped);
    /// remaining fully-enclosed basic shapes join if they are topmost in
    /// their overlap group. An empty result leaves the selection untouched.
    pub fn select_in_rect(&mut self, rect: egui::Rect, additive: bool) {
        let mut new_selection: Vec<u64> = Vec::new();
        let mut claimed: HashSet<u64> = HashSet::new();

        for shape in &self.shapes {
            if let ShapeKind::Composite { children, .. } = &shape.kind {
                if !children.is_empty()
                    && children.iter().all(|child| rect.contains_rect(child.bounds()))
                {
                    new_selection.push(shape.id);
                    claimed.extend(children.iter().map(|child| child.id));
                }
            }
        }

        for shape in &self.shapes {
            if shape.is_composite() || claimed.contains(&shape.id) {
                continue;
            }
            if rect.contains_rect(shape.bounds()) && self.is_topmost_in_overlap(shape) {
                new_selection.push(shape.id);
            }
        }

        if new_selection.is_empty() {
            return;
        }
        if !additive {
            self.selection.clear();
        }
        for id in new_selection {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
        self.notify_selection_changed();
    }
}
