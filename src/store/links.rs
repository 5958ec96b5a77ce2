use eframe::egui;
use tracing::{debug, trace};

use super::{ChangeEvent, DiagramStore};
use crate::model::{Link, LinkType, Point, PortHit};

/// Half-extent of the square capture box around a port when starting a link.
pub const PORT_CAPTURE_HALF: f32 = 5.0;

/// How far a link release may land from a port and still snap onto it.
pub const LINK_SNAP_DISTANCE: f32 = 15.0;

impl DiagramStore {
    pub fn create_link(
        &mut self,
        from: u64,
        to: u64,
        start: egui::Pos2,
        end: egui::Pos2,
        link_type: LinkType,
    ) -> u64 {
        let id = self.alloc_id();
        debug!(id, from, to, kind = link_type.name(), "create link");
        self.links.push(Link::new(id, from, to, start, end, link_type));
        self.notify(ChangeEvent::LinkAdded(id));
        id
    }

    pub fn remove_link(&mut self, id: u64) -> bool {
        let Some(index) = self.links.iter().position(|link| link.id == id) else {
            return false;
        };
        self.links.remove(index);
        self.notify(ChangeEvent::LinkRemoved(id));
        true
    }

    /// The port of `shape_id` whose capture box contains `pos`, if any.
    pub fn port_at(&self, shape_id: u64, pos: egui::Pos2) -> Option<egui::Pos2> {
        let shape = self.shape(shape_id)?;
        shape.connection_ports().into_iter().find(|port| {
            egui::Rect::from_center_size(*port, egui::vec2(PORT_CAPTURE_HALF * 2.0, PORT_CAPTURE_HALF * 2.0))
                .contains(pos)
        })
    }

    /// Nearest port of the topmost shape under `pos`, within `threshold`.
    /// This is the snap target for releasing a link gesture.
    pub fn closest_top_port(&self, pos: egui::Pos2, threshold: f32) -> Option<PortHit> {
        let top = self.topmost_shape_at(pos)?;
        let shape = self.shape(top)?;

        let mut best: Option<egui::Pos2> = None;
        let mut best_dist = f32::INFINITY;
        for port in shape.connection_ports() {
            let dist = port.distance(pos);
            if dist <= threshold && dist < best_dist {
                best_dist = dist;
                best = Some(port);
            }
        }
        best.map(|port| PortHit { shape: top, port })
    }

    /// Re-anchors every link after its endpoint shapes may have moved: each
    /// endpoint snaps to the port of its shape nearest the previous endpoint
    /// position, recursing into composite endpoints, and the rendered path
    /// collapses to `[start, end]`. Runs after every move, group, and
    /// ungroup. Links whose endpoint id no longer resolves are left alone.
    pub fn reanchor_links(&mut self) {
        let mut updates: Vec<(usize, Option<egui::Pos2>, Option<egui::Pos2>)> = Vec::new();
        for (index, link) in self.links.iter().enumerate() {
            let new_start = self
                .shape(link.from)
                .and_then(|shape| shape.closest_port(link.start.to_pos2()))
                .map(|hit| hit.port);
            let new_end = self
                .shape(link.to)
                .and_then(|shape| shape.closest_port(link.end.to_pos2()))
                .map(|hit| hit.port);
            if new_start.is_some() || new_end.is_some() {
                updates.push((index, new_start, new_end));
            }
        }

        let mut modified = Vec::new();
        for (index, new_start, new_end) in updates {
            let link = &mut self.links[index];
            let old_start = link.start;
            let old_end = link.end;
            if let Some(start) = new_start {
                link.start = Point::from_pos2(start);
            }
            if let Some(end) = new_end {
                link.end = Point::from_pos2(end);
            }
            let path = vec![link.start, link.end];
            let changed = link.start != old_start || link.end != old_end || link.path != path;
            link.path = path;
            if changed {
                modified.push(link.id);
            }
        }
        trace!(count = modified.len(), "reanchored links");
        for id in modified {
            self.notify(ChangeEvent::LinkModified(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicForm, RectF, Shape};

    fn basic(id: u64, form: BasicForm, x: f32, y: f32, w: f32, h: f32, depth: i32) -> Shape {
        Shape::basic(
            id,
            form,
            RectF::from_min_size(egui::pos2(x, y), egui::vec2(w, h)),
            depth,
        )
    }

    fn two_shape_store() -> DiagramStore {
        let mut store = DiagramStore::new();
        store.add_shape(basic(1, BasicForm::Rect, 0.0, 0.0, 120.0, 80.0, 0));
        store.add_shape(basic(2, BasicForm::Oval, 50.0, 200.0, 120.0, 80.0, 0));
        store.next_id = 3;
        store
    }

    #[test]
    fn port_at_uses_capture_box() {
        let store = two_shape_store();
        // Rectangle top-center port is (60, 0); 4px away still captures.
        assert_eq!(
            store.port_at(1, egui::pos2(63.0, 2.0)),
            Some(egui::pos2(60.0, 0.0))
        );
        assert_eq!(store.port_at(1, egui::pos2(80.0, 30.0)), None);
    }

    #[test]
    fn closest_top_port_respects_threshold() {
        let store = two_shape_store();
        // Oval left-center port is (50, 240).
        let hit = store
            .closest_top_port(egui::pos2(58.0, 236.0), LINK_SNAP_DISTANCE)
            .unwrap();
        assert_eq!(hit.shape, 2);
        assert_eq!(hit.port, egui::pos2(50.0, 240.0));
        assert!(
            store
                .closest_top_port(egui::pos2(110.0, 240.0), LINK_SNAP_DISTANCE)
                .is_none()
        );
    }

    #[test]
    fn reanchor_follows_moved_endpoint() {
        let mut store = DiagramStore::new();
        store.add_shape(basic(1, BasicForm::Rect, 0.0, 0.0, 120.0, 80.0, 0));
        store.add_shape(basic(2, BasicForm::Oval, 50.0, 20.0, 120.0, 80.0, 1));
        store.next_id = 3;
        // R top-center to O left-center.
        store.create_link(
            1,
            2,
            egui::pos2(60.0, 0.0),
            egui::pos2(50.0, 60.0),
            LinkType::Association,
        );

        store.translate_shape(2, egui::vec2(30.0, 0.0));
        store.reanchor_links();

        let link = &store.links()[0];
        assert_eq!(link.end.to_pos2(), egui::pos2(80.0, 60.0));
        assert_eq!(link.path.len(), 2);
        assert_eq!(link.path[0], link.start);
        assert_eq!(link.path[1], link.end);
    }

    #[test]
    fn reanchor_recurses_into_composite_endpoint() {
        let mut store = DiagramStore::new();
        let a = basic(1, BasicForm::Oval, 0.0, 0.0, 40.0, 40.0, 0);
        let b = basic(2, BasicForm::Oval, 100.0, 0.0, 40.0, 40.0, 0);
        store.add_shape(Shape::composite(3, vec![a, b]));
        store.add_shape(basic(4, BasicForm::Rect, 0.0, 200.0, 40.0, 40.0, 0));
        store.next_id = 5;
        // Link ends on the composite itself; the nearest descendant port wins
        // after the group moves.
        store.create_link(
            4,
            3,
            egui::pos2(20.0, 200.0),
            egui::pos2(120.0, 40.0),
            LinkType::Generalization,
        );

        store.translate_shape(3, egui::vec2(0.0, 10.0));
        store.reanchor_links();

        let link = &store.links()[0];
        assert_eq!(link.end.to_pos2(), egui::pos2(120.0, 50.0));
    }

    #[test]
    fn authored_waypoints_collapse_on_reanchor() {
        let mut store = two_shape_store();
        let id = store.create_link(
            1,
            2,
            egui::pos2(60.0, 80.0),
            egui::pos2(110.0, 200.0),
            LinkType::Composition,
        );
        // Simulate a stale authoring path.
        store.links[0].path.push(Point { x: 999.0, y: 999.0 });

        store.reanchor_links();
        let link = store.link(id).unwrap();
        assert_eq!(link.path.len(), 2);
    }

    #[test]
    fn removing_a_shape_cascades_to_its_links() {
        let mut store = two_shape_store();
        store.create_link(
            1,
            2,
            egui::pos2(60.0, 80.0),
            egui::pos2(110.0, 200.0),
            LinkType::Association,
        );
        assert_eq!(store.links().len(), 1);

        assert!(store.remove_shape(2));
        assert!(store.links().is_empty());
    }
}
