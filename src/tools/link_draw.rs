use eframe::egui;

use super::Tool;
use crate::model::LinkType;
use crate::store::{DiagramStore, LINK_SNAP_DISTANCE};

#[derive(Clone, Copy, Debug)]
struct PendingLink {
    from: u64,
    from_port: egui::Pos2,
    cursor: egui::Pos2,
}

/// The link-drawing tool. A press on a shape's port anchors the gesture; the
/// release snaps to the nearest port of a different shape within the snap
/// threshold and commits a link, or discards the gesture silently.
pub struct LinkTool {
    link_type: LinkType,
    pending: Option<PendingLink>,
}

impl LinkTool {
    pub fn new(link_type: LinkType) -> Self {
        Self {
            link_type,
            pending: None,
        }
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// The live authoring path, anchor port to cursor, while anchored.
    pub fn path(&self) -> Option<[egui::Pos2; 2]> {
        self.pending.map(|p| [p.from_port, p.cursor])
    }
}

impl Tool for LinkTool {
    fn pointer_down(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        let Some(shape) = store.topmost_shape_at(pos) else {
            return false;
        };
        let Some(port) = store.port_at(shape, pos) else {
            return false;
        };
        self.pending = Some(PendingLink {
            from: shape,
            from_port: port,
            cursor: pos,
        });
        true
    }

    fn pointer_drag(&mut self, _store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        match &mut self.pending {
            Some(pending) => {
                pending.cursor = pos;
                true
            }
            None => false,
        }
    }

    fn pointer_up(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if let Some(hit) = store.closest_top_port(pos, LINK_SNAP_DISTANCE) {
            if hit.shape != pending.from {
                store.create_link(
                    pending.from,
                    hit.shape,
                    pending.from_port,
                    hit.port,
                    self.link_type,
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicForm, RectF, Shape};

    fn store_with_pair() -> DiagramStore {
        let mut store = DiagramStore::new();
        store.add_shape(Shape::basic(
            1,
            BasicForm::Rect,
            RectF::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(120.0, 80.0)),
            0,
        ));
        store.add_shape(Shape::basic(
            2,
            BasicForm::Oval,
            RectF::from_min_size(egui::pos2(50.0, 200.0), egui::vec2(120.0, 80.0)),
            0,
        ));
        store
    }

    #[test]
    fn full_gesture_commits_a_link() {
        let mut store = store_with_pair();
        let mut tool = LinkTool::new(LinkType::Generalization);

        // Press on the rectangle's bottom-center port (60, 80).
        assert!(tool.pointer_down(&mut store, egui::pos2(62.0, 78.0)));
        tool.pointer_drag(&mut store, egui::pos2(90.0, 150.0));
        assert_eq!(
            tool.path(),
            Some([egui::pos2(60.0, 80.0), egui::pos2(90.0, 150.0)])
        );

        // Release near the oval's top-center port (110, 200).
        tool.pointer_up(&mut store, egui::pos2(105.0, 205.0));
        assert!(tool.path().is_none());

        let link = &store.links()[0];
        assert_eq!(link.from, 1);
        assert_eq!(link.to, 2);
        assert_eq!(link.start.to_pos2(), egui::pos2(60.0, 80.0));
        assert_eq!(link.end.to_pos2(), egui::pos2(110.0, 200.0));
        assert_eq!(link.link_type, LinkType::Generalization);
        assert_eq!(link.path.len(), 2);
    }

    #[test]
    fn press_away_from_a_port_does_not_anchor() {
        let mut store = store_with_pair();
        let mut tool = LinkTool::new(LinkType::Association);
        assert!(!tool.pointer_down(&mut store, egui::pos2(60.0, 40.0)));
        assert!(tool.path().is_none());
    }

    #[test]
    fn release_without_a_target_discards_the_gesture() {
        let mut store = store_with_pair();
        let mut tool = LinkTool::new(LinkType::Association);
        tool.pointer_down(&mut store, egui::pos2(60.0, 80.0));
        tool.pointer_up(&mut store, egui::pos2(400.0, 400.0));
        assert!(store.links().is_empty());
        assert!(tool.path().is_none());
    }

    #[test]
    fn release_on_the_anchor_shape_is_rejected() {
        let mut store = store_with_pair();
        let mut tool = LinkTool::new(LinkType::Association);
        tool.pointer_down(&mut store, egui::pos2(60.0, 80.0));
        // Released on another port of the same rectangle.
        tool.pointer_up(&mut store, egui::pos2(60.0, 0.0));
        assert!(store.links().is_empty());
    }
}
