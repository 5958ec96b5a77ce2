use eframe::egui;

use super::Tool;
use crate::store::DiagramStore;

#[derive(Clone, Copy, Debug)]
enum SelectState {
    Idle,
    /// Moving a hit shape; `last` is the pointer position the previous delta
    /// was taken from.
    Dragging {
        shape: u64,
        last: egui::Pos2,
    },
    /// Rubber-banding a marquee rectangle from `anchor`.
    Marquee {
        anchor: egui::Pos2,
        cursor: egui::Pos2,
    },
}

/// The select tool: click-selects and drags shapes, or rubber-bands a
/// marquee over empty canvas.
pub struct SelectTool {
    state: SelectState,
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            state: SelectState::Idle,
        }
    }

    pub fn marquee_rect(&self) -> Option<egui::Rect> {
        match self.state {
            SelectState::Marquee { anchor, cursor } => {
                Some(egui::Rect::from_two_pos(anchor, cursor))
            }
            _ => None,
        }
    }
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SelectTool {
    fn pointer_down(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        match store.topmost_shape_at(pos) {
            Some(id) => {
                store.set_selection(vec![id]);
                self.state = SelectState::Dragging {
                    shape: id,
                    last: pos,
                };
            }
            None => {
                self.state = SelectState::Marquee {
                    anchor: pos,
                    cursor: pos,
                };
            }
        }
        true
    }

    fn pointer_drag(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        match &mut self.state {
            SelectState::Dragging { shape, last } => {
                let delta = pos - *last;
                *last = pos;
                let shape = *shape;
                store.translate_shape(shape, delta);
                store.reanchor_links();
                true
            }
            SelectState::Marquee { cursor, .. } => {
                *cursor = pos;
                true
            }
            SelectState::Idle => false,
        }
    }

    fn pointer_up(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        match self.state {
            SelectState::Dragging { shape, .. } => {
                store.bring_to_front(shape);
                self.state = SelectState::Idle;
                true
            }
            SelectState::Marquee { anchor, .. } => {
                let rect = egui::Rect::from_two_pos(anchor, pos);
                store.select_in_rect(rect, false);
                self.state = SelectState::Idle;
                true
            }
            SelectState::Idle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicForm, RectF, Shape};

    fn basic(id: u64, x: f32, y: f32, w: f32, h: f32, depth: i32) -> Shape {
        Shape::basic(
            id,
            BasicForm::Rect,
            RectF::from_min_size(egui::pos2(x, y), egui::vec2(w, h)),
            depth,
        )
    }

    #[test]
    fn click_selects_and_drag_moves() {
        let mut store = DiagramStore::new();
        store.add_shape(basic(1, 0.0, 0.0, 100.0, 100.0, 0));
        let mut tool = SelectTool::new();

        assert!(tool.pointer_down(&mut store, egui::pos2(50.0, 50.0)));
        assert_eq!(store.selection(), &[1]);

        tool.pointer_drag(&mut store, egui::pos2(60.0, 55.0));
        tool.pointer_drag(&mut store, egui::pos2(70.0, 60.0));
        assert_eq!(
            store.shape(1).unwrap().bounds().min,
            egui::pos2(20.0, 10.0)
        );

        tool.pointer_up(&mut store, egui::pos2(70.0, 60.0));
        // Release raises the shape above the global maximum depth.
        assert_eq!(store.shape(1).unwrap().depth(), Some(1));
    }

    #[test]
    fn empty_click_starts_marquee_and_up_commits_it() {
        let mut store = DiagramStore::new();
        store.add_shape(basic(1, 100.0, 100.0, 50.0, 50.0, 0));
        let mut tool = SelectTool::new();

        tool.pointer_down(&mut store, egui::pos2(0.0, 0.0));
        tool.pointer_drag(&mut store, egui::pos2(300.0, 200.0));
        assert_eq!(
            tool.marquee_rect(),
            Some(egui::Rect::from_min_max(
                egui::pos2(0.0, 0.0),
                egui::pos2(300.0, 200.0)
            ))
        );

        tool.pointer_up(&mut store, egui::pos2(300.0, 200.0));
        assert_eq!(store.selection(), &[1]);
        assert!(tool.marquee_rect().is_none());
    }

    #[test]
    fn dragging_a_group_moves_children_and_links() {
        let mut store = DiagramStore::new();
        store.add_shape(basic(1, 0.0, 0.0, 40.0, 40.0, 0));
        store.add_shape(basic(2, 60.0, 0.0, 40.0, 40.0, 0));
        store.set_selection(vec![1, 2]);
        store.group_selection();
        let group_id = store.shapes()[0].id;

        let mut tool = SelectTool::new();
        tool.pointer_down(&mut store, egui::pos2(20.0, 20.0));
        assert_eq!(store.selection(), &[group_id]);
        tool.pointer_drag(&mut store, egui::pos2(30.0, 25.0));

        let group = store.shape(group_id).unwrap();
        assert_eq!(group.bounds().min, egui::pos2(10.0, 5.0));
        assert_eq!(group.find(1).unwrap().bounds().min, egui::pos2(10.0, 5.0));
    }
}
