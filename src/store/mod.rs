use eframe::egui;
use tracing::debug;

use crate::model::{BasicForm, Label, Link, RectF, Shape, ShapeKind};

mod groups;
mod hit;
mod links;

pub use links::{LINK_SNAP_DISTANCE, PORT_CAPTURE_HALF};

/// One mutation of the store, delivered synchronously to every listener
/// before the mutating call returns. Entities are referred to by id; removed
/// ids are no longer resolvable by the time the event fires.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    ShapeAdded(u64),
    ShapeRemoved(u64),
    ShapeModified(u64),
    LinkAdded(u64),
    LinkRemoved(u64),
    LinkModified(u64),
    SelectionChanged(Vec<u64>),
}

pub type ListenerId = u64;

type ListenerFn = Box<dyn FnMut(&ChangeEvent)>;

/// The authoritative diagram: top-level shapes, links, the current selection,
/// and the change-listener registry. All mutation goes through methods here;
/// listeners are read-only observers and must not call back into a mutating
/// operation from inside their callback.
#[derive(Default)]
pub struct DiagramStore {
    shapes: Vec<Shape>,
    links: Vec<Link>,
    selection: Vec<u64>,
    listeners: Vec<(ListenerId, ListenerFn)>,
    next_id: u64,
    next_listener_id: ListenerId,
}

impl DiagramStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn notify(&mut self, event: ChangeEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn notify_selection_changed(&mut self) {
        let event = ChangeEvent::SelectionChanged(self.selection.clone());
        self.notify(event);
    }

    pub(crate) fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn selection(&self) -> &[u64] {
        &self.selection
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.contains(&id)
    }

    /// Looks a shape up by id, descending into composites.
    pub fn shape(&self, id: u64) -> Option<&Shape> {
        self.shapes.iter().find_map(|shape| shape.find(id))
    }

    pub fn link(&self, id: u64) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }

    /// Top-level shapes in ascending depth order for painting; composites
    /// have no depth and sort as depth 0.
    pub fn shapes_by_depth(&self) -> Vec<&Shape> {
        let mut out: Vec<&Shape> = self.shapes.iter().collect();
        out.sort_by_key(|shape| shape.depth().unwrap_or(0));
        out
    }

    /// Adds a new default-size basic shape at `pos`, depth assigned by the
    /// overlap rule so it lands on top of everything it intersects. The
    /// selection is left untouched.
    pub fn create_shape(&mut self, form: BasicForm, pos: egui::Pos2) -> u64 {
        let rect = RectF::from_min_size(pos, form.default_size());
        let depth = self.depth_for_new(rect.to_rect());
        let id = self.alloc_id();
        debug!(id, ?form, depth, "create shape");
        self.shapes.push(Shape::basic(id, form, rect, depth));
        self.notify(ChangeEvent::ShapeAdded(id));
        id
    }

    pub fn add_shape(&mut self, shape: Shape) {
        let id = shape.id;
        self.shapes.push(shape);
        self.notify(ChangeEvent::ShapeAdded(id));
    }

    /// Removes a top-level shape and every link attached to it or to one of
    /// its descendants. Links never outlive an endpoint shape.
    pub fn remove_shape(&mut self, id: u64) -> bool {
        let Some(index) = self.shapes.iter().position(|shape| shape.id == id) else {
            return false;
        };
        let shape = self.shapes.remove(index);

        let mut dropped_links = Vec::new();
        self.links.retain(|link| {
            if shape.owns(link.from) || shape.owns(link.to) {
                dropped_links.push(link.id);
                false
            } else {
                true
            }
        });

        let selection_changed = self.selection.contains(&id);
        self.selection.retain(|sel| *sel != id);

        self.notify(ChangeEvent::ShapeRemoved(id));
        for link_id in dropped_links {
            self.notify(ChangeEvent::LinkRemoved(link_id));
        }
        if selection_changed {
            self.notify_selection_changed();
        }
        true
    }

    pub fn set_selection(&mut self, selection: Vec<u64>) {
        self.selection = selection;
        self.notify_selection_changed();
    }

    /// Moves a top-level shape (and, for composites, every descendant) by
    /// `delta`. Callers driving a drag gesture follow up with
    /// [`DiagramStore::reanchor_links`].
    pub fn translate_shape(&mut self, id: u64, delta: egui::Vec2) -> bool {
        let Some(shape) = self.shapes.iter_mut().find(|shape| shape.id == id) else {
            return false;
        };
        shape.translate(delta);
        self.notify(ChangeEvent::ShapeModified(id));
        true
    }

    /// Replaces the label of a basic shape. Fires nothing; the label dialog
    /// caller reports the edit through [`DiagramStore::shape_modified`].
    pub fn set_label(&mut self, id: u64, label: Option<Label>) -> bool {
        for shape in &mut self.shapes {
            if let Some(target) = shape.find_mut(id) {
                return match &mut target.kind {
                    ShapeKind::Basic { label: slot, .. } => {
                        *slot = label;
                        true
                    }
                    ShapeKind::Composite { .. } => false,
                };
            }
        }
        false
    }

    /// External mutators (the label dialog) call this to broadcast an edit
    /// they performed through the shape accessors.
    pub fn shape_modified(&mut self, id: u64) {
        self.notify(ChangeEvent::ShapeModified(id));
    }

    pub fn link_modified(&mut self, id: u64) {
        self.notify(ChangeEvent::LinkModified(id));
    }
}
