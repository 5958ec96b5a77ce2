use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn from_pos2(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RectF {
    pub min: Point,
    pub max: Point,
}

impl RectF {
    pub fn from_min_max(a: egui::Pos2, b: egui::Pos2) -> Self {
        let min = egui::pos2(a.x.min(b.x), a.y.min(b.y));
        let max = egui::pos2(a.x.max(b.x), a.y.max(b.y));
        Self {
            min: Point::from_pos2(min),
            max: Point::from_pos2(max),
        }
    }

    pub fn from_min_size(min: egui::Pos2, size: egui::Vec2) -> Self {
        Self::from_min_max(min, min + size)
    }

    pub fn from_rect(rect: egui::Rect) -> Self {
        Self::from_min_max(rect.min, rect.max)
    }

    pub fn to_rect(self) -> egui::Rect {
        egui::Rect::from_min_max(self.min.to_pos2(), self.max.to_pos2())
    }

    pub fn translate(&mut self, delta: egui::Vec2) {
        self.min.x += delta.x;
        self.min.y += delta.y;
        self.max.x += delta.x;
        self.max.y += delta.y;
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_premultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn from_color32(c: egui::Color32) -> Self {
        let [r, g, b, a] = c.to_array();
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Outline drawn behind a shape's label text.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum LabelKind {
    #[default]
    Rect,
    Oval,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub text: String,
    #[serde(default)]
    pub kind: LabelKind,
    #[serde(default)]
    pub color: Rgba,
    #[serde(default = "default_label_font_size")]
    pub font_size: f32,
}

fn default_label_font_size() -> f32 {
    12.0
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LabelKind::Rect,
            color: Rgba::WHITE,
            font_size: default_label_font_size(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BasicForm {
    Rect,
    Oval,
}

impl BasicForm {
    /// Size a freshly created shape of this form gets at the click point.
    pub fn default_size(self) -> egui::Vec2 {
        match self {
            BasicForm::Rect => egui::vec2(100.0, 120.0),
            BasicForm::Oval => egui::vec2(120.0, 80.0),
        }
    }
}

/// A port candidate together with the shape that owns it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortHit {
    pub shape: u64,
    pub port: egui::Pos2,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Shape {
    pub id: u64,
    pub kind: ShapeKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ShapeKind {
    Basic {
        form: BasicForm,
        rect: RectF,
        depth: i32,
        #[serde(default)]
        label: Option<Label>,
    },
    /// A group of owned child shapes. `bounds` caches the tight union of the
    /// children's bounds and is refreshed by `update_bounds`.
    Composite {
        children: Vec<Shape>,
        bounds: RectF,
    },
}

impl Shape {
    pub fn basic(id: u64, form: BasicForm, rect: RectF, depth: i32) -> Self {
        Self {
            id,
            kind: ShapeKind::Basic {
                form,
                rect,
                depth,
                label: None,
            },
        }
    }

    pub fn composite(id: u64, children: Vec<Shape>) -> Self {
        let mut shape = Self {
            id,
            kind: ShapeKind::Composite {
                children,
                bounds: RectF::default(),
            },
        };
        shape.update_bounds();
        shape
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ShapeKind::Composite { .. })
    }

    /// Depth of a basic shape. Composites have none; occlusion logic must
    /// not compare them.
    pub fn depth(&self) -> Option<i32> {
        match &self.kind {
            ShapeKind::Basic { depth, .. } => Some(*depth),
            ShapeKind::Composite { .. } => None,
        }
    }

    pub fn label(&self) -> Option<&Label> {
        match &self.kind {
            ShapeKind::Basic { label, .. } => label.as_ref(),
            ShapeKind::Composite { .. } => None,
        }
    }

    pub fn bounds(&self) -> egui::Rect {
        match &self.kind {
            ShapeKind::Basic { rect, .. } => rect.to_rect(),
            ShapeKind::Composite { bounds, .. } => bounds.to_rect(),
        }
    }

    pub fn contains(&self, pos: egui::Pos2) -> bool {
        self.bounds().contains(pos)
    }

    pub fn children(&self) -> &[Shape] {
        match &self.kind {
            ShapeKind::Basic { .. } => &[],
            ShapeKind::Composite { children, .. } => children,
        }
    }

    /// Fixed anchor points links may attach to. Rectangles expose corners and
    /// edge midpoints; ovals and composites expose the four cardinal
    /// midpoints. Composite ports sit on the derived bounds, not on children.
    pub fn connection_ports(&self) -> Vec<egui::Pos2> {
        let r = self.bounds();
        let cx = (r.min.x + r.max.x) * 0.5;
        let cy = (r.min.y + r.max.y) * 0.5;
        match &self.kind {
            ShapeKind::Basic {
                form: BasicForm::Rect,
                ..
            } => vec![
                egui::pos2(r.min.x, r.min.y),
                egui::pos2(cx, r.min.y),
                egui::pos2(r.max.x, r.min.y),
                egui::pos2(r.max.x, cy),
                egui::pos2(r.max.x, r.max.y),
                egui::pos2(cx, r.max.y),
                egui::pos2(r.min.x, r.max.y),
                egui::pos2(r.min.x, cy),
            ],
            ShapeKind::Basic {
                form: BasicForm::Oval,
                ..
            } => vec![
                egui::pos2(cx, r.min.y),
                egui::pos2(r.min.x, cy),
                egui::pos2(r.max.x, cy),
                egui::pos2(cx, r.max.y),
            ],
            ShapeKind::Composite { .. } => vec![
                egui::pos2(cx, r.min.y),
                egui::pos2(r.max.x, cy),
                egui::pos2(cx, r.max.y),
                egui::pos2(r.min.x, cy),
            ],
        }
    }

    /// Moves the shape, recursively moving every descendant of a composite,
    /// then refreshes derived bounds bottom-up.
    pub fn translate(&mut self, delta: egui::Vec2) {
        match &mut self.kind {
            ShapeKind::Basic { rect, .. } => rect.translate(delta),
            ShapeKind::Composite { children, .. } => {
                for child in children.iter_mut() {
                    child.translate(delta);
                }
                self.update_bounds();
            }
        }
    }

    /// Recomputes a composite's bounds as the tight union of its children's
    /// bounds, descending into nested composites first. No-op for basic
    /// shapes and for empty composites.
    pub fn update_bounds(&mut self) {
        let ShapeKind::Composite { children, bounds } = &mut self.kind else {
            return;
        };
        let mut union: Option<egui::Rect> = None;
        for child in children.iter_mut() {
            child.update_bounds();
            let b = child.bounds();
            union = Some(match union {
                Some(u) => u.union(b),
                None => b,
            });
        }
        if let Some(u) = union {
            *bounds = RectF::from_rect(u);
        }
    }

    pub fn find(&self, id: u64) -> Option<&Shape> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Shape> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            ShapeKind::Basic { .. } => None,
            ShapeKind::Composite { children, .. } => {
                children.iter_mut().find_map(|child| child.find_mut(id))
            }
        }
    }

    /// Whether `id` names this shape or any shape owned below it.
    pub fn owns(&self, id: u64) -> bool {
        self.find(id).is_some()
    }

    /// Nearest port to `to`. A basic shape searches its own ports; a
    /// composite searches every descendant's ports depth-first and falls back
    /// to its own ports when it has no children.
    pub fn closest_port(&self, to: egui::Pos2) -> Option<PortHit> {
        match &self.kind {
            ShapeKind::Basic { .. } => self.closest_own_port(to),
            ShapeKind::Composite { children, .. } => {
                let mut best: Option<PortHit> = None;
                let mut best_dist = f32::INFINITY;
                for child in children {
                    if let Some(hit) = child.closest_port(to) {
                        let dist = hit.port.distance(to);
                        if dist < best_dist {
                            best_dist = dist;
                            best = Some(hit);
                        }
                    }
                }
                if best.is_none() {
                    best = self.closest_own_port(to);
                }
                best
            }
        }
    }

    fn closest_own_port(&self, to: egui::Pos2) -> Option<PortHit> {
        self.connection_ports()
            .into_iter()
            .min_by(|a, b| a.distance(to).total_cmp(&b.distance(to)))
            .map(|port| PortHit {
                shape: self.id,
                port,
            })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkType {
    Association,
    Generalization,
    Composition,
}

impl LinkType {
    pub fn name(self) -> &'static str {
        match self {
            LinkType::Association => "association",
            LinkType::Generalization => "generalization",
            LinkType::Composition => "composition",
        }
    }
}

/// A typed connection between two shapes. `from`/`to` are id references into
/// the store, not owners; `start`/`end` coincide with a port of the endpoint
/// shape after every re-anchoring pass, and `path` is the rendered polyline
/// (exactly `[start, end]` once a link is committed).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub id: u64,
    pub from: u64,
    pub to: u64,
    pub start: Point,
    pub end: Point,
    pub path: Vec<Point>,
    pub link_type: LinkType,
}

impl Link {
    pub fn new(
        id: u64,
        from: u64,
        to: u64,
        start: egui::Pos2,
        end: egui::Pos2,
        link_type: LinkType,
    ) -> Self {
        Self {
            id,
            from,
            to,
            start: Point::from_pos2(start),
            end: Point::from_pos2(end),
            path: vec![Point::from_pos2(start), Point::from_pos2(end)],
            link_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_at(x: f32, y: f32, w: f32, h: f32) -> RectF {
        RectF::from_min_size(egui::pos2(x, y), egui::vec2(w, h))
    }

    #[test]
    fn rect_ports_cover_corners_and_midpoints() {
        let shape = Shape::basic(1, BasicForm::Rect, rect_at(0.0, 0.0, 100.0, 120.0), 0);
        let ports = shape.connection_ports();
        assert_eq!(ports.len(), 8);
        assert!(ports.contains(&egui::pos2(0.0, 0.0)));
        assert!(ports.contains(&egui::pos2(50.0, 0.0)));
        assert!(ports.contains(&egui::pos2(100.0, 60.0)));
        assert!(ports.contains(&egui::pos2(50.0, 120.0)));
    }

    #[test]
    fn oval_ports_are_cardinal_midpoints() {
        let shape = Shape::basic(1, BasicForm::Oval, rect_at(50.0, 20.0, 120.0, 80.0), 0);
        let ports = shape.connection_ports();
        assert_eq!(
            ports,
            vec![
                egui::pos2(110.0, 20.0),
                egui::pos2(50.0, 60.0),
                egui::pos2(170.0, 60.0),
                egui::pos2(110.0, 100.0),
            ]
        );
    }

    #[test]
    fn composite_bounds_are_tight_union() {
        let a = Shape::basic(1, BasicForm::Rect, rect_at(0.0, 0.0, 120.0, 80.0), 0);
        let b = Shape::basic(2, BasicForm::Oval, rect_at(50.0, 20.0, 120.0, 80.0), 1);
        let group = Shape::composite(3, vec![a, b]);
        assert_eq!(
            group.bounds(),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(170.0, 100.0))
        );
    }

    #[test]
    fn translating_composite_moves_descendants_and_bounds() {
        let a = Shape::basic(1, BasicForm::Rect, rect_at(0.0, 0.0, 10.0, 10.0), 0);
        let b = Shape::basic(2, BasicForm::Rect, rect_at(20.0, 0.0, 10.0, 10.0), 0);
        let inner = Shape::composite(3, vec![b]);
        let mut outer = Shape::composite(4, vec![a, inner]);

        outer.translate(egui::vec2(5.0, -3.0));

        assert_eq!(
            outer.bounds(),
            egui::Rect::from_min_max(egui::pos2(5.0, -3.0), egui::pos2(35.0, 7.0))
        );
        let leaf = outer.find(2).unwrap();
        assert_eq!(
            leaf.bounds(),
            egui::Rect::from_min_max(egui::pos2(25.0, -3.0), egui::pos2(35.0, 7.0))
        );
    }

    #[test]
    fn closest_port_recurses_into_nested_composites() {
        let a = Shape::basic(1, BasicForm::Oval, rect_at(0.0, 0.0, 20.0, 20.0), 0);
        let b = Shape::basic(2, BasicForm::Oval, rect_at(100.0, 0.0, 20.0, 20.0), 0);
        let inner = Shape::composite(3, vec![b]);
        let outer = Shape::composite(4, vec![a, inner]);

        let hit = outer.closest_port(egui::pos2(125.0, 10.0)).unwrap();
        assert_eq!(hit.shape, 2);
        assert_eq!(hit.port, egui::pos2(120.0, 10.0));
    }

    #[test]
    fn empty_composite_falls_back_to_own_ports() {
        let mut group = Shape::composite(1, vec![]);
        if let ShapeKind::Composite { bounds, .. } = &mut group.kind {
            *bounds = rect_at(0.0, 0.0, 40.0, 40.0);
        }
        let hit = group.closest_port(egui::pos2(20.0, -5.0)).unwrap();
        assert_eq!(hit.shape, 1);
        assert_eq!(hit.port, egui::pos2(20.0, 0.0));
    }
}
