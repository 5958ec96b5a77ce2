use eframe::egui;

mod create;
mod link_draw;
mod select;

pub use create::CreateTool;
pub use link_draw::LinkTool;
pub use select::SelectTool;

use crate::error::ToolError;
use crate::model::{BasicForm, LinkType};
use crate::store::DiagramStore;

/// The tools the host's toolbar can activate, keyed by their wire names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolMode {
    Select,
    Association,
    Generalization,
    Composition,
    Rect,
    Oval,
}

impl ToolMode {
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Association => "association",
            ToolMode::Generalization => "generalization",
            ToolMode::Composition => "composition",
            ToolMode::Rect => "rect",
            ToolMode::Oval => "oval",
        }
    }

    /// Resolves a toolbar wire name. An unknown name is a configuration
    /// defect, not user input, and is reported as an error.
    pub fn from_name(name: &str) -> Result<Self, ToolError> {
        match name {
            "select" => Ok(ToolMode::Select),
            "association" => Ok(ToolMode::Association),
            "generalization" => Ok(ToolMode::Generalization),
            "composition" => Ok(ToolMode::Composition),
            "rect" => Ok(ToolMode::Rect),
            "oval" => Ok(ToolMode::Oval),
            other => Err(ToolError::UnknownMode(other.to_string())),
        }
    }

    pub fn is_link_mode(self) -> bool {
        matches!(
            self,
            ToolMode::Association | ToolMode::Generalization | ToolMode::Composition
        )
    }

    pub fn is_create_mode(self) -> bool {
        matches!(self, ToolMode::Rect | ToolMode::Oval)
    }

    pub fn link_type(self) -> Result<LinkType, ToolError> {
        match self {
            ToolMode::Association => Ok(LinkType::Association),
            ToolMode::Generalization => Ok(LinkType::Generalization),
            ToolMode::Composition => Ok(LinkType::Composition),
            other => Err(ToolError::NotLinkMode(other.name())),
        }
    }
}

/// A pointer-gesture state machine for one tool mode. Each handler reports
/// whether it consumed the event; unhandled or out-of-band input is ignored.
pub trait Tool {
    fn pointer_down(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool;
    fn pointer_drag(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool;
    fn pointer_up(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool;
}

/// Owns the diagram store and one instance of each tool state machine, and
/// routes pointer events to whichever the active mode names. The host view
/// feeds it raw pointer positions and reads the store (plus the live marquee
/// and pending-link paths) back for painting.
pub struct Editor {
    store: DiagramStore,
    mode: ToolMode,
    select: SelectTool,
    create: CreateTool,
    link: LinkTool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            store: DiagramStore::new(),
            mode: ToolMode::Select,
            select: SelectTool::new(),
            create: CreateTool::new(BasicForm::Rect),
            link: LinkTool::new(LinkType::Association),
        }
    }

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DiagramStore {
        &mut self.store
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switches the active tool, discarding any gesture in flight.
    pub fn set_mode(&mut self, mode: ToolMode) -> Result<(), ToolError> {
        self.select = SelectTool::new();
        self.link = LinkTool::new(self.link.link_type());
        match mode {
            ToolMode::Rect => self.create = CreateTool::new(BasicForm::Rect),
            ToolMode::Oval => self.create = CreateTool::new(BasicForm::Oval),
            ToolMode::Association | ToolMode::Generalization | ToolMode::Composition => {
                self.link = LinkTool::new(mode.link_type()?);
            }
            ToolMode::Select => {}
        }
        self.mode = mode;
        Ok(())
    }

    pub fn pointer_down(&mut self, pos: egui::Pos2) -> bool {
        if !pos_is_finite(pos) {
            return false;
        }
        match self.mode {
            ToolMode::Select => self.select.pointer_down(&mut self.store, pos),
            ToolMode::Rect | ToolMode::Oval => self.create.pointer_down(&mut self.store, pos),
            _ => self.link.pointer_down(&mut self.store, pos),
        }
    }

    pub fn pointer_drag(&mut self, pos: egui::Pos2) -> bool {
        if !pos_is_finite(pos) {
            return false;
        }
        match self.mode {
            ToolMode::Select => self.select.pointer_drag(&mut self.store, pos),
            ToolMode::Rect | ToolMode::Oval => self.create.pointer_drag(&mut self.store, pos),
            _ => self.link.pointer_drag(&mut self.store, pos),
        }
    }

    pub fn pointer_up(&mut self, pos: egui::Pos2) -> bool {
        if !pos_is_finite(pos) {
            return false;
        }
        match self.mode {
            ToolMode::Select => self.select.pointer_up(&mut self.store, pos),
            ToolMode::Rect | ToolMode::Oval => self.create.pointer_up(&mut self.store, pos),
            _ => self.link.pointer_up(&mut self.store, pos),
        }
    }

    /// Live marquee rectangle while the select tool is rubber-banding.
    pub fn marquee_rect(&self) -> Option<egui::Rect> {
        self.select.marquee_rect()
    }

    /// Live two-point path while a link gesture is anchored.
    pub fn pending_link_path(&self) -> Option<[egui::Pos2; 2]> {
        self.link.path()
    }
}

fn pos_is_finite(pos: egui::Pos2) -> bool {
    pos.x.is_finite() && pos.y.is_finite()
}
