use eframe::egui;

use super::Tool;
use crate::model::BasicForm;
use crate::store::DiagramStore;

/// The rectangle/oval creation tool. Stateless: every press drops one
/// default-size shape at the click point; drags and releases do nothing.
pub struct CreateTool {
    form: BasicForm,
}

impl CreateTool {
    pub fn new(form: BasicForm) -> Self {
        Self { form }
    }

    pub fn form(&self) -> BasicForm {
        self.form
    }
}

impl Tool for CreateTool {
    fn pointer_down(&mut self, store: &mut DiagramStore, pos: egui::Pos2) -> bool {
        store.create_shape(self.form, pos);
        true
    }

    fn pointer_drag(&mut self, _store: &mut DiagramStore, _pos: egui::Pos2) -> bool {
        false
    }

    fn pointer_up(&mut self, _store: &mut DiagramStore, _pos: egui::Pos2) -> bool {
        false
    }
}
