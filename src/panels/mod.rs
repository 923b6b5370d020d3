mod canvas_panel;
mod palette_panel;
mod properties_panel;
mod toolbar;

pub use canvas_panel::{CanvasAction, canvas_panel, paint_node};
pub use palette_panel::palette_panel;
pub use properties_panel::properties_panel;
pub use toolbar::{ToolbarAction, toolbar};
