#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod drag;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod id_generator;
pub mod panels;
pub mod persistence;
pub mod registry;
pub mod renderer;
pub mod selection;
pub mod store;
pub mod util;

pub use app::BuilderApp;
pub use command::{Command, CommandHistory};
pub use config::{BuilderKind, EditorConfig};
pub use drag::{DragController, DragPayload, DragState, DropTarget};
pub use editor::{Editor, FlowHandler};
pub use element::{Element, Properties};
pub use id_generator::ElementId;
pub use registry::{ElementRegistry, ElementTypeDescriptor};
pub use renderer::{RenderNode, render};
pub use selection::EditSession;
pub use store::{ElementStore, InsertPosition, Location};
