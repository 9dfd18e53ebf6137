//! Changes to the document's selection mask.

pub mod clear_selection;
pub mod select_rectangle;

pub use clear_selection::ClearSelection;
pub use select_rectangle::{SelectRectangle, SelectionMode};
