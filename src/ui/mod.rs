pub mod command;
pub mod repl;
pub mod terminal;

use crate::form::FormSession;

/// Where the session draws its output: the text area, the input-fields
/// region, and modal dialogs.
pub trait Surface {
    /// Replace the contents of the output area.
    fn show_text(&mut self, text: &str);
    /// Display `form` in the input region. The caller has already cleared any
    /// previous form.
    fn show_form(&mut self, form: &FormSession);
    /// Tear down the input region.
    fn clear_form(&mut self);
    fn show_info(&mut self, title: &str, message: &str);
    fn show_error(&mut self, title: &str, message: &str);
}

pub use command::{parse_command, Command, TableRef};
pub use terminal::TerminalSurface;
