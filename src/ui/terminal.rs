use std::io::{self, Write};

use log::warn;

use crate::form::FormSession;
use crate::ui::Surface;

const FORM_CLOSED: &str = "(форма закрыта)";

/// Line-oriented surface: the output area, forms and dialogs are printed to
/// `out` one after another.
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        TerminalSurface { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print `text` without a newline and flush, for input prompts.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub fn println(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("terminal write failed: {}", e);
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn show_text(&mut self, text: &str) {
        self.emit(text.trim_end_matches('\n'));
    }

    fn show_form(&mut self, form: &FormSession) {
        let mut text = format!("[{}] {}", form.table(), form.submit_label());
        for (i, field) in form.fields().iter().enumerate() {
            text.push_str(&format!("\n  {}. {}: {}", i + 1, field.label, field.text()));
        }
        self.emit(&text);
    }

    fn clear_form(&mut self) {
        self.emit(FORM_CLOSED);
    }

    fn show_info(&mut self, title: &str, message: &str) {
        self.emit(&format!("[{}] {}", title, message));
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.emit(&format!("[{}] {}", title, message));
    }
}
