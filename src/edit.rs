/// In-place cell editing
///
/// A table has at most one open edit. The session is bound to the edited
/// row's origin index, not its current position, and holds the pending text
/// until the table commits or cancels it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    origin: usize,
    column: usize,
    text: String,
}

impl EditSession {
    pub(crate) fn new(origin: usize, column: usize, text: String) -> Self {
        EditSession {
            origin,
            column,
            text,
        }
    }

    /// Origin index of the row being edited
    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Pending text, not yet written to the cell
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
