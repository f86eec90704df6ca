//! Single-line editable field used by the dashboard form.
//!
//! The cursor is tracked in characters rather than bytes, so inserts and
//! deletes never split a UTF-8 sequence.

#[derive(Clone, Debug, Default)]
pub struct TextField {
    value: String,
    /// Cursor position, counted in chars from the start.
    cursor: usize,
    masked: bool,
}

impl TextField {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            masked: false,
        }
    }

    /// A field whose contents render as bullets.
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(offset, _)| offset)
    }

    pub fn insert(&mut self, ch: char) {
        let offset = self.byte_offset(self.cursor);
        self.value.insert(offset, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.value.remove(offset);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let offset = self.byte_offset(self.cursor);
            self.value.remove(offset);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut field = TextField::with_value("héllo");
        field.move_left();
        field.move_left();
        field.move_left();
        field.backspace();
        assert_eq!(field.value(), "hllo");
        field.insert('é');
        assert_eq!(field.value(), "héllo");
        assert_eq!(field.cursor(), 2);
        field.move_end();
        field.delete();
        assert_eq!(field.value(), "héllo");
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut field = TextField::masked();
        field.backspace();
        field.insert('x');
        field.move_home();
        field.backspace();
        assert_eq!(field.value(), "x");
        assert!(field.is_masked());
    }
}
