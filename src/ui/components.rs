use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Single-line input. `cursor` is a byte index that always sits on a char
/// boundary, so accented country names can be typed and edited.
#[derive(Clone, Default)]
pub struct TextField {
    pub text: String,
    pub cursor: usize,
}

impl TextField {
    pub fn insert_char(&mut self, c: char) { self.text.insert(self.cursor, c); self.cursor += c.len_utf8(); }
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.remove(prev);
            self.cursor = prev;
        }
    }
    pub fn delete(&mut self) { if self.cursor < self.text.len() { self.text.remove(self.cursor); } }
    pub fn move_left(&mut self) { if let Some(prev) = self.prev_boundary() { self.cursor = prev; } }
    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() { self.cursor += ch.len_utf8(); }
    }
    pub fn home(&mut self) { self.cursor = 0; }
    pub fn end(&mut self) { self.cursor = self.text.len(); }
    pub fn clear(&mut self) { self.text.clear(); self.cursor = 0; }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }
}

// Bash-style block cursor that covers the char (no shifting)
pub fn field_line_text<'a>(label: &str, field: &TextField, focused: bool) -> Line<'a> {
    let label_s = format!("{label}: ");
    let text = field.text.as_str();
    let cur = field.cursor.min(text.len());
    let label_span = Span::styled(label_s, Style::default().fg(Color::Yellow));

    if !focused {
        return Line::from(vec![label_span, Span::raw(text.to_string())]);
    }

    let (left, rest) = text.split_at(cur);
    let block = |s: &str| {
        Span::styled(
            s.to_string(),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    if let Some(ch) = rest.chars().next() {
        let after = &rest[ch.len_utf8()..];
        Line::from(vec![
            label_span,
            Span::raw(left.to_string()),
            block(&ch.to_string()),
            Span::raw(after.to_string()),
        ])
    } else {
        Line::from(vec![label_span, Span::raw(left.to_string()), block(" ")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_multibyte_text_keeps_char_boundaries() {
        let mut tf = TextField::default();
        for c in "Côte".chars() {
            tf.insert_char(c);
        }
        tf.move_left();
        tf.move_left();
        tf.move_left();
        assert_eq!(&tf.text[tf.cursor..], "ôte");
        tf.backspace();
        assert_eq!(tf.text, "ôte");
        tf.move_right();
        tf.delete();
        assert_eq!(tf.text, "ôe");
        tf.end();
        tf.backspace();
        tf.backspace();
        assert_eq!(tf.text, "");
        tf.backspace();
        assert_eq!(tf.cursor, 0);
    }
}
