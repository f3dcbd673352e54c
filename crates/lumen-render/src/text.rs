//! Text layout heuristics.
//!
//! There are no real font metrics here. Wrapping estimates the character
//! budget as `floor(width / (fontSize * 0.6))`, and both targets use the same
//! estimate, so line breaks match between preview and export.

use lumen_style::TextStyle;

/// Average glyph advance as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// One emitted line of a multi-line block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Baseline y of this line.
    pub y: f64,
    /// Distance from the previous emitted line's baseline (0 for the first).
    pub dy: f64,
}

/// Layout result.
#[derive(Debug, Clone, PartialEq)]
pub enum TextLayout {
    /// One line, vertically centered on the box.
    Single {
        /// Anchor x.
        x: f64,
        /// Baseline y (box middle, with a central baseline).
        y: f64,
        /// Content.
        text: String,
    },
    /// Several lines, the block vertically centered.
    Lines {
        /// Anchor x.
        x: f64,
        /// Emitted lines (blank lines skipped).
        lines: Vec<TextLine>,
    },
}

/// Maximum characters per wrapped line, at least 1.
#[must_use]
pub fn max_chars_per_line(width: f64, font_size: f64) -> usize {
    let per_char = font_size * CHAR_WIDTH_FACTOR;
    if per_char <= 0.0 {
        return 1;
    }
    ((width / per_char).floor() as usize).max(1)
}

/// Greedy word packing. A word longer than `max_chars` gets its own line.
#[must_use]
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if current_len > 0 && current_len + 1 + len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += len;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out a text layer in a `w × h` box.
#[must_use]
pub fn layout_text(style: &TextStyle, w: f64, h: f64) -> TextLayout {
    let x = style.text_align.anchor_x(w);
    if !style.word_wrap && !style.text.contains('\n') {
        return TextLayout::Single {
            x,
            y: h / 2.0,
            text: style.text.clone(),
        };
    }

    let max_chars = max_chars_per_line(w, style.font_size);
    let raw_lines: Vec<String> = style
        .text
        .split('\n')
        .flat_map(|line| {
            let line = line.trim_end_matches('\r');
            if style.word_wrap && !line.trim().is_empty() {
                wrap_words(line, max_chars)
            } else {
                vec![line.to_string()]
            }
        })
        .collect();

    let line_height = style.font_size * style.line_height;
    let total_height = line_height * raw_lines.len() as f64;
    let top = (h - total_height) / 2.0 + style.font_size;

    let mut lines = Vec::new();
    let mut previous_y: Option<f64> = None;
    for (i, text) in raw_lines.into_iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let y = top + line_height * i as f64;
        let dy = previous_y.map_or(0.0, |prev| y - prev);
        previous_y = Some(y);
        lines.push(TextLine { text, y, dy });
    }
    TextLayout::Lines { x, lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_words_greedy() {
        assert_eq!(wrap_words("aa bb cc", 5), ["aa bb", "cc"]);
        assert_eq!(wrap_words("extraordinary a", 4), ["extraordinary", "a"]);
        assert_eq!(wrap_words("", 4), [""]);
    }

    #[test]
    fn test_max_chars_at_least_one() {
        assert_eq!(max_chars_per_line(1.0, 100.0), 1);
        assert_eq!(max_chars_per_line(120.0, 20.0), 10);
    }
}
