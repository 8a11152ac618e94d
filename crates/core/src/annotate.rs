//! Splices generated markup into highlighted HTML at source coordinates.
//!
//! The highlighted text is walked once while tracking `(line, character)` in
//! the coordinate space of the original plain text: tags are zero-width, an
//! entity is one character, anything else counts in UTF-16 code units as
//! LSIF positions do.

use lsp_types::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInsertion {
    pub position: Position,
    pub text: String,
}

impl AnnotationInsertion {
    pub fn new(position: Position, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Insertions waiting to be emitted, ordered by position and then by
/// submission order.
struct Pending<'a> {
    queue: Vec<&'a AnnotationInsertion>,
    cursor: usize,
}

impl<'a> Pending<'a> {
    fn new(insertions: &'a [AnnotationInsertion]) -> Self {
        let mut queue: Vec<_> = insertions.iter().collect();
        // stable: equal positions keep submission order
        queue.sort_by_key(|i| (i.position.line, i.position.character));
        Self { queue, cursor: 0 }
    }

    /// Emit every insertion at or before `(line, character)`.
    fn flush_through(&mut self, line: u32, character: u32, out: &mut String) {
        while let Some(next) = self.queue.get(self.cursor) {
            if (next.position.line, next.position.character) > (line, character) {
                break;
            }
            out.push_str(&next.text);
            self.cursor += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.queue.len()
    }
}

pub fn merge(highlighted: &str, insertions: &[AnnotationInsertion]) -> String {
    if insertions.is_empty() {
        return highlighted.to_string();
    }

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(highlighted.len() + extra);
    let mut pending = Pending::new(insertions);
    let (mut line, mut character) = (0u32, 0u32);
    let mut rest = highlighted;

    while let Some(c) = rest.chars().next() {
        let consumed = match c {
            '<' => {
                let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
                out.push_str(&rest[..end]);
                end
            }
            '\n' => {
                // Positions past the end of the line still close here.
                pending.flush_through(line, u32::MAX, &mut out);
                out.push('\n');
                line += 1;
                character = 0;
                1
            }
            '&' => {
                pending.flush_through(line, character, &mut out);
                let end = entity_len(rest).unwrap_or(1);
                out.push_str(&rest[..end]);
                character += 1;
                end
            }
            _ => {
                pending.flush_through(line, character, &mut out);
                out.push(c);
                character += c.len_utf16() as u32;
                c.len_utf8()
            }
        };
        rest = &rest[consumed..];
    }

    if !pending.is_done() {
        pending.flush_through(u32::MAX, u32::MAX, &mut out);
    }
    out
}

/// Length of an entity such as `&amp;` or `&#x27;` at the start of `s`.
fn entity_len(s: &str) -> Option<usize> {
    let semi = s.find(';')?;
    let body = &s[1..semi];
    let valid = !body.is_empty()
        && body.len() <= 32
        && body
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_alphanumeric() || (i == 0 && c == '#'));
    valid.then_some(semi + 1)
}
