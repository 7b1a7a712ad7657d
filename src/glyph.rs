/// A horizontal run of characters, each painted with a 256-color index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    cells: Vec<(char, u8)>,
}

// Character pairs that swap when art is mirrored.
const MIRROR_PAIRS: [(char, char); 7] = [
    ('<', '>'),
    ('[', ']'),
    ('{', '}'),
    ('(', ')'),
    ('/', '\\'),
    ('d', 'b'),
    ('q', 'p'),
];

impl Glyph {
    pub fn uniform(text: &str, color: u8) -> Self {
        Self {
            cells: text.chars().map(|ch| (ch, color)).collect(),
        }
    }

    /// Colors char `i` with `pigment[i]`, reusing the last pigment for any
    /// chars past the end. An empty pigment falls back to white.
    pub fn pigmented(text: &str, pigment: &[u8]) -> Self {
        let cells = text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                let color = pigment
                    .get(i.min(pigment.len().saturating_sub(1)))
                    .copied()
                    .unwrap_or(15);
                (ch, color)
            })
            .collect();
        Self { cells }
    }

    pub fn width(&self) -> i32 {
        self.cells.len() as i32
    }

    pub fn text(&self) -> String {
        self.cells.iter().map(|(ch, _)| *ch).collect()
    }

    pub fn cells(&self) -> &[(char, u8)] {
        &self.cells
    }

    pub fn recolor(&mut self, color: u8) {
        for cell in &mut self.cells {
            cell.1 = color;
        }
    }
}

/// Reverses fish art so it faces the other way, e.g. `><'>` becomes `<'><`.
pub fn mirror(text: &str) -> String {
    text.chars()
        .rev()
        .map(|ch| {
            MIRROR_PAIRS
                .iter()
                .find_map(|&(a, b)| {
                    if ch == a {
                        Some(b)
                    } else if ch == b {
                        Some(a)
                    } else {
                        None
                    }
                })
                .unwrap_or(ch)
        })
        .collect()
}
