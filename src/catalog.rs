//! Piece catalog: kinds, shape templates, cell ids and display colours.

use ratatui::style::Color;
use std::sync::LazyLock;

/// Piece kinds. Discriminant order is the cell id order (T = 1 .. X = 11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    T,
    O,
    L,
    J,
    I,
    S,
    Z,
    U,
    P,
    Q,
    X,
}

/// Rectangular matrix of filled/empty flags, row-major, origin top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Shape {
    /// Build from rows of 0/1 flags. All rows must have the same length.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        debug_assert!(rows.iter().all(|r| r.len() == width), "ragged shape");
        let cells = rows
            .iter()
            .flat_map(|r| r.iter().map(|&v| v != 0))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// (x, y) of every filled cell, row by row.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| (i % self.width, i / self.width))
    }

    /// Quarter turn: transpose, then reverse the row order.
    /// An H×W shape becomes W×H; new[i][j] = old[j][W-1-i].
    pub fn rotated(&self) -> Self {
        let (w, h) = (self.height, self.width);
        let mut cells = vec![false; w * h];
        for i in 0..h {
            for j in 0..w {
                cells[i * w + j] = self.is_filled(self.width - 1 - i, j);
            }
        }
        Self {
            width: w,
            height: h,
            cells,
        }
    }
}

const TEMPLATES: [&[&[u8]]; 11] = [
    &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[1, 1], &[1, 1]],
    &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
    &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
    &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
    &[&[1, 0, 1], &[1, 1, 1], &[0, 0, 0]],
    &[&[1, 1], &[1, 1], &[1, 0]],
    &[&[1, 1], &[1, 0], &[1, 1]],
    &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]],
];

static SHAPES: LazyLock<Vec<Shape>> =
    LazyLock::new(|| TEMPLATES.iter().map(|rows| Shape::from_rows(rows)).collect());

impl PieceKind {
    pub const ALL: [Self; 11] = [
        Self::T,
        Self::O,
        Self::L,
        Self::J,
        Self::I,
        Self::S,
        Self::Z,
        Self::U,
        Self::P,
        Self::Q,
        Self::X,
    ];

    /// Cell value written into the grid when this kind locks (1..=11).
    #[inline]
    pub fn id(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
    }

    /// Unrotated template.
    pub fn shape(self) -> &'static Shape {
        &SHAPES[self as usize]
    }

    pub fn color(self) -> Color {
        match self {
            Self::T => Color::Rgb(0xB0, 0xBE, 0xC5), // silver
            Self::O => Color::Rgb(0xFF, 0xD6, 0x00), // bright yellow
            Self::L => Color::Rgb(0xFF, 0x6D, 0x00), // vivid orange
            Self::J => Color::Rgb(0x29, 0x79, 0xFF), // bright blue
            Self::I => Color::Rgb(0x00, 0xE5, 0xFF), // cyan
            Self::S => Color::Rgb(0x00, 0xC8, 0x53), // green
            Self::Z => Color::Rgb(0xFF, 0x17, 0x44), // red
            Self::U => Color::Rgb(0xD5, 0x00, 0xF9), // magenta
            Self::P => Color::Rgb(0x6D, 0x4C, 0x41), // brown
            Self::Q => Color::Rgb(0x76, 0xFF, 0x03), // lime
            Self::X => Color::Rgb(0xF5, 0xF5, 0xF5), // soft white
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::T => "T",
            Self::O => "O",
            Self::L => "L",
            Self::J => "J",
            Self::I => "I",
            Self::S => "S",
            Self::Z => "Z",
            Self::U => "U",
            Self::P => "P",
            Self::Q => "Q",
            Self::X => "X",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_distinct_and_dense() {
        let ids: HashSet<u8> = PieceKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids, (1..=11).collect());
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PieceKind::from_id(0), None);
        assert_eq!(PieceKind::from_id(12), None);
    }

    #[test]
    fn colours_are_distinct() {
        let colours: HashSet<String> = PieceKind::ALL
            .iter()
            .map(|k| format!("{:?}", k.color()))
            .collect();
        assert_eq!(colours.len(), PieceKind::ALL.len());
    }

    #[test]
    fn i_piece_uses_full_bounding_box() {
        let s = PieceKind::I.shape();
        assert_eq!((s.width(), s.height()), (4, 4));
        assert_eq!(s.filled().collect::<Vec<_>>(), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn every_template_has_cells() {
        for kind in PieceKind::ALL {
            assert!(kind.shape().filled().count() > 0, "{} is empty", kind.name());
        }
    }

    #[test]
    fn rotation_transposes_then_reverses_rows() {
        // T: 010/111/000 -> 010/110/010
        let r = PieceKind::T.shape().rotated();
        assert_eq!(r, Shape::from_rows(&[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0]]));
    }

    #[test]
    fn rotation_of_rectangle_swaps_dimensions() {
        // P: 11/11/10 -> 110/111
        let r = PieceKind::P.shape().rotated();
        assert_eq!((r.width(), r.height()), (3, 2));
        assert_eq!(r, Shape::from_rows(&[&[1, 1, 0], &[1, 1, 1]]));
    }

    #[test]
    fn four_rotations_are_identity() {
        for kind in PieceKind::ALL {
            let s = kind.shape();
            let back = s.rotated().rotated().rotated().rotated();
            assert_eq!(&back, s, "{}", kind.name());
        }
    }
}
