//! Drawing contract between the engine and whatever puts cells on screen.

use crate::catalog::PieceKind;

/// What a drawn cell belongs to. Renderers style each layer differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Locked,
    /// Landing preview of the active piece.
    Ghost,
    Active,
}

/// A surface addressed in grid cells. Layers arrive in order Locked, Ghost, Active.
///
/// The kind is passed rather than a colour so a renderer can restyle pieces;
/// `PieceKind::color` is the reference colour.
pub trait Canvas {
    fn fill_cell(&mut self, x: usize, y: usize, kind: PieceKind, layer: Layer);
}
