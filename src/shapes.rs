//! Shape catalog: the 7 piece geometries and their rotation transform.

use rand::{SeedableRng as _, prelude::StdRng, seq::IndexedRandom as _};

/// Side length of the square grid every shape lives in.
pub const GRID_SIZE: usize = 4;

/// A shape orientation: 4×4 mask of filled cells.
pub type ShapeGrid = [[bool; GRID_SIZE]; GRID_SIZE];

/// Piece kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const fn mask(rows: [&[u8; GRID_SIZE]; GRID_SIZE]) -> ShapeGrid {
    let mut out = [[false; GRID_SIZE]; GRID_SIZE];
    let mut r = 0;
    while r < GRID_SIZE {
        let mut c = 0;
        while c < GRID_SIZE {
            out[r][c] = rows[r][c] == b'#';
            c += 1;
        }
        r += 1;
    }
    out
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Canonical base orientation. Every kind fills exactly 4 cells.
    pub fn base_grid(self) -> ShapeGrid {
        match self {
            Self::I => mask([b"....", b"####", b"....", b"...."]),
            Self::O => mask([b".##.", b".##.", b"....", b"...."]),
            Self::T => mask([b"....", b"..#.", b".###", b"...."]),
            Self::S => mask([b".#..", b".##.", b"..#.", b"...."]),
            Self::Z => mask([b"..#.", b".##.", b".#..", b"...."]),
            Self::J => mask([b"..#.", b"..#.", b".##.", b"...."]),
            Self::L => mask([b".#..", b".#..", b".##.", b"...."]),
        }
    }
}

/// An immutable shape: its kind plus a grid in the base orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub grid: ShapeGrid,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            grid: kind.base_grid(),
        }
    }
}

/// Clockwise quarter-turn of a shape grid. Rotating four times yields the
/// original grid; rotation produces a new grid, never a stored alternate.
pub fn rotate_cw(grid: &ShapeGrid) -> ShapeGrid {
    let mut out = [[false; GRID_SIZE]; GRID_SIZE];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = grid[GRID_SIZE - 1 - c][r];
        }
    }
    out
}

/// Source of fresh shapes for the session. Injected at construction so
/// tests can script the sequence.
pub trait ShapeCatalog: std::fmt::Debug {
    fn next_shape(&mut self) -> Shape;
}

/// Production catalog: draws uniformly at random among the 7 kinds.
#[derive(Debug, Clone)]
pub struct RandomCatalog {
    rng: StdRng,
}

impl RandomCatalog {
    /// The random seed is initialized from the OS's random data source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fixed seed, for reproducible piece sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeCatalog for RandomCatalog {
    fn next_shape(&mut self) -> Shape {
        let kind = ShapeKind::ALL
            .choose(&mut self.rng)
            .expect("catalog is non-empty");
        Shape::new(*kind)
    }
}

/// Deterministic catalog for tests: yields a fixed sequence, cycling.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedCatalog {
    kinds: Vec<ShapeKind>,
    next: usize,
}

#[cfg(test)]
impl ScriptedCatalog {
    pub fn new(kinds: Vec<ShapeKind>) -> Self {
        Self { kinds, next: 0 }
    }
}

#[cfg(test)]
impl ShapeCatalog for ScriptedCatalog {
    fn next_shape(&mut self) -> Shape {
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next += 1;
        Shape::new(kind)
    }
}
