//! Grid geometry: dots, edges, boxes, and the adjacency between them.
//!
//! A board is described by a row-major table of presence flags. Rows may be
//! of different lengths; missing cells are simply absent dots, which is how
//! non-rectangular boards are expressed. From that table we derive:
//! - every edge (two present dots one unit apart along one axis)
//! - every box (four present dots forming a unit square)
//! - for every edge, the at most two boxes it borders
//!
//! Edges and boxes are addressed by dense indices so the board state can keep
//! flat vectors, the same way a position indexes its points.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, MoveError};

/// Index of an edge in [`Grid::edges`].
pub type EdgeId = usize;

/// Index of a box in [`Grid::boxes`].
pub type BoxId = usize;

/// A dot, by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub row: usize,
    pub col: usize,
}

impl Vertex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An unordered pair of adjacent dots.
///
/// The smaller dot is always stored first, so `Edge::new(a, b)` and
/// `Edge::new(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "[Vertex; 2]", into = "[Vertex; 2]")]
pub struct Edge {
    from: Vertex,
    to: Vertex,
}

impl Edge {
    /// Build the edge joining two dots, which must be adjacent.
    pub fn new(a: Vertex, b: Vertex) -> Result<Self, MoveError> {
        let dr = a.row.abs_diff(b.row);
        let dc = a.col.abs_diff(b.col);
        if dr + dc != 1 {
            return Err(MoveError::NotAdjacent { from: a, to: b });
        }
        Ok(Self::ordered(a, b))
    }

    fn ordered(a: Vertex, b: Vertex) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// The upper (or left) dot.
    pub fn source(&self) -> Vertex {
        self.from
    }

    /// The lower (or right) dot.
    pub fn dest(&self) -> Vertex {
        self.to
    }

    pub fn is_horizontal(&self) -> bool {
        self.from.row == self.to.row
    }
}

impl TryFrom<[Vertex; 2]> for Edge {
    type Error = MoveError;

    fn try_from([a, b]: [Vertex; 2]) -> Result<Self, Self::Error> {
        Edge::new(a, b)
    }
}

impl From<Edge> for [Vertex; 2] {
    fn from(edge: Edge) -> Self {
        [edge.from, edge.to]
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Row-major presence table describing which dots exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotMap {
    rows: Vec<Vec<bool>>,
}

impl DotMap {
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        Self { rows }
    }

    /// A full `rows` x `cols` rectangle of dots.
    pub fn rectangular(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![true; cols]; rows],
        }
    }

    /// Parse a JSON board description: an array of rows whose cells are
    /// `0`/`1` or `false`/`true`.
    pub fn from_json(text: &str) -> Result<Self, GeometryError> {
        let raw: Vec<Vec<serde_json::Value>> =
            serde_json::from_str(text).map_err(|e| GeometryError::Malformed(e.to_string()))?;

        let mut rows = Vec::with_capacity(raw.len());
        for (row, cells) in raw.iter().enumerate() {
            let mut flags = Vec::with_capacity(cells.len());
            for (col, cell) in cells.iter().enumerate() {
                let present = match cell {
                    serde_json::Value::Bool(b) => *b,
                    serde_json::Value::Number(n) if n.as_u64() == Some(0) => false,
                    serde_json::Value::Number(n) if n.as_u64() == Some(1) => true,
                    other => {
                        return Err(GeometryError::InvalidCell {
                            row,
                            col,
                            value: other.to_string(),
                        });
                    }
                };
                flags.push(present);
            }
            rows.push(flags);
        }
        Ok(Self { rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }
}

/// A unit square and its four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxCell {
    /// Row of the top-left dot.
    pub row: usize,
    /// Column of the top-left dot.
    pub col: usize,
    pub top: EdgeId,
    pub bottom: EdgeId,
    pub left: EdgeId,
    pub right: EdgeId,
}

impl BoxCell {
    /// Sides in top, bottom, left, right order.
    pub fn edges(&self) -> [EdgeId; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Immutable geometry of one board.
#[derive(Debug, Clone)]
pub struct Grid {
    map: DotMap,
    edges: Vec<Edge>,
    lookup: HashMap<Edge, EdgeId>,
    /// Boxes bordering each edge: the box below/right first, then above/left.
    borders: Vec<[Option<BoxId>; 2]>,
    boxes: Vec<BoxCell>,
}

impl Grid {
    /// Derive edges and boxes from a dot map.
    pub fn new(map: &DotMap) -> Result<Self, GeometryError> {
        if map.height() == 0 {
            return Err(GeometryError::Empty);
        }

        let mut edges = Vec::new();
        let mut lookup = HashMap::new();
        for row in 0..map.height() {
            for col in 0..map.width() {
                if !map.is_present(row, col) {
                    continue;
                }
                let v = Vertex::new(row, col);
                for (r, c) in [(row, col + 1), (row + 1, col)] {
                    if map.is_present(r, c) {
                        let edge = Edge::ordered(v, Vertex::new(r, c));
                        lookup.insert(edge, edges.len());
                        edges.push(edge);
                    }
                }
            }
        }

        let mut grid = Grid {
            map: map.clone(),
            borders: vec![[None, None]; edges.len()],
            edges,
            lookup,
            boxes: Vec::new(),
        };

        for row in 0..map.height().saturating_sub(1) {
            for col in 0..map.width().saturating_sub(1) {
                let corners = [(row, col), (row, col + 1), (row + 1, col), (row + 1, col + 1)];
                if !corners.iter().all(|&(r, c)| map.is_present(r, c)) {
                    continue;
                }
                let (Some(top), Some(bottom), Some(left), Some(right)) = (
                    grid.edge_between((row, col), (row, col + 1)),
                    grid.edge_between((row + 1, col), (row + 1, col + 1)),
                    grid.edge_between((row, col), (row + 1, col)),
                    grid.edge_between((row, col + 1), (row + 1, col + 1)),
                ) else {
                    continue;
                };
                let id = grid.boxes.len();
                grid.borders[top][0] = Some(id);
                grid.borders[left][0] = Some(id);
                grid.borders[bottom][1] = Some(id);
                grid.borders[right][1] = Some(id);
                grid.boxes.push(BoxCell {
                    row,
                    col,
                    top,
                    bottom,
                    left,
                    right,
                });
            }
        }

        if grid.boxes.is_empty() {
            return Err(GeometryError::NoBoxes);
        }
        Ok(grid)
    }

    /// Full rectangle of `rows` x `cols` dots.
    pub fn rectangular(rows: usize, cols: usize) -> Result<Self, GeometryError> {
        Self::new(&DotMap::rectangular(rows, cols))
    }

    fn edge_between(&self, a: (usize, usize), b: (usize, usize)) -> Option<EdgeId> {
        let edge = Edge::ordered(Vertex::new(a.0, a.1), Vertex::new(b.0, b.1));
        self.lookup.get(&edge).copied()
    }

    pub fn dot_map(&self) -> &DotMap {
        &self.map
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn boxes(&self) -> &[BoxCell] {
        &self.boxes
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_boxes(&self) -> usize {
        self.boxes.len()
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.edges.get(id).copied()
    }

    pub fn edge_id(&self, edge: &Edge) -> Option<EdgeId> {
        self.lookup.get(edge).copied()
    }

    pub fn box_cell(&self, id: BoxId) -> Option<&BoxCell> {
        self.boxes.get(id)
    }

    /// The boxes an edge borders (zero, one or two).
    pub fn boxes_of(&self, id: EdgeId) -> impl Iterator<Item = BoxId> + '_ {
        self.borders
            .get(id)
            .into_iter()
            .flat_map(|pair| pair.iter().flatten().copied())
    }
}
