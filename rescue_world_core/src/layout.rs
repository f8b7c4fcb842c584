//! Building layouts and their text format.
//!
//! A layout file holds, in order and one record per line:
//!
//! 1. `height` rows of `width` four-digit wall codes (`up left down right`,
//!    `1` = wall).
//! 2. 3 point-of-interest lines: `row col kind`, kind `v` (victim) or `f`.
//! 3. 10 fire lines: `row col`.
//! 4. 8 door lines: `row col row col`, the two cells the door joins.
//! 5. 4 entrance lines: `row col`.
//!
//! Rows and columns are 1-based. Sections have a fixed number of lines, so a
//! shorter file simply leaves the later sections empty. Blank lines are
//! ignored, as is anything after the entrance section.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    Direction, Position,
    map::{Grid, GridError},
    poi::PoiKind,
    world::Walls,
};

pub const DEFAULT_WIDTH: usize = 8;
pub const DEFAULT_HEIGHT: usize = 6;

const POI_LINES: usize = 3;
const FIRE_LINES: usize = 10;
const DOOR_LINES: usize = 8;
const ENTRANCE_LINES: usize = 4;

/// Built-in layout used when no file is given or the file cannot be used.
pub const DEFAULT_LAYOUT: &str = "\
1100 1000 1000 1001 1100 1000 0000 1001
0000 0000 0000 0001 0100 0000 0000 0001
0110 0010 0010 0011 0110 0010 0010 0001
1100 1000 1000 1000 1000 1001 1100 0001
0100 0000 0000 0000 0000 0001 0100 0000
0110 0010 0000 0010 0010 0011 0110 0011
2 3 v
5 2 f
4 8 v
1 2
2 2
1 6
2 6
2 7
5 3
5 4
4 4
6 2
4 1
1 4 1 5
3 4 3 5
3 2 4 2
3 3 4 3
3 6 4 6
3 7 4 7
5 6 5 7
6 6 6 7
2 1
5 8
6 3
1 7
";

/// Represents errors that can occur while reading a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout ends after {found} of {expected} grid rows")]
    MissingRows { expected: usize, found: usize },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid wall code '{code}'")]
    WallCode { line: usize, code: String },
    #[error("line {line}: '{token}' is not a row or column number")]
    NotANumber { line: usize, token: String },
    #[error("line {line}: row {row}, column {col} is outside the {width}x{height} grid")]
    OutOfRange {
        line: usize,
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },
    #[error("line {line}: unknown point of interest kind '{kind}'")]
    UnknownPoiKind { line: usize, kind: String },
    #[error("line {line}: door cells are not adjacent")]
    DoorNotAdjacent { line: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Initial configuration of a building.
#[derive(Debug, Clone)]
pub struct Layout {
    pub walls: Grid<Walls>,
    pub pois: Vec<(Position, PoiKind)>,
    pub fires: Vec<Position>,
    /// Closed doors with the side each door cell faces.
    pub doors: Vec<(Position, Direction)>,
    pub entrances: Vec<Position>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::parse(DEFAULT_LAYOUT).expect("built-in layout is valid")
    }
}

impl Layout {
    /// A wall-less building with nothing in it.
    pub fn open(width: usize, height: usize) -> Self {
        Layout {
            walls: Grid::new(width, height),
            pois: Vec::new(),
            fires: Vec::new(),
            doors: Vec::new(),
            entrances: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.walls.width()
    }

    pub fn height(&self) -> usize {
        self.walls.height()
    }

    /// Parses a layout for the default 8x6 building.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        Self::parse_sized(text, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Parses a layout for a building of the given size.
    pub fn parse_sized(text: &str, width: usize, height: usize) -> Result<Self, LayoutError> {
        let lines: Vec<(usize, Vec<&str>)> = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.split_whitespace().collect::<Vec<_>>()))
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();

        if lines.len() < height {
            return Err(LayoutError::MissingRows {
                expected: height,
                found: lines.len(),
            });
        }

        let mut layout = Layout::open(width, height);
        let (rows, records) = lines.split_at(height);

        for (y, (line, tokens)) in rows.iter().enumerate() {
            expect_fields(*line, tokens, width)?;
            for (x, code) in tokens.iter().enumerate() {
                let walls = Walls::from_code(code).ok_or_else(|| LayoutError::WallCode {
                    line: *line,
                    code: code.to_string(),
                })?;
                layout.walls.set(Position::new(x, y), walls)?;
            }
        }

        let mut records = records.iter();
        let cell = |line: usize, row: &str, col: &str| parse_cell(line, row, col, width, height);

        for (line, tokens) in records.by_ref().take(POI_LINES) {
            expect_fields(*line, tokens, 3)?;
            let pos = cell(*line, tokens[0], tokens[1])?;
            let kind = match tokens[2] {
                "v" => PoiKind::Victim,
                "f" => PoiKind::FalseAlarm,
                other => {
                    return Err(LayoutError::UnknownPoiKind {
                        line: *line,
                        kind: other.to_string(),
                    });
                }
            };
            layout.pois.push((pos, kind));
        }

        for (line, tokens) in records.by_ref().take(FIRE_LINES) {
            expect_fields(*line, tokens, 2)?;
            layout.fires.push(cell(*line, tokens[0], tokens[1])?);
        }

        for (line, tokens) in records.by_ref().take(DOOR_LINES) {
            expect_fields(*line, tokens, 4)?;
            let a = cell(*line, tokens[0], tokens[1])?;
            let b = cell(*line, tokens[2], tokens[3])?;
            let facing =
                Direction::between(a, b).ok_or(LayoutError::DoorNotAdjacent { line: *line })?;
            layout.doors.push((a, facing));
            layout.doors.push((b, facing.opposite()));
        }

        for (line, tokens) in records.by_ref().take(ENTRANCE_LINES) {
            expect_fields(*line, tokens, 2)?;
            layout.entrances.push(cell(*line, tokens[0], tokens[1])?);
        }

        let trailing = records.count();
        if trailing > 0 {
            debug!(trailing, "ignoring lines after the entrance section");
        }

        Ok(layout)
    }

    /// Reads and parses a layout file for the default building size.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads `path`, falling back to the built-in layout if it cannot be used.
    ///
    /// The error that caused the fallback is handed back so the caller can
    /// surface it.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<LayoutError>) {
        match Self::from_file(path.as_ref()) {
            Ok(layout) => (layout, None),
            Err(err) => {
                warn!(path = %path.as_ref().display(), error = %err, "using built-in layout");
                (Layout::default(), Some(err))
            }
        }
    }
}

fn expect_fields(line: usize, tokens: &[&str], expected: usize) -> Result<(), LayoutError> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(LayoutError::FieldCount {
            line,
            expected,
            found: tokens.len(),
        })
    }
}

/// Converts 1-based `row col` tokens to a position.
fn parse_cell(
    line: usize,
    row: &str,
    col: &str,
    width: usize,
    height: usize,
) -> Result<Position, LayoutError> {
    let number = |token: &str| {
        token.parse::<usize>().map_err(|_| LayoutError::NotANumber {
            line,
            token: token.to_string(),
        })
    };
    let (row, col) = (number(row)?, number(col)?);
    if row == 0 || col == 0 || row > height || col > width {
        return Err(LayoutError::OutOfRange {
            line,
            row,
            col,
            width,
            height,
        });
    }
    Ok(Position::new(col - 1, row - 1))
}
