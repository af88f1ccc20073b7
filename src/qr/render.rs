//! Terminal rendering of QR module grids
//!
//! Turns a boolean module grid into a block of text that scans as a QR
//! code on a terminal. Two densities are supported: compact packs two
//! module rows into each text line using Unicode half blocks, full spends
//! two characters per module. Every cell is painted with a fixed ANSI
//! color pair so the output is independent of the terminal theme; the
//! `inverse` polarity swaps which glyph shapes stand for filled and
//! unfilled modules without touching the colors.

use crate::config::QrConfig;

/// ANSI sequence painted before every cell: black background, bright white foreground
const CELL_PAINT: &str = "\x1b[40;97m";

/// ANSI reset emitted after every cell
const CELL_RESET: &str = "\x1b[0m";

const UPPER_HALF: &str = "\u{2580}";
const LOWER_HALF: &str = "\u{2584}";
const FULL_BLOCK: &str = "\u{2588}";
const BLANK: &str = " ";

// ---------------------------------------------------------------------
// Module grid
// ---------------------------------------------------------------------

/// Rectangular matrix of QR modules, row-major, `true` = filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    rows: Vec<Vec<bool>>,
    width: usize,
}

impl ModuleGrid {
    /// Build a grid from row vectors
    ///
    /// The first row determines the grid width.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        Self { rows, width }
    }

    /// Number of module columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of module rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Module at (row, col); anything outside the grid reads as unfilled
    pub(crate) fn module(&self, row: isize, col: usize) -> bool {
        if row < 0 {
            return false;
        }
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------
// Render options
// ---------------------------------------------------------------------

/// How many terminal characters a module occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    /// Two module rows per text line, one character per module
    Compact,
    /// One module row per text line, two characters per module
    Full,
}

/// Rendering options for [`render`]
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Character density of the output
    pub density: Density,
    /// Swap glyph shapes for light terminal themes
    pub inverse: bool,
    /// Prefix prepended to every line
    pub before_line: String,
    /// Suffix appended to every line
    pub after_line: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            density: Density::Compact,
            inverse: false,
            before_line: String::new(),
            after_line: String::new(),
        }
    }
}

impl From<&QrConfig> for RenderOptions {
    fn from(config: &QrConfig) -> Self {
        Self {
            density: if config.big {
                Density::Full
            } else {
                Density::Compact
            },
            inverse: config.inverse,
            before_line: config.before_line.clone(),
            after_line: config.after_line.clone(),
        }
    }
}

// ---------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------

/// Render a module grid as terminal text
///
/// The output carries a one-module quiet zone on all four sides, every
/// line framed by the configured prefix and suffix. Lines are joined
/// with `'\n'` and there is no trailing newline. The function is pure:
/// identical inputs produce byte-identical output.
///
/// # Arguments
///
/// * `grid` - The module grid to render
/// * `options` - Density, polarity, and per-line framing
pub fn render(grid: &ModuleGrid, options: &RenderOptions) -> String {
    let lines = match options.density {
        Density::Compact => compact_lines(grid, options.inverse),
        Density::Full => full_lines(grid, options.inverse),
    };

    lines
        .iter()
        .map(|line| format!("{}{}{}", options.before_line, line, options.after_line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Glyph for a vertical pair of modules in compact density
///
/// Inverse polarity swaps which shapes stand for filled and unfilled.
fn half_glyph(top: bool, bottom: bool, inverse: bool) -> &'static str {
    let (top, bottom) = if inverse { (!top, !bottom) } else { (top, bottom) };
    match (top, bottom) {
        (true, true) => BLANK,
        (false, true) => UPPER_HALF,
        (true, false) => LOWER_HALF,
        (false, false) => FULL_BLOCK,
    }
}

/// Glyph for a single module in full density
fn full_glyph(filled: bool, inverse: bool) -> &'static str {
    match (filled, inverse) {
        (true, false) | (false, true) => "  ",
        (true, true) | (false, false) => "\u{2588}\u{2588}",
    }
}

fn push_cell(line: &mut String, glyph: &str) {
    line.push_str(CELL_PAINT);
    line.push_str(glyph);
    line.push_str(CELL_RESET);
}

fn blank_line(cells: usize, glyph: &str) -> String {
    let mut line = String::new();
    for _ in 0..cells {
        push_cell(&mut line, glyph);
    }
    line
}

/// Compact density: one leading and one trailing all-background line,
/// with the grid's module rows consumed in pairs in between. The pair
/// stream covers one quiet module row above and below the grid, so pair
/// `p` reads grid rows `2p - 1` and `2p`; rows outside the grid read as
/// unfilled. An N-row grid yields `ceil(N/2) + 3` lines.
fn compact_lines(grid: &ModuleGrid, inverse: bool) -> Vec<String> {
    let quiet = half_glyph(false, false, inverse);
    let cells = grid.width() + 2;
    let covered_rows = grid.height() + 2;
    let pair_lines = (covered_rows + 1) / 2;

    let mut lines = Vec::with_capacity(pair_lines + 2);
    lines.push(blank_line(cells, quiet));
    for pair in 0..pair_lines {
        let mut line = String::new();
        push_cell(&mut line, quiet);
        for col in 0..grid.width() {
            let top = grid.module(2 * pair as isize - 1, col);
            let bottom = grid.module(2 * pair as isize, col);
            push_cell(&mut line, half_glyph(top, bottom, inverse));
        }
        push_cell(&mut line, quiet);
        lines.push(line);
    }
    lines.push(blank_line(cells, quiet));
    lines
}

/// Full density: one module row per line, framed by one quiet cell on
/// each side plus a leading and trailing all-background line. An N-row
/// grid yields `N + 2` lines.
fn full_lines(grid: &ModuleGrid, inverse: bool) -> Vec<String> {
    let quiet = full_glyph(false, inverse);
    let cells = grid.width() + 2;

    let mut lines = Vec::with_capacity(grid.height() + 2);
    lines.push(blank_line(cells, quiet));
    for row in 0..grid.height() {
        let mut line = String::new();
        push_cell(&mut line, quiet);
        for col in 0..grid.width() {
            push_cell(&mut line, full_glyph(grid.module(row as isize, col), inverse));
        }
        push_cell(&mut line, quiet);
        lines.push(line);
    }
    lines.push(blank_line(cells, quiet));
    lines
}
