//! Renders a QR module grid as Unicode block glyphs for terminals without
//! graphics support.
//!
//! Output follows the inverse-video convention: glyphs paint the *light*
//! modules and the terminal's (dark) background supplies the dark ones, so
//! the result scans correctly on the dark terminals the tool is meant for.
//! The solid frame around the grid therefore doubles as the light quiet
//! zone a scanner needs.

/// Lines of glyphs, ordered top to bottom. The renderer never writes to a
/// terminal itself; the caller owns flushing.
pub type RenderBuffer = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Row {row} holds {len} modules, expected {expected} as in the first row")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// Read-only view of a module grid: dimensions plus a per-module lookup.
///
/// The renderer goes through this capability instead of a concrete
/// container so any QR encoder's output can be adapted without copying.
pub trait ModuleSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Whether the module at (row, col) is dark, i.e. would print black on
    /// paper.
    fn dark(&self, row: usize, col: usize) -> bool;
}

/// Row-based module grid, the plain way to hand a matrix to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMatrix {
    width: usize,
    rows: Vec<Vec<bool>>,
}

impl ModuleMatrix {
    /// Builds a matrix from rows of booleans (`true` = dark module).
    ///
    /// Every row must match the first row's length; a matrix with zero rows
    /// is a valid degenerate input.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, RenderError> {
        let width = rows.first().map_or(0, Vec::len);

        for (row, modules) in rows.iter().enumerate() {
            if modules.len() != width {
                return Err(RenderError::RaggedMatrix {
                    row,
                    len: modules.len(),
                    expected: width,
                });
            }
        }

        Ok(Self { width, rows })
    }
}

impl ModuleSource for ModuleMatrix {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn dark(&self, row: usize, col: usize) -> bool {
        self.rows[row][col]
    }
}

/// How the margin around the grid is drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum FrameStyle {
    /// Filled glyphs. Under inverse video this is the light quiet zone
    /// scanners expect.
    #[default]
    Solid,
    /// Space padding, for callers printing on light backgrounds.
    Blank,
}

/// Margin thickness in modules on every side of the grid.
const FRAME_MODULES: usize = 2;

// Full density: every module is one 2-character cell.
const FULL_LIGHT: &str = "██";
const FULL_DARK: &str = "  ";

// Half density: two vertically stacked modules per character cell.
const HALF_BOTH_LIGHT: char = '█';
const HALF_TOP_DARK: char = '▄';
const HALF_BOTTOM_DARK: char = '▀';
const HALF_BOTH_DARK: char = ' ';

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GlyphRenderer {
    frame: FrameStyle,
}

impl GlyphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frame style
    pub fn with_frame(&mut self, frame: FrameStyle) -> &mut Self {
        self.frame = frame;

        self
    }

    /// Renders one module per 2-character cell.
    ///
    /// The buffer holds `height + 4` lines: two frame lines above, two
    /// below, and one line per module row with a 2-cell margin on each
    /// side. Every line is `2 * (width + 4)` characters wide.
    pub fn render_full<M: ModuleSource>(&self, matrix: &M) -> RenderBuffer {
        let frame_cell = match self.frame {
            FrameStyle::Solid => FULL_LIGHT,
            FrameStyle::Blank => FULL_DARK,
        };
        let frame_line = frame_cell.repeat(matrix.width() + 2 * FRAME_MODULES);
        let margin = frame_cell.repeat(FRAME_MODULES);

        let mut buffer = Vec::with_capacity(matrix.height() + 2 * FRAME_MODULES);
        for _ in 0..FRAME_MODULES {
            buffer.push(frame_line.clone());
        }

        for row in 0..matrix.height() {
            let mut line = margin.clone();
            for col in 0..matrix.width() {
                line.push_str(if matrix.dark(row, col) {
                    FULL_DARK
                } else {
                    FULL_LIGHT
                });
            }
            line.push_str(&margin);
            buffer.push(line);
        }

        for _ in 0..FRAME_MODULES {
            buffer.push(frame_line.clone());
        }

        buffer
    }

    /// Renders two vertically adjacent module rows per output line using
    /// half-block glyphs, halving the output height.
    ///
    /// Rows are paired (0,1), (2,3), …; an odd final row renders alone with
    /// the missing bottom row treated as light. The buffer holds
    /// `ceil(height / 2) + 2` lines of `width + 4` characters: one frame
    /// line above and below, and a 2-character margin per data line.
    pub fn render_half<M: ModuleSource>(&self, matrix: &M) -> RenderBuffer {
        let frame_char = match self.frame {
            FrameStyle::Solid => HALF_BOTH_LIGHT,
            FrameStyle::Blank => HALF_BOTH_DARK,
        };
        let frame_line: String = std::iter::repeat(frame_char)
            .take(matrix.width() + 2 * FRAME_MODULES)
            .collect();
        let margin: String = std::iter::repeat(frame_char).take(FRAME_MODULES).collect();

        let mut buffer = Vec::with_capacity(matrix.height().div_ceil(2) + 2);
        buffer.push(frame_line.clone());

        for top in (0..matrix.height()).step_by(2) {
            let bottom = top + 1;
            let mut line = margin.clone();

            for col in 0..matrix.width() {
                let top_dark = matrix.dark(top, col);
                let bottom_dark = bottom < matrix.height() && matrix.dark(bottom, col);

                line.push(match (top_dark, bottom_dark) {
                    (false, false) => HALF_BOTH_LIGHT,
                    (true, false) => HALF_TOP_DARK,
                    (false, true) => HALF_BOTTOM_DARK,
                    (true, true) => HALF_BOTH_DARK,
                });
            }

            line.push_str(&margin);
            buffer.push(line);
        }

        buffer.push(frame_line);

        buffer
    }
}

/// Validates raw rows and renders them at full density in one step.
pub fn render_full_rows(rows: Vec<Vec<bool>>) -> Result<RenderBuffer, RenderError> {
    let matrix = ModuleMatrix::from_rows(rows)?;
    Ok(GlyphRenderer::new().render_full(&matrix))
}

/// Validates raw rows and renders them at half density in one step.
pub fn render_half_rows(rows: Vec<Vec<bool>>) -> Result<RenderBuffer, RenderError> {
    let matrix = ModuleMatrix::from_rows(rows)?;
    Ok(GlyphRenderer::new().render_half(&matrix))
}
