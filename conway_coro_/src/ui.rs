// ui.rs - Character-grid rendering: cell painting, cursor, and the run observer

use std::io::{self, Write};

use conway::{BoxError, CellPos, ChangeEvent, Grid, RunObserver};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, warn};

const CELL: char = '■';
const CELL_WIDTH: u16 = 2;                  // glyph plus a spacer column
const PROMPT: &str = "Press command key: [r]un [c]ancel [s]tep [arrows] move [u]pdate cell [e]xit";

/// Colors for the two cell states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive : Color,
    pub dead  : Color,
}

impl Palette {
    fn color(&self, alive: bool) -> Color {
        if alive { self.alive } else { self.dead }
    }
}

/// Screen geometry of the boxed grid. Row 0 is the top border; cells start one
/// row down and one column in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    rows : u16,
    cols : u16,
}

impl Layout {
    /// `None` when the frame (border, prompt and status lines included) would
    /// not be addressable with terminal coordinates.
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        let rows = u16::try_from(rows).ok()?;
        let cols = u16::try_from(cols).ok()?;
        rows.checked_add(4)?;
        cols.checked_mul(CELL_WIDTH)?.checked_add(2)?;
        Some(Self { rows, cols })
    }

    /// Columns and lines the frame occupies on screen.
    pub fn size(&self) -> (u16, u16) {
        (self.cols * CELL_WIDTH + 2, self.rows + 4)
    }

    /// Whether the frame fits a terminal of `width` columns by `height` lines.
    pub fn fits(&self, width: u16, height: u16) -> bool {
        let (needed_width, needed_height) = self.size();
        needed_width <= width && needed_height <= height
    }

    /// Terminal (column, row) of a grid cell.
    pub fn to_screen(&self, pos: CellPos) -> (u16, u16) {
        (1 + pos.col as u16 * CELL_WIDTH, 1 + pos.row as u16)
    }

    fn prompt_row(&self) -> u16 {
        self.rows + 2
    }

    fn status_row(&self) -> u16 {
        self.rows + 3
    }
}

/// Paints cells and the cursor into any terminal writer.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub layout  : Layout,
    pub palette : Palette,
}

impl Painter {
    /// Draws the border, every cell of `grid`, and the prompt.
    pub fn draw_frame<W: Write>(&self, out: &mut W, grid: &Grid) -> io::Result<()> {
        let inner = "─".repeat(usize::from(self.layout.cols * CELL_WIDTH));
        queue!(out, ResetColor, Clear(ClearType::All), MoveTo(0, 0), Print(format!("┌{inner}┐")))?;
        let right = 1 + self.layout.cols * CELL_WIDTH;
        for row in 0..self.layout.rows {
            let y = 1 + row;
            queue!(out, MoveTo(0, y), Print('│'), MoveTo(right, y), Print('│'))?;
        }
        queue!(
            out,
            MoveTo(0, self.layout.rows + 1),
            Print(format!("└{inner}┘")),
            MoveTo(0, self.layout.prompt_row()),
            Print(PROMPT),
        )?;
        for (row, col, alive) in grid.iter() {
            self.queue_cell(out, CellPos { row, col }, alive)?;
        }
        out.flush()
    }

    /// Writes one cell and leaves the cursor on it.
    pub fn paint_cell<W: Write>(&self, out: &mut W, pos: CellPos, alive: bool) -> io::Result<()> {
        self.queue_cell(out, pos, alive)?;
        out.flush()
    }

    pub fn paint_changes<W: Write>(&self, out: &mut W, changes: &[ChangeEvent]) -> io::Result<()> {
        for change in changes {
            self.queue_cell(out, CellPos { row: change.row, col: change.col }, change.next_state)?;
        }
        out.flush()
    }

    pub fn move_cursor<W: Write>(&self, out: &mut W, pos: CellPos) -> io::Result<()> {
        let (x, y) = self.layout.to_screen(pos);
        queue!(out, MoveTo(x, y))?;
        out.flush()
    }

    /// Rewrites the status line, then puts the cursor back on `cursor`.
    pub fn status<W: Write>(&self, out: &mut W, text: &str, cursor: CellPos) -> io::Result<()> {
        let (x, y) = self.layout.to_screen(cursor);
        queue!(
            out,
            ResetColor,
            MoveTo(0, self.layout.status_row()),
            Clear(ClearType::CurrentLine),
            Print(text),
            MoveTo(x, y),
        )?;
        out.flush()
    }

    fn queue_cell<W: Write>(&self, out: &mut W, pos: CellPos, alive: bool) -> io::Result<()> {
        let (x, y) = self.layout.to_screen(pos);
        queue!(
            out,
            MoveTo(x, y),
            SetForegroundColor(self.palette.color(alive)),
            Print(CELL),
            ResetColor,
            MoveTo(x, y),
        )
    }
}

/// Paints a background run. Hides the cursor when the run starts and puts it
/// back where it was when the run ends.
pub struct RunPainter<W> {
    painter    : Painter,
    out        : W,
    saved      : CellPos,
    generation : u64,
}

impl<W: Write + Send + 'static> RunPainter<W> {
    pub fn new(painter: Painter, out: W, saved: CellPos, generation: u64) -> Self {
        Self { painter, out, saved, generation }
    }
}

impl<W: Write + Send + 'static> RunObserver for RunPainter<W> {
    fn on_start(&mut self) -> Result<(), BoxError> {
        execute!(self.out, Hide)?;
        Ok(())
    }

    fn on_changes(&mut self, changes: &[ChangeEvent]) -> Result<(), BoxError> {
        self.generation += 1;
        self.painter.paint_changes(&mut self.out, changes)?;
        let status = format!("generation {}  running", self.generation);
        self.painter.status(&mut self.out, &status, self.saved)?;
        Ok(())
    }

    fn on_complete(&mut self) {
        let status = format!("generation {}  stopped", self.generation);
        let restored = self
            .painter
            .status(&mut self.out, &status, self.saved)
            .and_then(|()| execute!(self.out, Show));
        if let Err(err) = restored {
            warn!(%err, "failed to restore cursor after run");
        }
    }
}

/// Raw mode plus alternate screen for the lifetime of the value.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen) {
            error!(%err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!(%err, "failed to disable raw mode");
        }
    }
}

/// Process stdout as a cloneable writer, so the run observer can own one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl Write for StdoutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory terminal shared between the test and a run observer.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn take(&self) -> String {
            let bytes = std::mem::take(&mut *self.0.lock().unwrap());
            String::from_utf8(bytes).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn painter(rows: usize, cols: usize) -> Painter {
        Painter {
            layout: Layout::new(rows, cols).unwrap(),
            palette: Palette { alive: Color::Green, dead: Color::Black },
        }
    }

    #[test]
    fn layout_rejects_grids_beyond_terminal_coordinates() {
        assert!(Layout::new(15, 30).is_some());
        assert!(Layout::new(15, 32_766).is_some());
        assert!(Layout::new(15, 32_767).is_none());
        assert!(Layout::new(15, 40_000).is_none());
        assert!(Layout::new(65_531, 30).is_some());
        assert!(Layout::new(65_532, 30).is_none());
        assert!(Layout::new(70_000, 30).is_none());

        // the last column still has a screen position
        let wide = Layout::new(1, 32_766).unwrap();
        assert_eq!(wide.to_screen(CellPos { row: 0, col: 32_765 }), (65_531, 1));
        assert_eq!(wide.size(), (65_534, 5));
    }

    #[test]
    fn layout_checks_the_terminal_size() {
        let layout = Layout::new(15, 30).unwrap();
        assert_eq!(layout.size(), (62, 19));
        assert!(layout.fits(80, 24));
        assert!(layout.fits(62, 19));
        assert!(!layout.fits(61, 24));
        assert!(!layout.fits(80, 18));
    }

    #[test]
    fn cells_are_two_columns_wide_inside_the_border() {
        let layout = Layout::new(15, 30).unwrap();
        assert_eq!(layout.to_screen(CellPos { row: 0, col: 0 }), (1, 1));
        assert_eq!(layout.to_screen(CellPos { row: 2, col: 3 }), (7, 3));
    }

    #[test]
    fn paint_cell_returns_cursor_to_the_cell() {
        let mut out = Vec::new();
        painter(3, 3).paint_cell(&mut out, CellPos { row: 1, col: 2 }, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        // MoveTo is 1-based on the wire: row 2 -> 3, column 5 -> 6
        assert!(text.starts_with("\x1b[3;6H"));
        assert!(text.ends_with("\x1b[3;6H"));
        assert!(text.contains(CELL));
    }

    #[test]
    fn frame_draws_every_cell() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set(1, 1, true).unwrap();
        let mut out = Vec::new();
        painter(2, 3).draw_frame(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(CELL).count(), 6);
        assert!(text.contains("┌──────┐"));
        assert!(text.contains(PROMPT));
    }

    #[test]
    fn run_painter_hides_and_restores_cursor() {
        let buffer = SharedBuffer::default();
        let saved = CellPos { row: 1, col: 1 };
        let mut run = RunPainter::new(painter(3, 3), buffer.clone(), saved, 0);

        run.on_start().unwrap();
        assert!(buffer.take().contains("\x1b[?25l"));

        run.on_changes(&[ChangeEvent::new(0, 0, true), ChangeEvent::new(2, 2, false)]).unwrap();
        let painted = buffer.take();
        assert_eq!(painted.matches(CELL).count(), 2);
        assert!(painted.contains("generation 1  running"));

        run.on_complete();
        let restored = buffer.take();
        assert!(restored.contains("generation 1  stopped"));
        // cursor goes back to (1, 1) -> screen (3, 2) -> wire 3;4
        assert!(restored.contains("\x1b[3;4H"));
        assert!(restored.ends_with("\x1b[?25h"));
    }
}
