/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The course is drawn on a "field": a block of terminal cells where each
/// column covers `px_per_col` canvas pixels and each row `px_per_row`.
/// Bodies become filled background-coloured rectangles, back to front.

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::entity::{Body, Rgb};
use crate::domain::physics::Canvas;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE terminals from showing lines in the inter-row gaps.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }

    fn fill(rgb: Rgb) -> Self {
        Cell::new(' ', Color::White, to_color(rgb))
    }
}

fn to_color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Paint a whole row, then write `s` on it.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Geometry: canvas pixels → terminal cells ──

/// Rows used outside the field: HUD, message bar, help bar.
const RESERVED_ROWS: usize = 3;

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ACCENT: Color = Color::Rgb { r: 0x87, g: 0xE2, b: 0x93 };

/// Field size in cells for a terminal of `cols × rows`.
pub fn field_cells(cols: u16, rows: u16) -> (usize, usize) {
    let rows = (rows as usize).saturating_sub(RESERVED_ROWS).max(1);
    ((cols as usize).max(1), rows)
}

/// The logical canvas for a field, unless the config pins a dimension.
pub fn canvas_for(field: (usize, usize), display: &DisplayConfig) -> Canvas {
    let pick = |pinned: f32, cells: usize, px: f32| {
        if pinned > 0.0 { pinned } else { cells as f32 * px }
    };
    Canvas::new(
        pick(display.canvas_width, field.0, display.px_per_col),
        pick(display.canvas_height, field.1, display.px_per_row),
    )
}

/// Cells covered by the pixel interval [start, start + len), clipped to
/// [0, limit). `None` when nothing is on screen.
fn cell_span(start: f32, len: f32, px_per_cell: f32, limit: usize) -> Option<Range<usize>> {
    let lo = (start / px_per_cell).floor().max(0.0);
    let hi = ((start + len) / px_per_cell).ceil().min(limit as f32);
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return None;
    }
    Some(lo as usize..hi as usize)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    px_per_col: f32,
    px_per_row: f32,
    last_phase: Option<Phase>,
    /// Terminal reports key Release events.
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            px_per_col: display.px_per_col,
            px_per_row: display.px_per_row,
            last_phase: None,
            enhanced_keys: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        Ok(())
    }

    /// Will key releases be reported? Valid after `init`.
    pub fn reports_releases(&self) -> bool {
        self.enhanced_keys
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Field size for the current terminal, in cells.
    pub fn field_size(&self) -> (usize, usize) {
        field_cells(self.term_w as u16, self.term_h as u16)
    }

    pub fn render(&mut self, world: &WorldState, banner: Option<&str>) -> io::Result<()> {
        // Detect terminal resize. Geometry stays; only the view changes.
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(),
            Phase::Playing => self.compose_game(world, banner),
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move: bool;

        // Set explicit base colors at start of frame.
        // Not ResetColor: the terminal default may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            need_move = true;
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState, banner: Option<&str>) {
        let (field_w, field_h) = self.field_size();

        // ── HUD row ──
        let status = if w.is_complete() { "COURSE COMPLETE" } else { "" };
        let hud = format!(
            " Checkpoints {}/{}   {} ",
            w.claimed_count(), w.checkpoints.len(), status,
        );
        self.front.put_bar(HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Field ──
        for body in w.bodies() {
            self.compose_body(body, field_w, field_h);
        }

        // ── Message bar ──
        let msg_row = FIELD_ROW + field_h;
        if let Some(text) = banner {
            self.front.put_bar(msg_row, &format!(" ◈ {} ", text), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " ←→ Move  ↑/Space Jump  Esc Quit  │  Pad: D-pad Move  A Jump  Select Quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
    }

    /// Paint one body as a filled rectangle. Invisible bodies are skipped.
    fn compose_body(&mut self, body: &dyn Body, field_w: usize, field_h: usize) {
        if !body.is_visible() {
            return;
        }
        let pos = body.position();
        let size = body.size();
        let cols = match cell_span(pos.x, size.x, self.px_per_col, field_w) {
            Some(r) => r,
            None => return,
        };
        let rows = match cell_span(pos.y, size.y, self.px_per_row, field_h) {
            Some(r) => r,
            None => return,
        };
        let cell = Cell::fill(body.fill());
        for row in rows {
            for col in cols.clone() {
                self.front.set(col, FIELD_ROW + row, cell);
            }
        }
    }

    fn compose_title(&mut self) {
        let title = [
            r"   ___ _           _            _     _   ",
            r"  / __| |_  ___ __| |___ __  __(_)_ _| |_ ",
            r" | (__| ' \/ -_) _| / / '_ \/ _ \ | ' \  _|",
            r"  \___|_||_\___\__|_\_\ .__/\___/_|_||_\__|",
            r"                      |_|   R U N N E R    ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 0xFE, g: 0x84, b: 0x02 }, Color::Reset);
        }

        let menu_base = 9;
        self.front.put_str(8, menu_base, "ENTER / SPACE   Start", ACCENT, Color::Reset);
        self.front.put_str(8, menu_base + 1, "ESC             Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ← →            Move (the course scrolls past you)",
            "  ↑ / Space      Jump",
            "  Pad            D-pad / stick, A jump, Start, Select",
            "",
            "Touch the checkpoints in order, left to right.",
        ];
        let help_base = menu_base + 3;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { Color::Rgb { r: 255, g: 200, b: 50 } } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }
    }
}
