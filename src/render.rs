use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use fishtank::{Glyph, Position};
use std::io::{self, Write};

const WATER: Color = Color::Black;
const WALL: Color = Color::AnsiValue(31);
const HUD_FG: Color = Color::AnsiValue(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: WATER,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    /// Like `set`, but takes signed coordinates and drops anything off-screen.
    pub(crate) fn put(&mut self, x: i32, y: i32, c: Cell) {
        if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) {
            self.set(x, y, c);
        }
    }
    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: WATER });
    }
}

/// Frames the tank. Entities may poke one column past either side of the
/// interior, so the walls sit two columns out.
pub(crate) fn draw_tank_walls(buf: &mut CellBuffer, origin: Position, width: i32, height: i32) {
    let left = origin.x - 2;
    let right = origin.x + width + 1;
    let top = origin.y - 1;
    let bottom = origin.y + height;
    let wall = |ch| Cell {
        ch,
        fg: WALL,
        bg: WATER,
    };

    for x in left + 1..right {
        buf.put(x, top, wall('~'));
        buf.put(x, bottom, wall('─'));
    }
    for y in top + 1..bottom {
        buf.put(left, y, wall('│'));
        buf.put(right, y, wall('│'));
    }
    buf.put(left, top, wall('┐'));
    buf.put(right, top, wall('┌'));
    buf.put(left, bottom, wall('└'));
    buf.put(right, bottom, wall('┘'));
}

/// Paints positioned glyphs in order, so later entries end up on top.
pub(crate) fn draw_content(buf: &mut CellBuffer, content: &[(Position, Glyph)]) {
    for (position, glyph) in content {
        for (i, &(ch, color)) in glyph.cells().iter().enumerate() {
            buf.put(
                position.x + i as i32,
                position.y,
                Cell {
                    ch,
                    fg: Color::AnsiValue(color),
                    bg: WATER,
                },
            );
        }
    }
}

pub(crate) struct Hud {
    pub(crate) fish: usize,
    pub(crate) food: usize,
    pub(crate) ticks: u64,
    pub(crate) paused: bool,
}

pub(crate) fn draw_hud(buf: &mut CellBuffer, hud: &Hud) {
    if buf.h == 0 {
        return;
    }
    let line = format!(
        " fish {}  food {}  tick {}{}  |  click/f feed  r clear  p pause  q quit",
        hud.fish,
        hud.food,
        hud.ticks,
        if hud.paused { "  [paused]" } else { "" },
    );
    draw_text(buf, 0, buf.h - 1, &line, HUD_FG);
}
