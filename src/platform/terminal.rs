//! Terminal surface
//!
//! Draws frames as a character grid scaled to the terminal and turns key
//! presses into flap/quit requests. Space or Up flaps; q, Esc or Ctrl-C quits.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use super::input::{FlapButton, QuitSignal};
use super::Surface;
use crate::consts::*;
use crate::render::{Frame, RenderSink};

const SKY: char = ' ';
const PIPE: char = '#';
const BIRD: char = '@';
const GUIDE: char = '.';
const FLOOR_A: char = '=';
const FLOOR_B: char = '-';
/// World units per floor stripe
const FLOOR_STRIPE: f32 = 24.0;

/// Character grid covering the playfield
#[derive(Debug, Clone)]
pub struct Canvas {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![SKY; cols * rows],
        }
    }

    fn sx(&self) -> f32 {
        self.cols as f32 / WIN_WIDTH
    }

    fn sy(&self) -> f32 {
        self.rows as f32 / WIN_HEIGHT
    }

    fn put(&mut self, col: i32, row: i32, ch: char) {
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            self.cells[row as usize * self.cols + col as usize] = ch;
        }
    }

    /// Fill a world-space rectangle
    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, ch: char) {
        let (sx, sy) = (self.sx(), self.sy());
        let c0 = (x * sx).floor() as i32;
        let c1 = ((x + w) * sx).ceil() as i32;
        let r0 = (y * sy).floor() as i32;
        let r1 = ((y + h) * sy).ceil() as i32;
        for row in r0..r1 {
            for col in c0..c1 {
                self.put(col, row, ch);
            }
        }
    }

    /// Dotted world-space line, drawn under whatever is already there
    fn guide(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (sx, sy) = (self.sx(), self.sy());
        let steps = 32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let col = ((from.0 + (to.0 - from.0) * t) * sx) as i32;
            let row = ((from.1 + (to.1 - from.1) * t) * sy) as i32;
            if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
                let idx = row as usize * self.cols + col as usize;
                if self.cells[idx] == SKY {
                    self.cells[idx] = GUIDE;
                }
            }
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }
}

/// Rasterize a frame: one HUD line followed by the playfield
pub fn rasterize(frame: &Frame, cols: usize, rows: usize, guides: bool) -> Vec<String> {
    let field_rows = rows.saturating_sub(1);
    let mut canvas = Canvas::new(cols, field_rows);

    // Floor stripes scroll with the tile offset
    let floor_row = (frame.floor_y * canvas.sy()).floor() as i32;
    for row in floor_row.max(0)..field_rows as i32 {
        for col in 0..cols as i32 {
            let world_x = col as f32 / canvas.sx();
            let stripe = ((world_x - frame.floor.0) / FLOOR_STRIPE).floor() as i64;
            let ch = if stripe.rem_euclid(2) == 0 { FLOOR_A } else { FLOOR_B };
            canvas.put(col, row, ch);
        }
    }

    let pipe_w = PIPE_WIDTH as f32;
    for pipe in &frame.pipes {
        canvas.fill(pipe.x, 0.0, pipe_w, pipe.height.max(0.0), PIPE);
        canvas.fill(pipe.x, pipe.bottom, pipe_w, (frame.floor_y - pipe.bottom).max(0.0), PIPE);
    }

    let (bird_w, bird_h) = (BIRD_WIDTH as f32, BIRD_HEIGHT as f32);
    if guides {
        if let Some(target) = frame.target_pipe.and_then(|i| frame.pipes.get(i)) {
            let gap_x = target.x + pipe_w / 2.0;
            for bird in &frame.birds {
                let center = (bird.pos.x + bird_w / 2.0, bird.pos.y + bird_h / 2.0);
                canvas.guide(center, (gap_x, target.height));
                canvas.guide(center, (gap_x, target.bottom));
            }
        }
    }

    for bird in &frame.birds {
        canvas.fill(bird.pos.x, bird.pos.y, bird_w, bird_h, BIRD);
    }

    let hud = format!(
        "Score: {}  Gens: {}  Alive: {}",
        frame.score, frame.generation, frame.alive
    );
    let mut lines = Vec::with_capacity(rows);
    lines.push(format!("{hud:<cols$.cols$}"));
    lines.extend(canvas.lines());
    lines
}

/// Full-screen terminal surface
pub struct TerminalSurface {
    out: Stdout,
    quit: QuitSignal,
    flap: FlapButton,
    guides: bool,
    failed: bool,
}

impl TerminalSurface {
    /// Take over the terminal (raw mode, alternate screen)
    pub fn new(quit: QuitSignal, flap: FlapButton, guides: bool) -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self {
            out,
            quit,
            flap,
            guides,
            failed: false,
        })
    }

    fn handle_key(&self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) | (KeyCode::Char('Q'), _) => {
                self.quit.raise()
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => self.quit.raise(),
            (KeyCode::Char(' '), _) | (KeyCode::Up, _) => self.flap.press(),
            _ => {}
        }
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let lines = rasterize(frame, cols as usize, rows as usize, self.guides);
        for (row, line) in lines.iter().enumerate() {
            queue!(self.out, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()
    }
}

impl RenderSink for TerminalSurface {
    fn present(&mut self, frame: &Frame) {
        if let Err(err) = self.draw(frame) {
            if !self.failed {
                log::warn!("Terminal draw failed: {err}");
                self.failed = true;
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn pump(&mut self) {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(err) => {
                        log::warn!("Terminal input failed: {err}");
                        self.quit.raise();
                        break;
                    }
                },
                Ok(false) => break,
                Err(err) => {
                    log::warn!("Terminal input failed: {err}");
                    self.quit.raise();
                    break;
                }
            }
        }
    }

    fn paced(&self) -> bool {
        true
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
