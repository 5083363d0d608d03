/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Screen space
///
/// Each terminal cell stands for `COL_PX` x `ROW_PX` screen pixels, which
/// keeps tiles roughly square on a typical 1:2 cell. The map area is
/// sampled through the camera: every cell asks `screen_to_world` what lies
/// under its center. The renderer never writes back into the simulation.
///
/// Layout (rows):
///   0          HUD
///   1..h-2     map viewport (panel, minimap, pause overlay drawn on top)
///   h-2        message bar
///   h-1        help bar

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::Vec2;

use crate::domain::zone::{Rgb, Zone};
use crate::sim::camera::Viewport;
use crate::sim::world::{Facing, SimState, World};
use crate::ui::input::PointerSurface;

/// Screen px per terminal column / row.
pub const COL_PX: f32 = 10.0;
pub const ROW_PX: f32 = 20.0;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;
const FOOTER_ROWS: usize = 2;

const MINIMAP_MAX_W: usize = 28;
const MINIMAP_MAX_H: usize = 10;

// ── Palette ──

const FLOOR_A: Color = Color::Rgb { r: 34, g: 38, b: 48 };
const FLOOR_B: Color = Color::Rgb { r: 30, g: 33, b: 42 };
const WALL_FG: Color = Color::Rgb { r: 120, g: 126, b: 140 };
const WALL_BG: Color = Color::Rgb { r: 70, g: 74, b: 88 };
const PLAYER_BG: Color = Color::Rgb { r: 250, g: 226, b: 120 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PANEL_BG: Color = Color::Rgb { r: 16, g: 18, b: 28 };
const TEXT: Color = Color::Rgb { r: 220, g: 220, b: 228 };
const MUTED: Color = Color::Rgb { r: 130, g: 130, b: 145 };
const ERROR_FG: Color = Color::Rgb { r: 255, g: 110, b: 110 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell's
    /// background keeps the inter-row gap on VTE terminals the same color
    /// as the cells.
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
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', TEXT, bg));
        }
    }

    fn fill_rect(&mut self, r: CellRect, bg: Color) {
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                self.set(x, y, Cell::new(' ', TEXT, bg));
            }
        }
    }
}

/// A rectangle in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRect {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl CellRect {
    fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }
}

/// Everything one frame needs, borrowed from the loop.
pub struct View<'a> {
    pub world: &'a World,
    pub state: &'a SimState,
    /// Joystick origin and knob offset, screen px.
    pub joystick: Option<(Vec2, Vec2)>,
    pub route: &'a str,
    /// Index of the playing track in the open zone.
    pub playing: Option<usize>,
    pub audio_error: Option<&'a str>,
    pub paused: bool,
    pub pad_connected: bool,
}

/// Center of a terminal cell in map-area screen px.
pub fn cell_to_screen(col: u16, row: u16) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) * COL_PX,
        (row as f32 - MAP_ROW as f32 + 0.5) * ROW_PX,
    )
}

fn screen_to_cell(p: Vec2) -> Option<(usize, usize)> {
    if !(p.x >= 0.0 && p.y >= 0.0) {
        return None;
    }
    Some(((p.x / COL_PX) as usize, (p.y / ROW_PX) as usize + MAP_ROW))
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── Renderer ──

impl PointerSurface for Renderer {
    fn to_screen(&self, col: u16, row: u16) -> Vec2 {
        cell_to_screen(col, row)
    }

    /// Is this row inside the map viewport (where the joystick lives)?
    fn in_map(&self, row: u16) -> bool {
        let row = row as usize;
        row >= MAP_ROW && row < MAP_ROW + self.map_rows()
    }

    fn panel_contains(&self, col: u16, row: u16) -> bool {
        self.panel.is_some_and(|p| p.contains(col as usize, row as usize))
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Panel drawn on the last frame, for click hit-testing.
    panel: Option<CellRect>,
    enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            panel: None,
            enhanced: false,
        }
    }

    /// Enter raw alternate-screen mode with mouse and focus reporting.
    /// Returns true when key release events are available.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        self.enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if self.enhanced {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        log::debug!("keyboard release events: {}", self.enhanced);

        self.refresh_size();
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            DisableFocusChange,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Re-read the terminal size; returns the map viewport in screen px.
    pub fn refresh_size(&mut self) -> Viewport {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            log::debug!("terminal resized to {tw}x{th}");
        }
        self.viewport()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.term_w as f32 * COL_PX, self.map_rows() as f32 * ROW_PX)
    }

    fn map_rows(&self) -> usize {
        self.term_h.saturating_sub(MAP_ROW + FOOTER_ROWS).max(1)
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        if self.back.cells.first() == Some(&Cell::INVALID) {
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_map(view);
        self.compose_zone_labels(view);
        self.compose_player(view);
        self.compose_joystick(view);
        if view.state.minimap {
            self.compose_minimap(view);
        }
        self.panel = None;
        if let Some(zone) = view.state.active(view.world) {
            self.compose_panel(zone, view);
        }
        self.compose_hud(view);
        self.compose_footer(view);
        if view.paused {
            self.compose_pause_overlay();
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
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_map(&mut self, view: &View) {
        let w = view.world;
        let cam = &view.state.camera;
        let ts = w.grid.tile_size();
        let size = w.size();

        for row in MAP_ROW..MAP_ROW + self.map_rows() {
            for col in 0..self.term_w {
                let p = cam.screen_to_world(cell_to_screen(col as u16, row as u16));
                if p.x < 0.0 || p.y < 0.0 || p.x >= size.x || p.y >= size.y {
                    continue; // void
                }
                let tx = w.grid.index_of(p.x);
                let ty = w.grid.index_of(p.y);

                let cell = if w.grid.is_solid(tx, ty) {
                    Cell::new('▓', WALL_FG, WALL_BG)
                } else {
                    let mut bg = if (tx + ty) % 2 == 0 { FLOOR_A } else { FLOOR_B };
                    for (i, z) in w.zones.iter().enumerate() {
                        if z.rect.contains(p) {
                            let t = if view.state.active_zone == Some(i) {
                                0.55
                            } else if view.state.trigger.is_inside(i) {
                                0.45
                            } else {
                                0.35
                            };
                            bg = rgb(z.color.dim(t));
                            break;
                        }
                    }
                    // Grid dot near each tile corner.
                    let fx = p.x - tx as f32 * ts;
                    let fy = p.y - ty as f32 * ts;
                    let near = fx < COL_PX / cam.zoom && fy < ROW_PX / cam.zoom;
                    Cell::new(if near { '·' } else { ' ' }, MUTED, bg)
                };
                self.front.set(col, row, cell);
            }
        }
    }

    fn compose_zone_labels(&mut self, view: &View) {
        let cam = &view.state.camera;
        for z in &view.world.zones {
            let anchor = cam.world_to_screen(z.rect.pos()) + Vec2::new(COL_PX, ROW_PX * 0.5);
            let Some((col, row)) = screen_to_cell(anchor) else { continue };
            if !self.in_map(row as u16) {
                continue;
            }
            let bg = self.front.get(col, row).bg;
            self.front.put_str(col, row, &z.label, rgb(z.color), bg);
        }
    }

    fn compose_player(&mut self, view: &View) {
        let s = view.state;
        let cam = &s.camera;
        let top_left = cam.world_to_screen(s.player.pos());
        let bottom_right = cam.world_to_screen(Vec2::new(s.player.right(), s.player.bottom()));
        let glyph = match s.facing {
            Facing::Up => '▲',
            Facing::Down => '▼',
            Facing::Left => '◀',
            Facing::Right => '▶',
        };
        let fg = if s.stamina.is_exhausted() { ERROR_FG } else { Color::Black };

        // Cells whose center falls inside the player rectangle.
        let mut drew = false;
        for row in MAP_ROW..MAP_ROW + self.map_rows() {
            for col in 0..self.term_w {
                let c = cell_to_screen(col as u16, row as u16);
                if c.x >= top_left.x && c.x < bottom_right.x && c.y >= top_left.y && c.y < bottom_right.y {
                    self.front.set(col, row, Cell::new(' ', fg, PLAYER_BG));
                    drew = true;
                }
            }
        }

        // Glyph on the center cell; also covers zoomed-out players smaller than a cell.
        let center = cam.world_to_screen(s.player.center());
        if let Some((col, row)) = screen_to_cell(center) {
            if self.in_map(row as u16) {
                let bg = if drew { PLAYER_BG } else { self.front.get(col, row).bg };
                let fg = if drew { fg } else { PLAYER_BG };
                self.front.set(col, row, Cell::new(glyph, fg, bg));
            }
        }
    }

    fn compose_joystick(&mut self, view: &View) {
        let Some((origin, knob)) = view.joystick else { return };
        for (p, ch) in [(origin, '○'), (origin + knob, '●')] {
            if let Some((col, row)) = screen_to_cell(p) {
                if self.in_map(row as u16) {
                    let bg = self.front.get(col, row).bg;
                    self.front.set(col, row, Cell::new(ch, TEXT, bg));
                }
            }
        }
    }

    fn compose_minimap(&mut self, view: &View) {
        let w = view.world;
        let grid = &w.grid;
        if grid.cols() == 0 || grid.rows() == 0 {
            return;
        }
        // Tiles per minimap cell; a cell is twice as tall as wide.
        let step_x = grid.cols().div_ceil(MINIMAP_MAX_W).max(1);
        let step_y = grid.rows().div_ceil(MINIMAP_MAX_H).max(1).max(step_x / 2);
        let mw = grid.cols().div_ceil(step_x);
        let mh = grid.rows().div_ceil(step_y);
        if mw + 2 > self.term_w || mh + 1 > self.map_rows() {
            return;
        }
        let x0 = self.term_w - mw - 1;
        let y0 = MAP_ROW;

        let ts = grid.tile_size();
        let player_tile = (
            grid.index_of(view.state.player.center().x) as usize / step_x,
            grid.index_of(view.state.player.center().y) as usize / step_y,
        );

        for my in 0..mh {
            for mx in 0..mw {
                let (tx, ty) = (mx * step_x, my * step_y);
                let solid = (0..step_y).any(|dy| {
                    (0..step_x).any(|dx| grid.is_solid((tx + dx) as i32, (ty + dy) as i32))
                });
                let center = Vec2::new((tx as f32 + 0.5) * ts, (ty as f32 + 0.5) * ts);
                let zone = w.zones.iter().find(|z| z.rect.contains(center));

                let cell = if (mx, my) == player_tile {
                    Cell::new('●', PLAYER_BG, Color::Black)
                } else if let Some(z) = zone {
                    Cell::new(' ', TEXT, rgb(z.color.dim(0.6)))
                } else if solid {
                    Cell::new('█', WALL_BG, Color::Black)
                } else {
                    Cell::new(' ', TEXT, Color::Black)
                };
                self.front.set(x0 + mx, y0 + my, cell);
            }
        }
    }

    fn compose_panel(&mut self, zone: &Zone, view: &View) {
        let map_rows = self.map_rows();
        let box_w = 64.min(self.term_w.saturating_sub(4));
        if box_w < 12 || map_rows < 5 {
            return;
        }
        let inner = box_w - 4;

        let mut body: Vec<(String, Color)> = Vec::new();
        for line in &zone.lines {
            for l in wrap(line, inner) {
                body.push((l, TEXT));
            }
        }
        if !zone.tracks.is_empty() {
            body.push((String::new(), TEXT));
            for (i, t) in zone.tracks.iter().enumerate().take(9) {
                let playing = view.playing == Some(i);
                let marker = if playing { '♪' } else { ' ' };
                let fg = if playing { rgb(zone.color) } else { TEXT };
                body.push((format!("{marker} {}. {}", i + 1, t.title), fg));
            }
            if let Some(err) = view.audio_error {
                for l in wrap(&format!("Audio error: {err}"), inner) {
                    body.push((l, ERROR_FG));
                }
            }
        }

        let max_body = map_rows.saturating_sub(4);
        body.truncate(max_body);
        let box_h = body.len() + 4;
        let rect = CellRect {
            x: (self.term_w - box_w) / 2,
            y: MAP_ROW + (map_rows - box_h) / 2,
            w: box_w,
            h: box_h,
        };
        self.front.fill_rect(rect, PANEL_BG);

        // Title bar in the zone color
        let accent = rgb(zone.color);
        for x in rect.x..rect.x + rect.w {
            self.front.set(x, rect.y, Cell::new(' ', Color::Black, accent));
        }
        self.front.put_str(rect.x + 2, rect.y, &zone.label, Color::Black, accent);
        let frag = format!("#{}", zone.id);
        let fx = (rect.x + rect.w).saturating_sub(frag.chars().count() + 2);
        self.front.put_str(fx, rect.y, &frag, Color::Black, accent);

        for (i, (line, fg)) in body.iter().enumerate() {
            self.front.put_str(rect.x + 2, rect.y + 2 + i, line, *fg, PANEL_BG);
        }

        let footer = if zone.tracks.is_empty() { "Esc close" } else { "1-9 play   Esc close" };
        self.front.put_str(rect.x + 2, rect.y + rect.h - 1, footer, MUTED, PANEL_BG);
        self.panel = Some(rect);
    }

    fn compose_hud(&mut self, view: &View) {
        let s = view.state;
        self.front.fill_row(HUD_ROW, HUD_BG);

        const BAR: usize = 10;
        let filled = (s.stamina.value() * BAR as f32).round() as usize;
        let bar: String = (0..BAR).map(|i| if i < filled { '█' } else { '░' }).collect();
        let status = if s.stamina.is_exhausted() {
            "TIRED"
        } else if s.sprinting {
            "SPRINT"
        } else {
            ""
        };
        let route = if view.route.is_empty() { "#" } else { view.route };
        let pad = if view.pad_connected { "  [pad]" } else { "" };
        let hud = format!(
            " {}  Stamina {} {:>3}%  Zoom {:.2}x  {}  {}{}",
            view.world.title,
            bar,
            (s.stamina.value() * 100.0).round() as u32,
            s.camera.user_zoom,
            route,
            status,
            pad,
        );
        self.front.put_str(0, HUD_ROW, &hud, TEXT, HUD_BG);
    }

    fn compose_footer(&mut self, view: &View) {
        let msg_row = self.term_h.saturating_sub(2);
        let help_row = self.term_h.saturating_sub(1);
        if msg_row <= HUD_ROW {
            return;
        }

        if !view.state.message.is_empty() {
            let bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bg);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", view.state.message), Color::Black, bg);
        }

        let help = " WASD/Arrows move  Shift sprint  Enter open  Esc close  -/=/0 zoom  M map  [ ] back/fwd  Q quit";
        self.front.put_str(0, help_row, help, MUTED, Color::Reset);
    }

    fn compose_pause_overlay(&mut self) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let lines = ["PAUSED", "", "Focus the terminal to resume"];
        let box_w = 36.min(self.term_w);
        let box_h = lines.len() + 2;
        if self.map_rows() < box_h {
            return;
        }
        let rect = CellRect {
            x: (self.term_w - box_w) / 2,
            y: MAP_ROW + (self.map_rows() - box_h) / 2,
            w: box_w,
            h: box_h,
        };
        self.front.fill_rect(rect, dim);
        for (i, line) in lines.iter().enumerate() {
            let x = rect.x + (box_w.saturating_sub(line.chars().count())) / 2;
            let fg = if i == 0 { hdr } else { TEXT };
            self.front.put_str(x, rect.y + 1 + i, line, fg, dim);
        }
    }
}

/// Greedy word wrap to `width` columns. Words longer than a line are split.
/// An empty input yields one empty line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if len > 0 {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let wl = chars.len();
        if len > 0 && len + 1 + wl > width {
            lines.push(std::mem::take(&mut line));
            len = 0;
        }
        if len > 0 {
            line.push(' ');
            len += 1;
        }
        line.extend(chars);
        len += wl;
    }
    if len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("   ", 10), vec![""]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
        assert!(wrap("github.com/example/very-long-path", 10).iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn cell_centers_round_trip() {
        let p = cell_to_screen(7, 3);
        assert_eq!(p, Vec2::new(75.0, 50.0));
        assert_eq!(screen_to_cell(p), Some((7, 3)));
        assert_eq!(screen_to_cell(Vec2::new(-1.0, 5.0)), None);
    }

    #[test]
    fn cell_rect_contains_is_half_open() {
        let r = CellRect { x: 2, y: 3, w: 4, h: 2 };
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 4));
        assert!(!r.contains(6, 4));
        assert!(!r.contains(5, 5));
    }
}
