//! GameView: maps a `BoardSnapshot` into a terminal framebuffer.
//!
//! Pure (no I/O). Screen rows grow downwards while board rows grow upwards, so
//! board row `y` lands on screen row `height - 1 - y` inside the frame.

use crate::core::{BoardConfig, BoardSnapshot, CoordinateConverter, VerticalConverter};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Coord, GemKind, WorldPos};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub port: u16,
    pub commands: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Screen placement of the board frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(70, 70, 90);
const SELECTED_BG: Rgb = Rgb::new(150, 150, 60);

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // Three columns per cell leaves room for a bracketed cursor.
        Self {
            cell_w: 3,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn frame(&self, snap: &BoardSnapshot, viewport: Viewport) -> Frame {
        let w = clamp_u16(snap.width)
            .saturating_mul(self.cell_w)
            .saturating_add(2);
        let h = clamp_u16(snap.height)
            .saturating_mul(self.cell_h)
            .saturating_add(2);
        let x = viewport.width.saturating_sub(w) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        Frame { x, y, w, h }
    }

    /// Top-left terminal cell of board cell `c`
    fn cell_origin(&self, frame: Frame, snap: &BoardSnapshot, c: Coord) -> (u16, u16) {
        let screen_row = clamp_u16(snap.height.saturating_sub(1).saturating_sub(c.y));
        (
            frame
                .x
                .saturating_add(1)
                .saturating_add(clamp_u16(c.x).saturating_mul(self.cell_w)),
            frame
                .y
                .saturating_add(1)
                .saturating_add(screen_row.saturating_mul(self.cell_h)),
        )
    }

    /// Render into an existing framebuffer, reusing its allocation.
    pub fn render_into(
        &self,
        snap: &BoardSnapshot,
        cursor: Option<Coord>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.render_into_with_adapter(snap, cursor, None, viewport, fb);
    }

    pub fn render_into_with_adapter(
        &self,
        snap: &BoardSnapshot,
        cursor: Option<Coord>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let frame = self.frame(snap, viewport);
        let bg = CellStyle::plain(Rgb::new(80, 80, 90), BOARD_BG);
        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            frame.w.saturating_sub(2),
            frame.h.saturating_sub(2),
            ' ',
            bg,
        );
        draw_border(fb, frame, CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0)));

        for y in 0..snap.height {
            for x in 0..snap.width {
                let c = Coord::new(x, y);
                let highlight = if snap.selected == Some(c) {
                    Some(SELECTED_BG)
                } else if cursor == Some(c) {
                    Some(CURSOR_BG)
                } else {
                    None
                };
                self.draw_cell(fb, frame, snap, c, highlight, cursor == Some(c));
            }
        }

        self.draw_side_panel(fb, snap, adapter, viewport, frame);

        if snap.busy {
            let label = snap.stage.as_str();
            let x = frame.x + frame.w.saturating_sub(label.len() as u16) / 2;
            fb.put_str(
                x,
                frame.y.saturating_add(frame.h),
                label,
                CellStyle::default().dim(),
            );
        }
    }

    /// Allocating convenience wrapper around [`render_into`](Self::render_into).
    pub fn render(&self, snap: &BoardSnapshot, cursor: Option<Coord>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, cursor, viewport, &mut fb);
        fb
    }

    fn draw_cell(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        snap: &BoardSnapshot,
        c: Coord,
        highlight: Option<Rgb>,
        bracket: bool,
    ) {
        let (px, py) = self.cell_origin(frame, snap, c);
        let bg = highlight.unwrap_or(BOARD_BG);

        let (ch, style) = match snap.kind_at(c.x, c.y) {
            Some(kind) => ('●', CellStyle::plain(gem_color(kind), bg).bold()),
            None => ('·', CellStyle::plain(Rgb::new(90, 90, 100), bg).dim()),
        };
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);

        let mid_x = px + self.cell_w / 2;
        let mid_y = py + self.cell_h / 2;
        fb.put_char(mid_x, mid_y, ch, style);

        if bracket && self.cell_w >= 3 {
            let edge = CellStyle::plain(Rgb::new(255, 255, 255), bg).bold();
            fb.put_char(px, mid_y, '[', edge);
            fb.put_char(px + self.cell_w - 1, mid_y, ']', edge);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &BoardSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let rows: [(&str, u32); 5] = [
            ("MOVES", snap.stats.moves),
            ("MATCHES", snap.stats.matches),
            ("CLEARED", snap.stats.gems_cleared),
            ("CASCADES", snap.stats.cascades),
            ("SEED", snap.seed),
        ];

        let mut y = frame.y;
        for (name, n) in rows {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y.saturating_add(1), n, value);
            y = y.saturating_add(3);
        }

        fb.put_str(panel_x, y, "AI", label);
        y = y.saturating_add(1);
        match adapter {
            Some(st) => {
                fb.put_str(panel_x, y, "ON", value);
                fb.put_u32(panel_x + 3, y, st.port as u32, value.dim());
                fb.put_u32(panel_x, y.saturating_add(1), st.commands, value);
            }
            None => fb.put_str(panel_x, y, "OFF", value),
        }
    }

    /// Board cell under a terminal cell, if any
    pub fn screen_to_cell(
        &self,
        snap: &BoardSnapshot,
        viewport: Viewport,
        column: u16,
        row: u16,
    ) -> Option<Coord> {
        let (cx, cy, _, _) = self.locate(snap, viewport, column, row)?;
        Some(Coord::new(cx, cy))
    }

    /// World position under a terminal cell, using the board's projection
    ///
    /// The position falls inside the cell proportionally to where the terminal
    /// cell sits within it, so `world_to_grid` maps it back to the same cell.
    pub fn screen_to_world(
        &self,
        snap: &BoardSnapshot,
        board: &BoardConfig,
        viewport: Viewport,
        column: u16,
        row: u16,
    ) -> Option<WorldPos> {
        let (cx, cy, fx, fy) = self.locate(snap, viewport, column, row)?;
        let corner = VerticalConverter.grid_to_world(cx, cy, board.cell_size, board.origin);
        Some(WorldPos::new(
            corner.x + fx * board.cell_size,
            corner.y + fy * board.cell_size,
        ))
    }

    /// Board cell plus the fractional position inside it
    fn locate(
        &self,
        snap: &BoardSnapshot,
        viewport: Viewport,
        column: u16,
        row: u16,
    ) -> Option<(i32, i32, f32, f32)> {
        let frame = self.frame(snap, viewport);
        let inner_x = column.checked_sub(frame.x.saturating_add(1))?;
        let inner_y = row.checked_sub(frame.y.saturating_add(1))?;

        let cx = (inner_x / self.cell_w) as i32;
        let screen_row = (inner_y / self.cell_h) as i32;
        if cx >= snap.width || screen_row >= snap.height {
            return None;
        }
        let cy = snap.height - 1 - screen_row;

        let fx = ((inner_x % self.cell_w) as f32 + 0.5) / self.cell_w as f32;
        // Terminal rows grow down, world y grows up.
        let fy = 1.0 - ((inner_y % self.cell_h) as f32 + 0.5) / self.cell_h as f32;
        Some((cx, cy, fx, fy))
    }
}

fn draw_border(fb: &mut FrameBuffer, frame: Frame, style: CellStyle) {
    let Frame { x, y, w, h } = frame;
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

/// Board extent in terminal units; negatives become 0, huge values `u16::MAX`
fn clamp_u16(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

pub fn gem_color(kind: GemKind) -> Rgb {
    match kind {
        GemKind::Red => Rgb::new(220, 70, 70),
        GemKind::Orange => Rgb::new(255, 160, 40),
        GemKind::Yellow => Rgb::new(240, 220, 80),
        GemKind::Green => Rgb::new(90, 210, 110),
        GemKind::Blue => Rgb::new(80, 130, 230),
        GemKind::Purple => Rgb::new(190, 110, 220),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(width: i32, height: i32) -> BoardSnapshot {
        BoardSnapshot {
            width,
            height,
            cells: vec![Some(GemKind::Red); (width * height) as usize],
            ..BoardSnapshot::default()
        }
    }

    #[test]
    fn test_frame_is_centered() {
        let view = GameView::default();
        let frame = view.frame(&snap(4, 2), Viewport::new(20, 10));
        assert_eq!(frame, Frame { x: 3, y: 3, w: 14, h: 4 });
    }

    #[test]
    fn test_bottom_row_renders_last() {
        let view = GameView::new(1, 1).with_anchor_y(AnchorY::Top);
        let mut s = snap(2, 2);
        s.cells = vec![Some(GemKind::Red), None, None, None];
        let fb = view.render(&s, None, Viewport::new(4, 4));
        // Frame rows: 0 border, 1 board y=1, 2 board y=0, 3 border.
        assert_eq!(fb.row_text(2), "│●·│");
        assert_eq!(fb.row_text(1), "│··│");
    }

    #[test]
    fn test_screen_to_cell_flips_rows() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let s = snap(4, 3);
        let vp = Viewport::new(14, 5);
        // frame x = 0, interior starts at column 1, row 1.
        assert_eq!(view.screen_to_cell(&s, vp, 1, 1), Some(Coord::new(0, 2)));
        assert_eq!(view.screen_to_cell(&s, vp, 12, 3), Some(Coord::new(3, 0)));
        assert_eq!(view.screen_to_cell(&s, vp, 0, 1), None);
        assert_eq!(view.screen_to_cell(&s, vp, 13, 1), None);
        assert_eq!(view.screen_to_cell(&s, vp, 5, 4), None);
    }

    #[test]
    fn test_oversized_board_renders_without_overflow() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let wide = snap(30_000, 1);
        let fb = view.render(&wide, Some(Coord::new(29_999, 0)), Viewport::new(20, 5));
        assert_eq!(fb.get(0, 0).map(|c| c.ch), Some('┌'));
        assert_eq!(fb.get(1, 1).map(|c| c.ch), Some(' '));

        let tall = snap(1, 70_000);
        let fb = view.render(&tall, None, Viewport::new(10, 10));
        assert_eq!(fb.height(), 10);
        assert_eq!(
            view.screen_to_cell(&tall, Viewport::new(10, 10), 4, 1),
            Some(Coord::new(0, 69_999))
        );
    }

    #[test]
    fn test_screen_to_world_lands_inside_cell() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let s = snap(4, 3);
        let vp = Viewport::new(14, 5);
        let board = BoardConfig {
            cell_size: 2.0,
            origin: WorldPos::new(10.0, -4.0),
            ..BoardConfig::default()
        };
        let pos = view.screen_to_world(&s, &board, vp, 5, 2).unwrap();
        let cell = VerticalConverter.world_to_grid(pos, board.cell_size, board.origin);
        assert_eq!(cell, Coord::new(1, 1));
    }
}
