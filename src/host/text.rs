use super::Graphics;
use std::cell::RefCell;
use std::rc::Rc;

pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 200;

const WHITE: u32 = 0x00FF_FFFF;
const BLACK: u32 = 0x0000_0000;
const MAX_ARC_STEPS: f64 = 65536.0;

/// ## Text transcript and pixel buffer
///
/// Printed text goes to a transcript shared through `transcript()`.
/// Shapes are plotted point by point into a small RGB buffer; good
/// enough for tests and for hosts that only need the text.

#[derive(Debug, Clone)]
pub struct TextGraphics {
    transcript: Rc<RefCell<String>>,
    pixels: Vec<u32>,
    foreground: u32,
    background: u32,
    cursor: (usize, usize),
}

impl Default for TextGraphics {
    fn default() -> Self {
        TextGraphics {
            transcript: Rc::default(),
            pixels: vec![BLACK; WIDTH * HEIGHT],
            foreground: WHITE,
            background: BLACK,
            cursor: (0, 0),
        }
    }
}

impl TextGraphics {
    pub fn new() -> TextGraphics {
        TextGraphics::default()
    }

    pub fn transcript(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.transcript)
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn foreground(&self) -> u32 {
        self.foreground
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        self.pixels[y as usize * WIDTH + x as usize] = self.foreground;
    }

    fn span(&mut self, x1: i64, x2: i64, y: i64) {
        if y < 0 || y >= HEIGHT as i64 {
            return;
        }
        let from = x1.min(x2).max(0);
        let to = x1.max(x2).min(WIDTH as i64 - 1);
        for x in from..=to {
            self.plot(x, y);
        }
    }

    fn column(&mut self, x: i64, y1: i64, y2: i64) {
        if x < 0 || x >= WIDTH as i64 {
            return;
        }
        let from = y1.min(y2).max(0);
        let to = y1.max(y2).min(HEIGHT as i64 - 1);
        for y in from..=to {
            self.plot(x, y);
        }
    }

    /// Bresenham, after clipping the segment to the screen.
    fn line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        let ((x1, y1), (x2, y2)) = match clip((x1, y1), (x2, y2)) {
            Some(segment) => segment,
            None => return,
        };
        let (dx, dy) = ((x2 - x1).abs(), -(y2 - y1).abs());
        let (sx, sy) = ((x2 - x1).signum(), (y2 - y1).signum());
        let (mut x, mut y, mut err) = (x1, y1, dx + dy);
        loop {
            self.plot(x, y);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn ellipse(&mut self, cx: i64, cy: i64, rx: i64, ry: i64, filled: bool) {
        let (rx, ry) = (rx.saturating_abs().max(1) as f64, ry.saturating_abs().max(1) as f64);
        let (w, h) = (rx.ceil() as i64, ry.ceil() as i64);
        let (top, bottom) = visible(cy, h, HEIGHT);
        let (left, right) = visible(cx, w, WIDTH);
        for dy in top..=bottom {
            for dx in left..=right {
                let d = (dx as f64 / rx).powi(2) + (dy as f64 / ry).powi(2);
                let inside = d <= 1.0;
                let edge = inside && {
                    let outer = ((dx.abs() as f64 + 1.0) / rx).powi(2) + (dy as f64 / ry).powi(2);
                    let upper = (dx as f64 / rx).powi(2) + ((dy.abs() as f64 + 1.0) / ry).powi(2);
                    outer > 1.0 || upper > 1.0
                };
                if (filled && inside) || edge {
                    self.plot(cx + dx, cy + dy);
                }
            }
        }
    }
}

/// Offsets from `centre` within `radius` that land on a screen axis of
/// `size` pixels. Empty when `from > to`.
fn visible(centre: i64, radius: i64, size: usize) -> (i64, i64) {
    let from = (-radius).max(0i64.saturating_sub(centre));
    let to = radius.min((size as i64 - 1).saturating_sub(centre));
    (from, to)
}

/// Cohen-Sutherland clip of a segment to the screen rectangle.
fn clip(a: (i64, i64), b: (i64, i64)) -> Option<((i64, i64), (i64, i64))> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const TOP: u8 = 4;
    const BOTTOM: u8 = 8;
    let (max_x, max_y) = ((WIDTH - 1) as f64, (HEIGHT - 1) as f64);
    let code = |x: f64, y: f64| {
        let mut c = 0;
        if x < 0.0 {
            c |= LEFT;
        } else if x > max_x {
            c |= RIGHT;
        }
        if y < 0.0 {
            c |= TOP;
        } else if y > max_y {
            c |= BOTTOM;
        }
        c
    };
    let (mut x1, mut y1) = (a.0 as f64, a.1 as f64);
    let (mut x2, mut y2) = (b.0 as f64, b.1 as f64);
    let (mut c1, mut c2) = (code(x1, y1), code(x2, y2));
    for _ in 0..8 {
        if c1 | c2 == 0 {
            let round = |x: f64, y: f64| (x.round() as i64, y.round() as i64);
            return Some((round(x1, y1), round(x2, y2)));
        }
        if c1 & c2 != 0 {
            return None;
        }
        let out = if c1 != 0 { c1 } else { c2 };
        let (x, y) = if out & TOP != 0 {
            (x1 + (x2 - x1) * -y1 / (y2 - y1), 0.0)
        } else if out & BOTTOM != 0 {
            (x1 + (x2 - x1) * (max_y - y1) / (y2 - y1), max_y)
        } else if out & RIGHT != 0 {
            (max_x, y1 + (y2 - y1) * (max_x - x1) / (x2 - x1))
        } else {
            (0.0, y1 + (y2 - y1) * -x1 / (x2 - x1))
        };
        if out == c1 {
            x1 = x;
            y1 = y;
            c1 = code(x1, y1);
        } else {
            x2 = x;
            y2 = y;
            c2 = code(x2, y2);
        }
    }
    None
}

impl Graphics for TextGraphics {
    fn print_text(&mut self, text: &str) {
        self.transcript.borrow_mut().push_str(text);
        self.cursor.1 += text.chars().count();
    }

    fn new_line(&mut self) {
        self.transcript.borrow_mut().push('\n');
        self.cursor = (self.cursor.0 + 1, 0);
    }

    fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor = (row, col);
    }

    fn set_foreground(&mut self, color: u32) {
        self.foreground = color;
    }

    fn set_background(&mut self, color: u32) {
        self.background = color;
    }

    fn draw_pixel(&mut self, x: i64, y: i64) {
        self.plot(x, y);
    }

    fn draw_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        self.line(x1, y1, x2, y2);
    }

    fn draw_rect(&mut self, x: i64, y: i64, width: i64, height: i64, filled: bool) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (x2, y2) = (x.saturating_add(width - 1), y.saturating_add(height - 1));
        if filled {
            for row in y.max(0)..=y2.min(HEIGHT as i64 - 1) {
                self.span(x, x2, row);
            }
        } else {
            self.span(x, x2, y);
            self.span(x, x2, y2);
            self.column(x, y, y2);
            self.column(x2, y, y2);
        }
    }

    fn draw_oval(&mut self, x: i64, y: i64, rx: i64, ry: i64, filled: bool) {
        self.ellipse(x, y, rx, ry, filled);
    }

    fn draw_circle(&mut self, x: i64, y: i64, r: i64, filled: bool) {
        self.ellipse(x, y, r, r, filled);
    }

    fn draw_triangle(&mut self, points: [(i64, i64); 3], filled: bool) {
        let [a, b, c] = points;
        if filled {
            let area = |p: (i64, i64), q: (i64, i64), r: (i64, i64)| {
                let (p0, p1) = (p.0 as f64, p.1 as f64);
                (q.0 as f64 - p0) * (r.1 as f64 - p1) - (q.1 as f64 - p1) * (r.0 as f64 - p0)
            };
            let min_x = a.0.min(b.0).min(c.0).max(0);
            let max_x = a.0.max(b.0).max(c.0).min(WIDTH as i64 - 1);
            let min_y = a.1.min(b.1).min(c.1).max(0);
            let max_y = a.1.max(b.1).max(c.1).min(HEIGHT as i64 - 1);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let p = (x, y);
                    let (w0, w1, w2) = (area(b, c, p), area(c, a, p), area(a, b, p));
                    if (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0) {
                        self.plot(x, y);
                    }
                }
            }
        }
        self.line(a.0, a.1, b.0, b.1);
        self.line(b.0, b.1, c.0, c.1);
        self.line(c.0, c.1, a.0, a.1);
    }

    fn draw_arc(&mut self, x: i64, y: i64, r: i64, from: f64, to: f64) {
        let r = r.saturating_abs() as f64;
        let sweep = if to >= from { to - from } else { to - from + 360.0 };
        let steps = ((sweep / 360.0) * r * std::f64::consts::PI * 2.0)
            .ceil()
            .max(1.0)
            .min(MAX_ARC_STEPS) as i64;
        for i in 0..=steps {
            let angle = (from + sweep * i as f64 / steps as f64).to_radians();
            let px = x.saturating_add((r * angle.cos()).round() as i64);
            let py = y.saturating_sub((r * angle.sin()).round() as i64);
            self.plot(px, py);
        }
    }

    fn clear(&mut self) {
        let background = self.background;
        self.pixels.iter_mut().for_each(|p| *p = background);
        self.transcript.borrow_mut().clear();
        self.cursor = (0, 0);
    }

    fn get_buffer(&self) -> Vec<u32> {
        self.pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(g: &TextGraphics, x: usize, y: usize) -> u32 {
        g.get_buffer()[y * WIDTH + x]
    }

    #[test]
    fn test_transcript() {
        let mut g = TextGraphics::new();
        let out = g.transcript();
        g.print_text("HI");
        g.new_line();
        assert_eq!(out.borrow().as_str(), "HI\n");
        assert_eq!(g.cursor(), (1, 0));
        g.clear();
        assert_eq!(out.borrow().as_str(), "");
    }

    #[test]
    fn test_line_and_clip() {
        let mut g = TextGraphics::new();
        g.set_foreground(0xFF0000);
        g.draw_line(0, 0, 3, 3);
        assert_eq!(at(&g, 2, 2), 0xFF0000);
        assert_eq!(at(&g, 3, 2), BLACK);
        g.draw_pixel(-5, 9999);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip((-10, 5), (400, 5)), Some(((0, 5), (319, 5))));
        assert_eq!(clip((-5, -5), (5, 5)), Some(((0, 0), (5, 5))));
        assert_eq!(clip((-10, -10), (-1, 300)), None);
        assert_eq!(
            clip((i64::min_value(), 7), (i64::max_value(), 7)),
            Some(((0, 7), (319, 7)))
        );
    }

    #[test]
    fn test_filled_shapes() {
        let mut g = TextGraphics::new();
        g.draw_rect(10, 10, 4, 4, true);
        assert_eq!(at(&g, 12, 12), WHITE);
        g.draw_circle(50, 50, 5, false);
        assert_eq!(at(&g, 55, 50), WHITE);
        assert_eq!(at(&g, 50, 50), BLACK);
        g.draw_triangle([(100, 100), (110, 100), (100, 110)], true);
        assert_eq!(at(&g, 102, 102), WHITE);
    }
}
