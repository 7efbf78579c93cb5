/*!
## Terminal host

Runs a program in an ANSI terminal. Text goes to stdout in the current
colours; shapes land in an off-screen buffer. Ctrl-C interrupts the run.

*/

extern crate ansi_term;
extern crate ctrlc;
use crate::host::{Graphics, Host, TextGraphics};
use crate::mach::{Event, Program, Runtime};
use ansi_term::{Colour, Style};
use chrono::Utc;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CYCLES: usize = 5000;
const MAX_NAP: Duration = Duration::from_millis(50);

pub fn main(program: Program) {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Ctrl-C handler unavailable: {}", error);
    }
    if let Err(error) = main_loop(program, interrupted) {
        eprintln!("{}", error);
    }
}

fn main_loop(program: Program, interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let host = Host::new()
        .with_graphics(AnsiGraphics::default())
        .on_tab_switch(|target| tracing::info!(target_tab = target, "VIEW"));
    let mut runtime = Runtime::new(program).with_host(host);
    loop {
        if interrupted.load(Ordering::SeqCst) {
            runtime.interrupt();
            interrupted.store(false, Ordering::SeqCst);
        }
        match runtime.execute(CYCLES) {
            Event::Running => {}
            Event::Sleeping(until) => {
                let wait = (until - Utc::now()).to_std().unwrap_or_default();
                std::thread::sleep(wait.min(MAX_NAP));
            }
            Event::Stopped => break,
            Event::Error(error) => {
                let mut stdout = std::io::stdout();
                writeln!(stdout)?;
                writeln!(stdout, "{}", Style::new().bold().paint(error.to_string()))?;
                break;
            }
        }
    }
    std::io::stdout().flush()
}

/// Prints through ANSI escapes; shapes go to an off-screen buffer.
#[derive(Default)]
struct AnsiGraphics {
    canvas: TextGraphics,
    style: Style,
}

fn colour(rgb: u32) -> Colour {
    Colour::RGB((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

impl AnsiGraphics {
    fn emit(&self, text: &str) {
        let mut stdout = std::io::stdout();
        // A closed stdout has nowhere to report to.
        let _ = write!(stdout, "{}", text);
        let _ = stdout.flush();
    }
}

impl Graphics for AnsiGraphics {
    fn print_text(&mut self, text: &str) {
        self.emit(&self.style.paint(text).to_string());
    }

    fn new_line(&mut self) {
        self.emit("\n");
    }

    fn set_cursor(&mut self, row: usize, col: usize) {
        self.emit(&format!("\x1b[{};{}H", row + 1, col + 1));
    }

    fn set_foreground(&mut self, color: u32) {
        self.canvas.set_foreground(color);
        self.style = self.style.fg(colour(color));
    }

    fn set_background(&mut self, color: u32) {
        self.canvas.set_background(color);
        self.style = self.style.on(colour(color));
    }

    fn draw_pixel(&mut self, x: i64, y: i64) {
        self.canvas.draw_pixel(x, y);
    }

    fn draw_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        self.canvas.draw_line(x1, y1, x2, y2);
    }

    fn draw_rect(&mut self, x: i64, y: i64, width: i64, height: i64, filled: bool) {
        self.canvas.draw_rect(x, y, width, height, filled);
    }

    fn draw_oval(&mut self, x: i64, y: i64, rx: i64, ry: i64, filled: bool) {
        self.canvas.draw_oval(x, y, rx, ry, filled);
    }

    fn draw_circle(&mut self, x: i64, y: i64, r: i64, filled: bool) {
        self.canvas.draw_circle(x, y, r, filled);
    }

    fn draw_triangle(&mut self, points: [(i64, i64); 3], filled: bool) {
        self.canvas.draw_triangle(points, filled);
    }

    fn draw_arc(&mut self, x: i64, y: i64, r: i64, from: f64, to: f64) {
        self.canvas.draw_arc(x, y, r, from, to);
    }

    fn clear(&mut self) {
        self.canvas.clear();
        self.emit("\x1b[2J\x1b[H");
    }

    fn get_buffer(&self) -> Vec<u32> {
        self.canvas.get_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_split() {
        assert_eq!(colour(0x102030), Colour::RGB(0x10, 0x20, 0x30));
    }

    #[test]
    fn test_shapes_reach_canvas() {
        let mut g = AnsiGraphics::default();
        g.draw_pixel(1, 1);
        assert!(g.get_buffer().iter().any(|&p| p != 0));
    }
}
