/*!
## Rust Host Module

The engine's view of the outside world: a drawing surface, an audio
player and a file system. Hosts plug in their own implementations;
the in-memory ones here back the tests and the terminal front end.

*/

use crate::lang::ast::FileMode;
use crate::lang::Error;

mod audio;
mod memfs;
mod text;

pub use audio::RecordingAudio;
pub use memfs::MemoryFileSystem;
pub use text::TextGraphics;

type Result<T> = std::result::Result<T, Error>;

pub trait Graphics {
    fn print_text(&mut self, text: &str);
    fn new_line(&mut self);
    fn set_cursor(&mut self, row: usize, col: usize);
    fn set_foreground(&mut self, color: u32);
    fn set_background(&mut self, color: u32);
    fn draw_pixel(&mut self, x: i64, y: i64);
    fn draw_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64);
    fn draw_rect(&mut self, x: i64, y: i64, width: i64, height: i64, filled: bool);
    fn draw_oval(&mut self, x: i64, y: i64, rx: i64, ry: i64, filled: bool);
    fn draw_circle(&mut self, x: i64, y: i64, r: i64, filled: bool);
    fn draw_triangle(&mut self, points: [(i64, i64); 3], filled: bool);
    /// Angles in degrees, counter-clockwise from the positive x axis.
    fn draw_arc(&mut self, x: i64, y: i64, r: i64, from: f64, to: f64);
    fn clear(&mut self);
    /// Pixels in row-major order.
    fn get_buffer(&self) -> Vec<u32>;
}

pub trait Audio {
    fn set_tempo(&mut self, bpm: f64);
    /// 0 to 100.
    fn set_volume(&mut self, volume: u8);
    fn set_voice(&mut self, voice: usize);
    fn play_sequence(&mut self, voice: usize, mml: &str);
    fn stop(&mut self);
}

/// Handles are positive, issued in increasing order, and dead once closed.
pub trait FileSystem {
    fn open(&mut self, path: &str, mode: FileMode) -> Result<i64>;
    fn close(&mut self, handle: i64) -> Result<()>;
    fn read_bytes(&mut self, handle: i64, count: usize) -> Result<Vec<u8>>;
    fn write_bytes(&mut self, handle: i64, data: &[u8]) -> Result<()>;
    fn seek(&mut self, handle: i64, position: u64) -> Result<()>;
    fn tell(&self, handle: i64) -> Result<u64>;
    fn eof(&self, handle: i64) -> Result<bool>;
    fn read_file(&mut self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()>;
}

/// The collaborators of one session plus the optional tab-switch callback.
pub struct Host {
    graphics: Box<dyn Graphics>,
    audio: Box<dyn Audio>,
    fs: Box<dyn FileSystem>,
    tab_switch: Option<Box<dyn FnMut(&str)>>,
}

impl Default for Host {
    fn default() -> Self {
        Host {
            graphics: Box::new(TextGraphics::default()),
            audio: Box::new(RecordingAudio::default()),
            fs: Box::new(MemoryFileSystem::default()),
            tab_switch: None,
        }
    }
}

impl Host {
    pub fn new() -> Host {
        Host::default()
    }

    pub fn with_graphics<G: Graphics + 'static>(mut self, graphics: G) -> Host {
        self.graphics = Box::new(graphics);
        self
    }

    pub fn with_audio<A: Audio + 'static>(mut self, audio: A) -> Host {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_file_system<F: FileSystem + 'static>(mut self, fs: F) -> Host {
        self.fs = Box::new(fs);
        self
    }

    pub fn on_tab_switch<F: FnMut(&str) + 'static>(mut self, callback: F) -> Host {
        self.tab_switch = Some(Box::new(callback));
        self
    }

    pub fn graphics(&mut self) -> &mut dyn Graphics {
        self.graphics.as_mut()
    }

    pub fn audio(&mut self) -> &mut dyn Audio {
        self.audio.as_mut()
    }

    pub fn fs(&mut self) -> &mut dyn FileSystem {
        self.fs.as_mut()
    }

    /// Ignored when no callback is installed.
    pub fn request_tab_switch(&mut self, target: &str) {
        if let Some(callback) = self.tab_switch.as_mut() {
            callback(target);
        }
    }
}
