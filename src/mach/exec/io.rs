use super::{Machine, Result, Status};
use crate::error;
use crate::lang::ast::{Expression, FileMode, PrintItem, Shape, Variable};
use crate::lang::ident::{self, Sigil};
use crate::mach::{Array, Val, ValType};
use std::convert::TryFrom;
use std::time::Duration;

impl<'a> Machine<'a> {
    /// A trailing `,` or `;` suppresses the newline.
    pub(super) fn print(&mut self, items: &[PrintItem]) -> Result<Status> {
        for item in items {
            match item {
                PrintItem::Expression(expr) => {
                    let text = self.eval(expr)?.to_string();
                    self.host.graphics().print_text(&text);
                }
                PrintItem::Comma => self.host.graphics().print_text("\t"),
                PrintItem::Semicolon => {}
            }
        }
        match items.last() {
            Some(PrintItem::Comma) | Some(PrintItem::Semicolon) => {}
            _ => self.host.graphics().new_line(),
        }
        Ok(Status::Next)
    }

    pub(super) fn randomize(&mut self, seed: Option<&Expression>) -> Result<Status> {
        let seed = match seed {
            Some(expr) => Some(self.eval_integer(expr)? as u64),
            None => None,
        };
        self.context.randomize(seed);
        Ok(Status::Next)
    }

    /// Records a wake-up delay; the driver defers further steps.
    pub(super) fn sleep(&mut self, seconds: &Expression) -> Result<Status> {
        let seconds = self.eval_real(seconds)?;
        if seconds.is_nan() || seconds < 0.0 {
            return Err(error!(IllegalFunctionCall; "SLEEP needs a positive number of seconds"));
        }
        if seconds > 0.0 {
            self.sleep = Some(Duration::from_secs_f64(seconds.min(1.0e9)));
        }
        Ok(Status::Next)
    }

    pub(super) fn view(&mut self, target: &Expression) -> Result<Status> {
        let target = self.eval_string(target)?;
        self.host.request_tab_switch(&target);
        Ok(Status::Next)
    }

    pub(super) fn color(&mut self, fg: &Expression, bg: Option<&Expression>) -> Result<Status> {
        let fg = self.eval_color(fg)?;
        self.host.graphics().set_foreground(fg);
        if let Some(bg) = bg {
            let bg = self.eval_color(bg)?;
            self.host.graphics().set_background(bg);
        }
        Ok(Status::Next)
    }

    fn eval_color(&mut self, expr: &Expression) -> Result<u32> {
        let n = self.eval_integer(expr)?;
        u32::try_from(n).map_err(|_| error!(IllegalFunctionCall; "Color out of range"))
    }

    pub(super) fn locate(&mut self, row: &Expression, col: &Expression) -> Result<Status> {
        let row = usize::try_from(self.eval(row)?)?;
        let col = usize::try_from(self.eval(col)?)?;
        self.host.graphics().set_cursor(row, col);
        Ok(Status::Next)
    }

    pub(super) fn cls(&mut self) -> Result<Status> {
        self.host.graphics().clear();
        Ok(Status::Next)
    }

    pub(super) fn draw(&mut self, shape: Shape, args: &[Expression], filled: bool) -> Result<Status> {
        let wanted = match shape {
            Shape::Pixel => 2,
            Shape::Line | Shape::Rectangle | Shape::Oval => 4,
            Shape::Circle => 3,
            Shape::Triangle => 6,
            Shape::Arc => 5,
        };
        if args.len() != wanted {
            return Err(error!(WrongNumberOfArguments; &format!(
                "{:?} expects {} arguments",
                shape, wanted
            )));
        }
        if shape == Shape::Arc {
            let x = self.eval_integer(&args[0])?;
            let y = self.eval_integer(&args[1])?;
            let r = self.eval_integer(&args[2])?;
            let from = self.eval_real(&args[3])?;
            let to = self.eval_real(&args[4])?;
            self.host.graphics().draw_arc(x, y, r, from, to);
            return Ok(Status::Next);
        }
        let n = args
            .iter()
            .map(|arg| self.eval_integer(arg))
            .collect::<Result<Vec<i64>>>()?;
        let g = self.host.graphics();
        match shape {
            Shape::Pixel => g.draw_pixel(n[0], n[1]),
            Shape::Line => g.draw_line(n[0], n[1], n[2], n[3]),
            Shape::Rectangle => g.draw_rect(n[0], n[1], n[2], n[3], filled),
            Shape::Oval => g.draw_oval(n[0], n[1], n[2], n[3], filled),
            Shape::Circle => g.draw_circle(n[0], n[1], n[2], filled),
            Shape::Triangle => g.draw_triangle([(n[0], n[1]), (n[2], n[3]), (n[4], n[5])], filled),
            Shape::Arc => {}
        }
        Ok(Status::Next)
    }

    pub(super) fn tempo(&mut self, bpm: &Expression) -> Result<Status> {
        let bpm = self.eval_real(bpm)?;
        if !(bpm > 0.0) {
            return Err(error!(IllegalFunctionCall; "TEMPO must be positive"));
        }
        self.host.audio().set_tempo(bpm);
        Ok(Status::Next)
    }

    pub(super) fn volume(&mut self, level: &Expression) -> Result<Status> {
        let level = self.eval_integer(level)?;
        if !(0..=100).contains(&level) {
            return Err(error!(IllegalFunctionCall; "VOLUME must be 0 to 100"));
        }
        self.host.audio().set_volume(level as u8);
        Ok(Status::Next)
    }

    pub(super) fn voice(&mut self, index: &Expression) -> Result<Status> {
        let index = usize::try_from(self.eval(index)?)?;
        self.host.audio().set_voice(index);
        Ok(Status::Next)
    }

    pub(super) fn play(&mut self, voice: &Expression, mml: &Expression) -> Result<Status> {
        let voice = usize::try_from(self.eval(voice)?)?;
        let mml = self.eval_string(mml)?;
        self.host.audio().play_sequence(voice, &mml);
        Ok(Status::Next)
    }

    pub(super) fn play_stop(&mut self) -> Result<Status> {
        self.host.audio().stop();
        Ok(Status::Next)
    }

    pub(super) fn open(&mut self, path: &Expression, mode: FileMode, var: &Variable) -> Result<Status> {
        let path = self.eval_string(path)?;
        let handle = self.host.fs().open(&path, mode)?;
        self.assign(var, Val::Integer(handle))?;
        Ok(Status::Next)
    }

    pub(super) fn close(&mut self, handle: &Expression) -> Result<Status> {
        let handle = self.eval_integer(handle)?;
        self.host.fs().close(handle)?;
        Ok(Status::Next)
    }

    /// Into a STRING variable the bytes arrive as text, otherwise as an
    /// INTEGER array.
    pub(super) fn read_bytes(
        &mut self,
        handle: &Expression,
        count: &Expression,
        var: &Variable,
    ) -> Result<Status> {
        let handle = self.eval_integer(handle)?;
        let count = usize::try_from(self.eval(count)?)?;
        let bytes = self.host.fs().read_bytes(handle, count)?;
        let value = bytes_to_val(var, bytes)?;
        self.assign(var, value)?;
        Ok(Status::Next)
    }

    pub(super) fn write_bytes(&mut self, handle: &Expression, data: &Expression) -> Result<Status> {
        let handle = self.eval_integer(handle)?;
        let bytes = val_to_bytes(self.eval(data)?)?;
        self.host.fs().write_bytes(handle, &bytes)?;
        Ok(Status::Next)
    }

    pub(super) fn seek(&mut self, handle: &Expression, position: &Expression) -> Result<Status> {
        let handle = self.eval_integer(handle)?;
        let position = usize::try_from(self.eval(position)?)?;
        self.host.fs().seek(handle, position as u64)?;
        Ok(Status::Next)
    }

    pub(super) fn read_file(&mut self, path: &Expression, var: &Variable) -> Result<Status> {
        let path = self.eval_string(path)?;
        let bytes = self.host.fs().read_file(&path)?;
        let value = bytes_to_val(var, bytes)?;
        self.assign(var, value)?;
        Ok(Status::Next)
    }

    pub(super) fn write_file(&mut self, path: &Expression, data: &Expression) -> Result<Status> {
        let path = self.eval_string(path)?;
        let bytes = val_to_bytes(self.eval(data)?)?;
        self.host.fs().write_file(&path, &bytes)?;
        Ok(Status::Next)
    }
}

fn bytes_to_val(var: &Variable, bytes: Vec<u8>) -> Result<Val> {
    let name = var.name();
    if Sigil::of(name) == Sigil::String && !ident::is_array(name) {
        return Ok(Val::String(String::from_utf8_lossy(&bytes).as_ref().into()));
    }
    let items = bytes.into_iter().map(|b| Val::Integer(b as i64)).collect();
    Ok(Val::Array(Box::new(Array::from_items(ValType::Integer, items)?)))
}

fn val_to_bytes(val: Val) -> Result<Vec<u8>> {
    match val {
        Val::String(s) => Ok(s.as_bytes().to_vec()),
        Val::Array(array) => array
            .items()
            .iter()
            .map(|item| {
                let n = i64::try_from(item.clone())?;
                u8::try_from(n).map_err(|_| error!(IllegalFunctionCall; "Byte out of range"))
            })
            .collect(),
        v => Ok(v.to_string().into_bytes()),
    }
}
