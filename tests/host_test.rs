mod common;
use common::*;
use edubasic::host::{Host, MemoryFileSystem, RecordingAudio};
use edubasic::lang::ast::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_audio_requests() {
    let audio = RecordingAudio::new();
    let log = audio.log();
    let (mut r, t) = runtime_with(
        vec![
            Statement::Tempo(int(120)),
            Statement::Volume(int(80)),
            Statement::Voice(int(2)),
            Statement::Play(int(0), string("CDE")),
            Statement::PlayStop,
            Statement::Volume(int(101)),
        ],
        Host::new().with_audio(audio),
    );
    assert_eq!(
        exec_runtime(&mut r, &t),
        "?ILLEGAL FUNCTION CALL IN LINE 6; VOLUME must be 0 to 100\n"
    );
    assert_eq!(
        *log.borrow(),
        vec!["TEMPO 120", "VOLUME 80", "VOICE 2", "PLAY 0 CDE", "STOP"]
    );
}

#[test]
fn test_file_round_trip() {
    let (mut r, t) = runtime_with(
        vec![
            Statement::Open(string("notes.txt"), FileMode::Write, Variable::from("h%")),
            Statement::WriteBytes(var("h%"), string("hello")),
            Statement::Close(var("h%")),
            Statement::Open(string("notes.txt"), FileMode::Read, Variable::from("h%")),
            Statement::ReadBytes(var("h%"), int(4), Variable::from("s$")),
            print(vec![
                var("h%"),
                string(" "),
                var("s$"),
                string(" "),
                call_fn("TELL", vec![var("h%")]),
                string(" "),
                call_fn("EOF", vec![var("h%")]),
            ]),
            Statement::Seek(var("h%"), int(0)),
            Statement::ReadBytes(var("h%"), int(99), Variable::from("b%[]")),
            print(vec![var("b%[]"), string(" "), call_fn("EOF", vec![var("h%")])]),
        ],
        Host::new().with_file_system(MemoryFileSystem::new()),
    );
    assert_eq!(
        exec_runtime(&mut r, &t),
        "2 hell 4 0\n[104, 101, 108, 108, 111] -1\n"
    );
}

#[test]
fn test_whole_file_operations() {
    let fs = MemoryFileSystem::new().with_file("in.txt", b"abc");
    let out = exec_with(
        vec![
            Statement::ReadFile(string("in.txt"), Variable::from("s$")),
            Statement::WriteFile(string("out.txt"), add(var("s$"), string("!"))),
            Statement::ReadFile(string("out.txt"), Variable::from("t$")),
            print(vec![var("t$")]),
            Statement::ReadFile(string("missing.txt"), Variable::from("t$")),
        ],
        Host::new().with_file_system(fs),
    );
    assert_eq!(out, "abc!\n?FILE NOT FOUND IN LINE 5; missing.txt\n");
}

#[test]
fn test_file_errors_can_be_caught() {
    let out = exec(vec![
        Statement::Try,
        Statement::Close(int(7)),
        Statement::Catch(Some("e$".into())),
        print(vec![var("e$")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "No open file #7\n");
}

#[test]
fn test_write_to_read_handle() {
    let fs = MemoryFileSystem::new().with_file("ro", b"x");
    let out = exec_with(
        vec![
            Statement::Open(string("ro"), FileMode::Read, Variable::from("h%")),
            Statement::WriteBytes(var("h%"), string("y")),
        ],
        Host::new().with_file_system(fs),
    );
    assert_eq!(out, "?BAD FILE MODE IN LINE 2; File not open for writing\n");
}

#[test]
fn test_view_calls_back() {
    let seen = Rc::new(RefCell::new(vec![]));
    let sink = Rc::clone(&seen);
    let out = exec_with(
        vec![
            Statement::View(string("graphics")),
            Statement::View(string("text")),
        ],
        Host::new().on_tab_switch(move |tab| sink.borrow_mut().push(tab.to_string())),
    );
    assert_eq!(out, "");
    assert_eq!(*seen.borrow(), vec!["graphics", "text"]);
}

#[test]
fn test_view_without_callback() {
    assert_eq!(exec(vec![Statement::View(string("graphics"))]), "");
}

#[test]
fn test_drawing() {
    let (mut r, t) = runtime(vec![
        Statement::Color(int(0xFF0000), None),
        Statement::Draw(Shape::Pixel, vec![int(3), int(4)], false),
        Statement::Draw(Shape::Line, vec![int(0), int(10), int(9), int(10)], false),
        Statement::Draw(Shape::Circle, vec![int(1)], false),
    ]);
    assert_eq!(
        exec_runtime(&mut r, &t),
        "?WRONG NUMBER OF ARGUMENTS IN LINE 4; Circle expects 3 arguments\n"
    );
    let pixels = r.host_mut().graphics().get_buffer();
    let at = |x: usize, y: usize| pixels[y * 320 + x];
    assert_eq!(at(3, 4), 0xFF0000);
    assert_eq!(at(0, 10), 0xFF0000);
    assert_eq!(at(9, 10), 0xFF0000);
    assert_eq!(at(10, 10), 0);
    assert_eq!(at(4, 4), 0);
}

#[test]
fn test_cls_clears_text() {
    let out = exec(vec![
        print(vec![string("gone")]),
        Statement::Cls,
        print(vec![string("kept")]),
    ]);
    assert_eq!(out, "kept\n");
}

#[test]
fn test_negative_color() {
    let out = exec(vec![Statement::Color(int(-1), None)]);
    assert_eq!(out, "?ILLEGAL FUNCTION CALL IN LINE 1; Color out of range\n");
}

fn exec_with(statements: Vec<Statement>, host: Host) -> String {
    let (mut r, t) = runtime_with(statements, host);
    exec_runtime(&mut r, &t)
}

#[test]
fn test_file_size_limits() {
    let out = exec(vec![
        Statement::Open(string("big"), FileMode::Write, Variable::from("h%")),
        Statement::Seek(var("h%"), int(4_000_000_000_000)),
    ]);
    assert_eq!(
        out,
        "?ILLEGAL FUNCTION CALL IN LINE 2; Seek position out of range\n"
    );
    let out = exec(vec![
        Statement::Open(string("big"), FileMode::Write, Variable::from("h%")),
        Statement::Seek(var("h%"), int(16 << 20)),
        Statement::WriteBytes(var("h%"), string("x")),
    ]);
    assert_eq!(out, "?OUT OF MEMORY IN LINE 3; File too large\n");
}

#[test]
fn test_far_off_screen_shapes_return() {
    let max = i64::max_value();
    let min = i64::min_value();
    let (mut r, t) = runtime(vec![
        Statement::Draw(Shape::Line, vec![int(min), int(5), int(max), int(5)], false),
        Statement::Draw(Shape::Rectangle, vec![int(-10), int(min), int(max), int(max)], false),
        Statement::Draw(Shape::Rectangle, vec![int(max), int(max), int(max), int(max)], true),
        Statement::Draw(Shape::Circle, vec![int(0), int(0), int(max)], false),
        Statement::Draw(
            Shape::Triangle,
            vec![int(min), int(min), int(max), int(min), int(0), int(max)],
            true,
        ),
    ]);
    assert_eq!(exec_runtime(&mut r, &t), "");
    let pixels = r.host_mut().graphics().get_buffer();
    assert_eq!(pixels[5 * 320], 0x00FF_FFFF);
    assert_eq!(pixels[5 * 320 + 319], 0x00FF_FFFF);
}
