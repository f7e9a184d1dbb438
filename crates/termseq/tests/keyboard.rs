//! Key events through the terminal facade.

use std::time::{Duration, Instant};

use termseq::core::testing::ScriptedSource;
use termseq::core::{BuiltinDatabase, RegistryHost};
use termseq::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn terminal(kind: &str, source: ScriptedSource) -> Terminal {
    let host = RegistryHost::new(BuiltinDatabase::new());
    let env = TerminalEnv::from_values(Some(kind), None, None);
    let options = TerminalOptions::new()
        .with_tty(false)
        .with_keyboard(false)
        .with_esc_delay(ms(80));
    Terminal::with_host(&host, env, options)
        .unwrap()
        .with_keyboard(source)
}

#[test]
fn arrow_key_in_one_read() {
    let mut term = terminal("xterm-256color", ScriptedSource::new().then(Duration::ZERO, b"\x1b[A"));
    let event = term.next_event(Some(ms(500))).unwrap();
    assert!(event.is_sequence());
    assert_eq!(event.code(), Some(KeyCode::Up));
    assert_eq!(event.name().as_deref(), Some("KEY_UP"));
    assert!(term.pending_input().is_empty());
}

#[test]
fn application_mode_arrows_from_database() {
    let mut term = terminal("xterm-256color", ScriptedSource::new().then(Duration::ZERO, b"\x1bOD"));
    let event = term.next_event(Some(ms(500))).unwrap();
    assert_eq!(event.code(), Some(KeyCode::Left));
}

#[test]
fn bare_escape_waits_for_esc_delay() {
    let mut term = terminal("xterm-256color", ScriptedSource::new().then(Duration::ZERO, b"\x1b"));
    let start = Instant::now();
    let event = term.next_event(Some(ms(500))).unwrap();
    let elapsed = start.elapsed();
    assert_eq!(event.code(), Some(KeyCode::Escape));
    assert!(elapsed >= ms(70), "{elapsed:?}");
    assert!(elapsed < ms(450), "{elapsed:?}");
}

#[test]
fn late_sequence_tail_joins_escape() {
    let source = ScriptedSource::new()
        .then(Duration::ZERO, b"\x1b")
        .then(ms(20), b"[B");
    let mut term = terminal("xterm-256color", source);
    let event = term.next_event(Some(ms(500))).unwrap();
    assert_eq!(event.code(), Some(KeyCode::Down));
    assert_eq!(event.raw_text(), "\x1b[B");
}

#[test]
fn split_codepoint_carries_over() {
    let source = ScriptedSource::new()
        .then(Duration::ZERO, &[0xF0, 0x9F])
        .then(ms(10), &[0x98, 0x80, b'z']);
    let mut term = terminal("xterm", source);
    let first = term.next_event(Some(ms(500))).unwrap();
    assert_eq!(first.raw_text(), "\u{1F600}");
    let second = term.next_event(Some(ms(500))).unwrap();
    assert_eq!(second.raw_text(), "z");
    assert!(term.next_event(Some(ms(20))).unwrap().is_empty());
}

#[test]
fn timeout_returns_empty_event() {
    let mut term = terminal("xterm", ScriptedSource::new());
    let start = Instant::now();
    let event = term.next_event(Some(ms(40))).unwrap();
    assert!(event.is_empty());
    assert!(start.elapsed() >= ms(35));
    assert!(!term.kbhit(Some(Duration::ZERO)).unwrap());
}

#[test]
fn burst_is_consumed_one_key_at_a_time() {
    let source = ScriptedSource::new().then(Duration::ZERO, b"a\x1b[Cb\r");
    let mut term = terminal("xterm", source);
    let mut seen = Vec::new();
    while term.poll(Some(ms(20))).unwrap() {
        let event = term.next_event(Some(Duration::ZERO)).unwrap();
        if event.is_empty() {
            break;
        }
        seen.push(event.name().map_or_else(|| event.to_string(), |name| name.into_owned()));
    }
    assert_eq!(seen, ["a", "KEY_RIGHT", "b", "KEY_ENTER"]);
}

#[test]
fn non_interactive_keyboard_never_blocks() {
    let mut term = terminal(
        "xterm",
        ScriptedSource::new().then(Duration::ZERO, b"x").non_interactive(),
    );
    let start = Instant::now();
    assert!(!term.poll(None).unwrap());
    assert!(term.next_event(None).unwrap().is_empty());
    assert!(start.elapsed() < ms(100));
}
