//! Scripted interaction sessions.
//!
//! DESIGN
//! ======
//! A session feeds one command per line into a mounted viewer, standing in
//! for the pointer, wheel, keyboard, and toolbar events a browser would
//! deliver. Keys go through the shared [`KeyBus`] exactly as window-level
//! key events would, so dismissal only reaches a viewer that is listening.

use std::fmt::Write as _;
use std::str::FromStr;

use viewer::fullscreen::{KeyBus, PresentationMode};
use viewer::input::{Key, Modifiers, WheelDelta};
use viewer::sink::RenderSink;
use viewer::toolbar::ToolbarCommand;
use viewer::transform::Point;
use viewer::viewer::{Action, DiagramViewer, LOADING_TEXT, ViewerSurface};

/// Errors produced while parsing a session line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    Arguments { command: &'static str, expected: &'static str },

    #[error("invalid number `{0}`")]
    Number(String),
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Toolbar(ToolbarCommand),
    /// Toggle fullscreen the way the toolbar button does.
    Fullscreen,
    Down(Point),
    Move(Point),
    Up,
    Leave,
    Wheel { dy: f64, ctrl: bool },
    Key(Key),
    Show,
}

impl FromStr for SessionCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Self::Show);
        };
        let args: Vec<&str> = words.collect();
        match (head, args.as_slice()) {
            ("zoom-in", []) => Ok(Self::Toolbar(ToolbarCommand::ZoomIn)),
            ("zoom-out", []) => Ok(Self::Toolbar(ToolbarCommand::ZoomOut)),
            ("reset", []) => Ok(Self::Toolbar(ToolbarCommand::Reset)),
            ("fullscreen", []) => Ok(Self::Fullscreen),
            ("exit", []) => Ok(Self::Toolbar(ToolbarCommand::ExitFullscreen)),
            ("down", [x, y]) => Ok(Self::Down(point(x, y)?)),
            ("move", [x, y]) => Ok(Self::Move(point(x, y)?)),
            ("up", []) => Ok(Self::Up),
            ("leave", []) => Ok(Self::Leave),
            ("wheel", [dy]) => Ok(Self::Wheel { dy: number(dy)?, ctrl: false }),
            ("wheel", [dy, "ctrl"]) => Ok(Self::Wheel { dy: number(dy)?, ctrl: true }),
            ("key", [name]) => Ok(Self::Key(Key::new(*name))),
            ("show", []) => Ok(Self::Show),
            ("down" | "move", _) => Err(ParseError::Arguments { command: "down/move", expected: "`x y`" }),
            ("wheel", _) => Err(ParseError::Arguments { command: "wheel", expected: "`dy [ctrl]`" }),
            ("key", _) => Err(ParseError::Arguments { command: "key", expected: "a key name" }),
            (other, _) => Err(ParseError::Unknown(other.to_owned())),
        }
    }
}

fn number(raw: &str) -> Result<f64, ParseError> {
    raw.parse::<f64>().map_err(|_| ParseError::Number(raw.to_owned()))
}

fn point(x: &str, y: &str) -> Result<Point, ParseError> {
    Ok(Point::new(number(x)?, number(y)?))
}

/// Feed one command into the viewer.
pub fn apply<S: RenderSink>(viewer: &mut DiagramViewer<S>, bus: &KeyBus, command: &SessionCommand) -> Vec<Action> {
    match command {
        SessionCommand::Toolbar(toolbar) => viewer.command(*toolbar),
        SessionCommand::Fullscreen => match viewer.mode() {
            PresentationMode::Inline => viewer.command(ToolbarCommand::EnterFullscreen),
            PresentationMode::Fullscreen => viewer.command(ToolbarCommand::ExitFullscreen),
        },
        SessionCommand::Down(p) => viewer.on_pointer_down(*p),
        SessionCommand::Move(p) => viewer.on_pointer_move(*p),
        SessionCommand::Up => viewer.on_pointer_up(),
        SessionCommand::Leave => viewer.on_pointer_leave(),
        SessionCommand::Wheel { dy, ctrl } => {
            viewer.on_wheel(WheelDelta { dx: 0.0, dy: *dy }, Modifiers { ctrl: *ctrl, ..Modifiers::default() })
        }
        SessionCommand::Key(key) => {
            let listeners = bus.dispatch(key);
            tracing::debug!(key = %key.0, listeners, "key dispatched");
            viewer.sync()
        }
        SessionCommand::Show => Vec::new(),
    }
}

/// One-line summary of what the viewer is showing.
pub fn describe<S: RenderSink>(viewer: &DiagramViewer<S>) -> String {
    match viewer.surface() {
        ViewerSurface::Loading => LOADING_TEXT.to_owned(),
        ViewerSurface::Error(panel) => {
            let mut out = format!("{}: {} ({})\n", panel.title, panel.message, panel.code);
            for line in panel.source.lines() {
                // Writing to a String cannot fail.
                writeln!(out, "  | {line}").unwrap_or_default();
            }
            out.trim_end().to_owned()
        }
        ViewerSurface::Interactive { mode, style, toolbar } => {
            let mode = match mode {
                PresentationMode::Inline => "inline",
                PresentationMode::Fullscreen => "fullscreen",
            };
            format!("{mode} {} transition={} cursor={} | {toolbar}", style.transform, style.transition, style.cursor)
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
