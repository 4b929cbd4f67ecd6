use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::graph::model::DeviceType;
use crate::topology::controller::PointerEvent;
use crate::topology::viewport::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pan(Direction),
    ZoomIn,
    ZoomOut,
    Reset,
    NextProfile,
    PrevProfile,
    NextDevice,
    PrevDevice,
    ToggleType(DeviceType),
    ClearSelection,
    OpenSettings,
    ToggleHelp,
    Quit,
    Noop,
}

pub fn action_for_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Pan(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Pan(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Pan(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Pan(Direction::Right),
        KeyCode::Tab => Action::NextProfile,
        KeyCode::BackTab => Action::PrevProfile,
        KeyCode::Char(']') => Action::NextDevice,
        KeyCode::Char('[') => Action::PrevDevice,
        KeyCode::Esc => Action::ClearSelection,
        KeyCode::Char('+') => Action::ZoomIn,
        KeyCode::Char('=') if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('0') => Action::Reset,
        KeyCode::Char('1') => Action::ToggleType(DeviceType::Wap),
        KeyCode::Char('2') => Action::ToggleType(DeviceType::Server),
        KeyCode::Char('3') => Action::ToggleType(DeviceType::Laptop),
        KeyCode::Char('4') => Action::ToggleType(DeviceType::Dpo),
        KeyCode::Char('s') => Action::OpenSettings,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::Noop,
    }
}

/// Translate a terminal mouse event into a canvas-local pointer event.
///
/// `inside` tracks whether the previous event was over the canvas, so that
/// crossing its border produces exactly one `Leave`.
pub fn pointer_for_mouse(mouse: MouseEvent, canvas: Rect, inside: &mut bool) -> Option<PointerEvent> {
    let within = mouse.column >= canvas.x
        && mouse.column < canvas.x.saturating_add(canvas.width)
        && mouse.row >= canvas.y
        && mouse.row < canvas.y.saturating_add(canvas.height);
    let was_inside = std::mem::replace(inside, within);
    if !within {
        return was_inside.then_some(PointerEvent::Leave);
    }

    let at = Point::new(
        f64::from(mouse.column - canvas.x) + 0.5,
        f64::from(mouse.row - canvas.y) + 0.5,
    );
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(at)),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(PointerEvent::Move(at))
        }
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(at)),
        _ => None,
    }
}
