use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::InputEvent;

// wait up to `timeout` for a key press and translate it
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code).into_iter().collect());
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Quit),
        KeyCode::Char('k') => Some(InputEvent::TogglePercussion),
        KeyCode::Char('m') => Some(InputEvent::ToggleVisualEffect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_keys() {
        assert_eq!(handle_key(KeyCode::Char('k')), Some(InputEvent::TogglePercussion));
        assert_eq!(handle_key(KeyCode::Char('m')), Some(InputEvent::ToggleVisualEffect));
        assert_eq!(handle_key(KeyCode::Esc), Some(InputEvent::Quit));
        assert_eq!(handle_key(KeyCode::Char('x')), None);
    }
}
