use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::{InputEvent, Row};
use super::mode::TuiState;

// slider steps per key press
const DELAY_STEP_MS: f32 = 5.0;
const GAIN_STEP: f32 = 0.1;
const SEMITONE_STEP: f32 = 1.0;
const MIX_STEP: f32 = 0.1;

// poll for input from the terminal and resolve keys into semantic events
// for the middle layer, based on the page/row the user is looking at
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::ToggleRunning],
        KeyCode::Tab => vec![InputEvent::NextPage],
        KeyCode::Up => vec![InputEvent::MoveSelection(-1)],
        KeyCode::Down => vec![InputEvent::MoveSelection(1)],
        KeyCode::Left => resolve_adjust(-1.0, ts),
        KeyCode::Right => resolve_adjust(1.0, ts),
        KeyCode::Enter => resolve_adjust(1.0, ts),
        _ => vec![],
    }
}

// resolve a left/right press on the selected row; toggles and cycles ignore
// the magnitude, devices cycle in the pressed direction
fn resolve_adjust(dir: f32, ts: &TuiState) -> Vec<InputEvent> {
    let event = match ts.row() {
        Row::Delay => InputEvent::AdjustDelay(dir * DELAY_STEP_MS),
        Row::Feedback => InputEvent::ToggleFeedback,
        Row::Preset => InputEvent::CyclePreset,
        Row::MicGain => InputEvent::AdjustMicGain(dir * GAIN_STEP),
        Row::PitchSemitones => InputEvent::AdjustSemitones(dir * SEMITONE_STEP),
        Row::PitchMix => InputEvent::AdjustPitchMix(dir * MIX_STEP),
        Row::GlobalGain => InputEvent::AdjustGlobalGain(dir * GAIN_STEP),
        Row::NoiseSuppression => InputEvent::ToggleNoiseSuppression,
        Row::InputDevice => InputEvent::CycleInputDevice(dir as i32),
    };
    vec![event]
}
