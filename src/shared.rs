// Types shared between the TUI and the middle layer.
//
// Keys (resolved in tui/input.rs):
//   Tab           //  NextPage (DAF -> FAF -> Settings)
//   Up / Down     //  MoveSelection(-1 / +1)
//   Left / Right  //  adjust the selected row down / up
//   Enter         //  toggle or cycle the selected row
//   Space         //  ToggleRunning (build / tear down the chain)
//   Esc           //  Quit
//
// The TUI never reads the controller. Each frame it renders whatever
// `middle.display_state()` returns.

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    ToggleRunning,
    NextPage,
    MoveSelection(i32),

    // semantic row edits, resolved by the tui from page + selected row
    AdjustDelay(f32),
    ToggleFeedback,
    CyclePreset,
    AdjustMicGain(f32),
    AdjustSemitones(f32),
    AdjustPitchMix(f32),
    AdjustGlobalGain(f32),
    ToggleNoiseSuppression,
    CycleInputDevice(i32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Daf,
    Faf,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Daf, Page::Faf, Page::Settings];

    pub fn next(self) -> Self {
        match self {
            Page::Daf => Page::Faf,
            Page::Faf => Page::Settings,
            Page::Settings => Page::Daf,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Daf => "DAF",
            Page::Faf => "FAF",
            Page::Settings => "Settings",
        }
    }

    pub fn rows(self) -> &'static [Row] {
        match self {
            Page::Daf => &[Row::Delay, Row::Feedback, Row::Preset, Row::MicGain],
            Page::Faf => &[Row::PitchSemitones, Row::PitchMix],
            Page::Settings => &[Row::GlobalGain, Row::NoiseSuppression, Row::InputDevice],
        }
    }

    pub fn row(self, index: usize) -> Row {
        let rows = self.rows();
        rows[index.min(rows.len() - 1)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Delay,
    Feedback,
    Preset,
    MicGain,
    PitchSemitones,
    PitchMix,
    GlobalGain,
    NoiseSuppression,
    InputDevice,
}

impl Row {
    pub fn label(self) -> &'static str {
        match self {
            Row::Delay => "Delay",
            Row::Feedback => "Feedback",
            Row::Preset => "Mic preset",
            Row::MicGain => "Mic gain",
            Row::PitchSemitones => "Pitch shift",
            Row::PitchMix => "Shifted mix",
            Row::GlobalGain => "Global gain",
            Row::NoiseSuppression => "Noise suppression",
            Row::InputDevice => "Input device",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub page: Page,
    pub selected_row: usize,
    pub running: bool,
    pub daf_active: bool,
    pub rows: Vec<(Row, String)>, // label source + formatted value, in page order
    pub input_level: f32,         // 0..1
    pub status: String,
}
