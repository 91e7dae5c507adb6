use dexchart_utils::{Pair, RawCandle};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub mod input;

#[derive(Debug)]
pub enum AppEvent {
    Input(KeyEvent),
    Resize(u16, u16),

    /// The chart container has settled and the widget can be built.
    ChartAttached,
    /// Refresh schedule fired.
    ChartTick,
    /// Outcome of one datafeed request. `pair` is the pair actually requested,
    /// after any testnet substitution.
    ChartCandles {
        request_id: u64,
        pair: Pair,
        result: dexchart_utils::Result<Vec<RawCandle>>,
    },
    ChartError(String),
}

impl AppEvent {
    pub fn fmt(&self) -> String {
        format!("{self:?}")
    }

    pub fn is_input(&self) -> bool {
        matches!(self, AppEvent::Input(_))
    }

    pub fn is_char_pressed(&self, ch: char) -> bool {
        matches!(
            self,
            AppEvent::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                ..
            }) if *c == ch
        )
    }

    pub fn is_ctrl_char_pressed(&self, ch: char) -> bool {
        matches!(
            self,
            AppEvent::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) if *c == ch
        )
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        matches!(
            self,
            AppEvent::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code,
                ..
            }) if *code == key
        )
    }

    pub fn key_event(&self) -> Option<&KeyEvent> {
        if let AppEvent::Input(key_event) = self {
            Some(key_event)
        } else {
            None
        }
    }
}
