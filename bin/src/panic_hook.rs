use std::io::stdout;

use ratatui::crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

/// Restores the terminal before printing, otherwise the message is lost in
/// the alternate screen.
pub fn set() {
    std::panic::set_hook(Box::new(|info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture);

        let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            info.to_string()
        };

        if let Some(loc) = info.location() {
            eprintln!("Panic: {msg:?} at {}:{}", loc.file(), loc.line());
        } else {
            eprintln!("Panic: {msg:?}");
        }

        eprintln!("This is a bug! The log file dexchart.log may help when reporting it.");
    }));
}
