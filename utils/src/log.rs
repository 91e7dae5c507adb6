pub const LOG_FILE: &str = "dexchart.log";

/// Appends a timestamped line to `dexchart.log`. Stdout belongs to the
/// terminal UI, so diagnostics go to the file instead. Write failures are
/// dropped.
#[macro_export]
macro_rules! dexchart_log {
    ($($arg:tt)*) => {{
        use std::fs::OpenOptions;
        use std::io::Write;

        if let Ok(mut file) = OpenOptions::new()
            .append(true)
            .create(true)
            .open($crate::log::LOG_FILE)
        {
            let _ = writeln!(
                file,
                "{} {}",
                $crate::log::timestamp(),
                format_args!($($arg)*)
            );
        }
    }};
}

pub fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}
