pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    UtilsError(#[from] dexchart_utils::Error),

    #[error("No trading pair given. Pass AMOUNT/PRICE pairs on the command line or list them under `pairs` in the config file.")]
    NoPairs,

    #[error("Draw failed: {0}")]
    Draw(std::io::Error),

    #[error("Reading terminal input failed: {0}")]
    Input(std::io::Error),

    #[error("Input thread panicked, please restart dexchart.")]
    InputThreadPanicked,

    #[error("Mpsc Recv Error: {0}")]
    MpscRecvError(Box<std::sync::mpsc::RecvError>),
}

impl FmtError for dexchart_utils::Error {
    fn fmt_err(&self, id: &str) -> String {
        if self.is_connect() {
            format!("Please check your internet connection - {id}: {self}")
        } else {
            format!("{id}: {self}")
        }
    }
}

impl From<std::sync::mpsc::RecvError> for Error {
    fn from(e: std::sync::mpsc::RecvError) -> Self {
        Error::MpscRecvError(Box::new(e))
    }
}

/// User-facing message for an error, hinting at connectivity when that is
/// the cause.
pub trait FmtError {
    fn fmt_err(&self, id: &str) -> String;
}
