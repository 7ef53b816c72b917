use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid Calibration: {0}")]
    InvalidCalibration(String),

    #[error("Detector Error: {0}")]
    Detector(String),

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "opencv")]
    #[error("OpenCV Error: {0}")]
    OpenCvError(#[from] opencv::Error),
}
