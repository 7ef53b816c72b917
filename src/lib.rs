pub mod assignment;
pub mod bbox;
pub mod detection;
pub mod detector;
pub mod error;
#[cfg(feature = "opencv")]
pub mod flow;
pub mod frame;
pub mod kalman;
pub mod math;
pub mod motion;
pub mod pipeline;
pub mod projector;
pub mod roi;
pub mod rolling_avg;
pub mod snapshot;
pub mod speed;
pub mod tracker;

mod circular_queue;
mod track;

pub use assignment::Assignment;
pub use circular_queue::CircularQueue;
pub use detection::Detection;
pub use detector::{Detector, DetectorSettings, ReplayDetector};
pub use error::Error;
pub use frame::Frame;
pub use motion::{FeatureTracker, MotionEstimator};
pub use pipeline::Pipeline;
pub use projector::{Calibration, GroundProjector};
pub use roi::RegionOfInterest;
pub use snapshot::{Snapshot, SnapshotCell};
pub use speed::SpeedSample;
pub use track::{Track, TrackSnapshot};
pub use tracker::{Tracker, TrackerConfig, TrackerSettings};

#[cfg(feature = "opencv")]
pub use flow::{FlowParams, OpenCvFlow};
