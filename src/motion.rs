use log::{debug, trace};
use nalgebra as na;

use crate::error::Error;
use crate::math::median;

pub const MIN_FEATURES: usize = 10;

/// Sparse feature detection and frame-to-frame tracking backend.
pub trait FeatureTracker {
    type Frame;
    type Gray;

    fn grayscale(&mut self, frame: &Self::Frame) -> Result<Self::Gray, Error>;

    /// Corner-like points worth tracking in `gray`.
    fn features(&mut self, gray: &Self::Gray) -> Result<Vec<na::Point2<f32>>, Error>;

    /// Position of every point in `next`, `None` where tracking failed.
    fn track(
        &mut self,
        prev: &Self::Gray,
        next: &Self::Gray,
        points: &[na::Point2<f32>],
    ) -> Result<Vec<Option<na::Point2<f32>>>, Error>;
}

/// Median displacement of tracked point pairs, per axis.
pub fn median_shift(pairs: &[(na::Point2<f32>, na::Point2<f32>)]) -> Option<na::Vector2<f32>> {
    let (dx, dy): (Vec<f32>, Vec<f32>) = pairs
        .iter()
        .map(|(old, new)| (new.x - old.x, new.y - old.y))
        .unzip();

    Some(na::Vector2::new(median(&dx)?, median(&dy)?))
}

/// Global camera motion between consecutive frames: how far the background
/// moved in pixels (a camera panning right gives a negative x shift).
pub struct MotionEstimator<T: FeatureTracker> {
    tracker: T,
    prev: Option<T::Gray>,
    min_features: usize,
}

impl<T: FeatureTracker> MotionEstimator<T> {
    pub fn new(tracker: T) -> Self {
        Self {
            tracker,
            prev: None,
            min_features: MIN_FEATURES,
        }
    }

    pub fn with_min_features(mut self, min_features: usize) -> Self {
        self.min_features = min_features;
        self
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }

    /// Never fails: every degenerate case yields a zero shift and the
    /// current frame becomes the new reference.
    pub fn estimate(&mut self, frame: &T::Frame) -> na::Vector2<f32> {
        let gray = match self.tracker.grayscale(frame) {
            Ok(gray) => gray,
            Err(err) => {
                debug!("motion: grayscale conversion failed: {}", err);
                self.prev = None;
                return na::Vector2::zeros();
            }
        };

        let prev = match self.prev.take() {
            Some(prev) => prev,
            None => {
                self.prev = Some(gray);
                return na::Vector2::zeros();
            }
        };

        let shift = match self.shift(&prev, &gray) {
            Ok(Some(shift)) => shift,
            Ok(None) => na::Vector2::zeros(),
            Err(err) => {
                debug!("motion: feature tracking failed: {}", err);
                na::Vector2::zeros()
            }
        };

        self.prev = Some(gray);

        shift
    }

    fn shift(&mut self, prev: &T::Gray, next: &T::Gray) -> Result<Option<na::Vector2<f32>>, Error> {
        let points = self.tracker.features(prev)?;
        if points.len() < self.min_features {
            debug!("motion: only {} features, resetting", points.len());
            return Ok(None);
        }

        let tracked = self.tracker.track(prev, next, &points)?;
        let pairs: Vec<_> = points
            .iter()
            .zip(tracked)
            .filter_map(|(old, new)| new.map(|new| (*old, new)))
            .collect();

        if pairs.len() < self.min_features {
            debug!("motion: only {} points tracked, resetting", pairs.len());
            return Ok(None);
        }

        let shift = median_shift(&pairs);
        trace!("motion: {:?} from {} points", shift, pairs.len());

        Ok(shift)
    }
}
