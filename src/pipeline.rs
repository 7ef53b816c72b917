use log::trace;
use std::sync::Arc;

use crate::detector::Detector;
use crate::error::Error;
use crate::frame::Frame;
use crate::motion::{FeatureTracker, MotionEstimator};
use crate::projector::GroundProjector;
use crate::roi::RegionOfInterest;
use crate::snapshot::{Snapshot, SnapshotCell};
use crate::tracker::Tracker;

/// One video source: camera motion, detection, region filter and tracking
/// run in that order for every frame, and the result is published to a
/// shared `SnapshotCell`.
pub struct Pipeline<T: FeatureTracker, D> {
    motion: MotionEstimator<T>,
    detector: D,
    tracker: Tracker,
    projector: Option<GroundProjector>,
    roi: RegionOfInterest,
    output: Arc<SnapshotCell>,
    frame_index: u64,
}

impl<T, D> Pipeline<T, D>
where
    T: FeatureTracker,
    D: Detector<T::Frame>,
{
    pub fn new(motion: MotionEstimator<T>, detector: D, tracker: Tracker) -> Self {
        Self {
            motion,
            detector,
            tracker,
            projector: None,
            roi: RegionOfInterest::default(),
            output: Arc::new(SnapshotCell::new()),
            frame_index: 0,
        }
    }

    pub fn with_projector(mut self, projector: GroundProjector) -> Self {
        self.projector = Some(projector);
        self
    }

    pub fn with_roi(mut self, roi: RegionOfInterest) -> Self {
        self.roi = roi;
        self
    }

    /// Handle for readers on other threads.
    pub fn output(&self) -> Arc<SnapshotCell> {
        self.output.clone()
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    #[inline]
    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    #[inline]
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn set_projector(&mut self, projector: Option<GroundProjector>) {
        self.projector = projector;
    }

    pub fn set_roi(&mut self, roi: RegionOfInterest) {
        self.roi = roi;
    }

    /// A detector failure is returned before the tracker is touched, so
    /// the published snapshot stays the previous one.
    pub fn process(
        &mut self,
        image: &T::Frame,
        dims: (u32, u32),
        fps: f32,
    ) -> Result<Arc<Snapshot>, Error> {
        let shift = self.motion.estimate(image);

        let mut detections = self.detector.detect(image)?;
        self.roi.retain(&mut detections, dims);

        let frame = Frame::new(dims, detections, fps).with_camera_shift(shift);
        self.tracker.update(&frame, self.projector.as_ref());
        self.frame_index += 1;

        trace!(
            "pipeline: frame {} shift=({:.1}, {:.1}) detections={} tracks={}",
            self.frame_index,
            shift.x,
            shift.y,
            frame.len(),
            self.tracker.len()
        );

        Ok(self
            .output
            .store(Snapshot::capture(self.frame_index, &self.tracker)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detection::Detection;
    use crate::detector::ReplayDetector;
    use nalgebra as na;

    /// The "image" is the background's horizontal offset in pixels.
    struct Panning;

    impl FeatureTracker for Panning {
        type Frame = f32;
        type Gray = f32;

        fn grayscale(&mut self, frame: &f32) -> Result<f32, Error> {
            Ok(*frame)
        }

        fn features(&mut self, _gray: &f32) -> Result<Vec<na::Point2<f32>>, Error> {
            Ok((0..20)
                .map(|i| na::Point2::new(i as f32 * 30.0, 200.0))
                .collect())
        }

        fn track(
            &mut self,
            prev: &f32,
            next: &f32,
            points: &[na::Point2<f32>],
        ) -> Result<Vec<Option<na::Point2<f32>>>, Error> {
            let shift = na::Vector2::new(next - prev, 0.0);
            Ok(points.iter().map(|p| Some(*p + shift)).collect())
        }
    }

    fn person(cx: f32) -> Detection {
        Detection::new(BBox::ltwh(cx - 20.0, 200.0, 40.0, 100.0), "person", 0.9)
    }

    #[test]
    fn panning_camera_keeps_identity() {
        // a pedestrian standing still while the camera pans right fast
        let detector = ReplayDetector::new(vec![
            vec![person(400.0)],
            vec![person(310.0)],
            vec![person(220.0)],
        ]);
        let tracker = Tracker::default();
        let mut pipeline = Pipeline::new(MotionEstimator::new(Panning), detector, tracker);
        let output = pipeline.output();

        for offset in [0.0, -90.0, -180.0] {
            pipeline.process(&offset, (640, 480), 25.0).unwrap();
        }

        let snap = output.load();
        assert_eq!(snap.frame, 3);
        assert_eq!(snap.currently_tracked, 1);
        assert_eq!(snap.tracks[0].id, 0);
        assert_eq!(snap.tracks[0].age, 3);
        assert!(snap.tracks[0].current_speed.abs() < 1e-3);
    }

    #[test]
    fn region_filters_before_tracking() {
        let detector = ReplayDetector::new(vec![vec![person(100.0), person(500.0)]]);
        let roi = RegionOfInterest::new(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)]);
        let mut pipeline =
            Pipeline::new(MotionEstimator::new(Panning), detector, Tracker::default()).with_roi(roi);

        let snap = pipeline.process(&0.0, (640, 480), 25.0).unwrap();

        assert_eq!(snap.currently_tracked, 1);
        assert_eq!(snap.tracks[0].centroid, (100.0, 250.0));
    }
}
