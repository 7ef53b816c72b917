use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::circular_queue::CircularQueue;
use crate::kalman::KalmanFilter;
use crate::rolling_avg::RollingAvg;
use crate::speed::SpeedSample;

#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    pub centroid: na::Point2<f32>,
    /// Last centroid before this frame's prediction, camera shift applied.
    pub prev_centroid: na::Point2<f32>,
    pub bbox: BBox<Ltrb>,
    // trail for rendering, oldest first; does not feed the filter
    pub history: CircularQueue<na::Point2<f32>>,
    pub filter: KalmanFilter,
    pub disappeared: u32,
    pub age: u32,
    pub speed: RollingAvg,
    pub last_sample: Option<SpeedSample>,
}

impl Track {
    pub fn new(
        id: u32,
        centroid: na::Point2<f32>,
        bbox: BBox<Ltrb>,
        history_len: usize,
        speed_window: usize,
    ) -> Self {
        let mut history = CircularQueue::with_capacity(history_len);
        history.push(centroid);

        Self {
            id,
            centroid,
            prev_centroid: centroid,
            bbox,
            history,
            filter: KalmanFilter::new(centroid),
            disappeared: 0,
            age: 1,
            speed: RollingAvg::new(speed_window),
            last_sample: None,
        }
    }

    /// Moves everything expressed in image coordinates by the background
    /// shift so the filter keeps predicting in a world-stationary frame.
    pub fn compensate(&mut self, shift: na::Vector2<f32>) {
        if shift == na::Vector2::zeros() {
            return;
        }

        for p in self.history.iter_mut() {
            *p += shift;
        }

        self.filter.shift(shift);
        self.centroid += shift;
        self.prev_centroid += shift;
        self.bbox = self.bbox.translate(shift);
    }

    /// Extrapolates one frame ahead and counts the frame as missed until a
    /// detection is associated.
    pub fn predict(&mut self, speed_decay: f32) -> na::Point2<f32> {
        self.prev_centroid = self.centroid;
        self.centroid = self.filter.predict();
        self.history.push(self.centroid);
        self.disappeared += 1;
        self.speed.decay(speed_decay);

        self.centroid
    }

    pub fn correct(&mut self, measurement: na::Point2<f32>, bbox: BBox<Ltrb>) {
        self.disappeared = 0;
        self.age += 1;
        self.bbox = bbox;
        self.centroid = self.filter.correct(measurement);

        if let Some(last) = self.history.last_mut() {
            *last = self.centroid;
        }
    }

    pub fn record_speed(&mut self, sample: SpeedSample) -> f32 {
        self.last_sample = Some(sample);
        self.speed.push(sample.kmh())
    }

    #[inline]
    pub fn current_speed(&self) -> f32 {
        self.speed.current()
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            id: self.id,
            centroid: (self.centroid.x, self.centroid.y),
            bbox: self.bbox,
            history: self.history.iter().map(|p| (p.x, p.y)).collect(),
            current_speed: self.current_speed(),
            age: self.age,
            disappeared: self.disappeared,
        }
    }
}

/// Read-only copy of a track handed to rendering and stats consumers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub id: u32,
    pub centroid: (f32, f32),
    pub bbox: BBox<Ltrb>,
    pub history: Vec<(f32, f32)>,
    pub current_speed: f32,
    pub age: u32,
    pub disappeared: u32,
}
