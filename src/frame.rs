use crate::detection::Detection;
use nalgebra as na;

/// Tracker input for one processed video frame.
pub struct Frame {
    pub dims: (u32, u32),
    pub detections: Vec<Detection>,
    // background shift reported by the motion estimator, in px
    pub camera_shift: na::Vector2<f32>,
    pub fps: f32,
}

impl Frame {
    pub fn new(dims: (u32, u32), detections: Vec<Detection>, fps: f32) -> Self {
        Self {
            dims,
            detections,
            camera_shift: na::Vector2::zeros(),
            fps,
        }
    }

    #[inline]
    pub fn with_camera_shift(mut self, shift: na::Vector2<f32>) -> Self {
        self.camera_shift = shift;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
