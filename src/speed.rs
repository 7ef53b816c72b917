use nalgebra as na;

use crate::projector::GroundProjector;

const MPS_TO_KMH: f32 = 3.6;

/// One per-frame speed measurement in km/h, tagged with how it was derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedSample {
    /// Displacement measured on the calibrated ground plane.
    Ground(f32),
    /// Pixel displacement times a fixed metres-per-pixel factor. Low
    /// fidelity: the factor has no calibration behind it.
    Pixels(f32),
}

impl SpeedSample {
    #[inline]
    pub fn kmh(&self) -> f32 {
        match *self {
            SpeedSample::Ground(v) | SpeedSample::Pixels(v) => v,
        }
    }
}

/// Speed between two consecutive centroids at a nominal frame rate.
///
/// Frame time is taken as `1 / fps`; processing latency is not measured.
/// Returns `None` for a non-positive or non-finite `fps`.
pub fn estimate(
    prev: na::Point2<f32>,
    next: na::Point2<f32>,
    projector: Option<&GroundProjector>,
    dims: (u32, u32),
    fps: f32,
    fallback_meters_per_pixel: f32,
) -> Option<SpeedSample> {
    if !(fps.is_finite() && fps > 0.0) {
        return None;
    }

    let ground = projector.and_then(|p| p.ground_distance(prev, next, dims));

    Some(match ground {
        Some(meters) => SpeedSample::Ground(meters * fps * MPS_TO_KMH),
        None => {
            let meters = na::distance(&prev, &next) * fallback_meters_per_pixel;
            SpeedSample::Pixels(meters * fps * MPS_TO_KMH)
        }
    })
}
