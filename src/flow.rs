//! Shi-Tomasi corners tracked with pyramidal Lucas-Kanade, backed by OpenCV.

use nalgebra as na;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    video,
};

use crate::error::Error;
use crate::motion::FeatureTracker;

#[derive(Debug, Clone)]
pub struct FlowParams {
    pub max_corners: i32,
    pub quality_level: f64,
    pub min_distance: f64,
    pub block_size: i32,
    pub win_size: i32,
    pub max_level: i32,
    pub max_iterations: i32,
    pub epsilon: f64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            max_corners: 200,
            quality_level: 0.01,
            min_distance: 30.0,
            block_size: 3,
            win_size: 15,
            max_level: 2,
            max_iterations: 10,
            epsilon: 0.03,
        }
    }
}

pub struct OpenCvFlow {
    params: FlowParams,
    criteria: core::TermCriteria,
}

impl OpenCvFlow {
    pub fn new(params: FlowParams) -> Result<Self, Error> {
        let criteria = core::TermCriteria::new(
            core::TermCriteria_Type::COUNT as i32 | core::TermCriteria_Type::EPS as i32,
            params.max_iterations,
            params.epsilon,
        )?;

        Ok(Self { params, criteria })
    }
}

impl FeatureTracker for OpenCvFlow {
    /// BGR frame as delivered by `videoio`.
    type Frame = Mat;
    type Gray = Mat;

    fn grayscale(&mut self, frame: &Mat) -> Result<Mat, Error> {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        Ok(gray)
    }

    fn features(&mut self, gray: &Mat) -> Result<Vec<na::Point2<f32>>, Error> {
        let mut corners = core::Vector::<core::Point2f>::new();
        imgproc::good_features_to_track(
            gray,
            &mut corners,
            self.params.max_corners,
            self.params.quality_level,
            self.params.min_distance,
            &Mat::default(),
            self.params.block_size,
            false,
            0.04,
        )?;

        Ok(corners.iter().map(|p| na::Point2::new(p.x, p.y)).collect())
    }

    fn track(
        &mut self,
        prev: &Mat,
        next: &Mat,
        points: &[na::Point2<f32>],
    ) -> Result<Vec<Option<na::Point2<f32>>>, Error> {
        let prev_pts: core::Vector<core::Point2f> = points
            .iter()
            .map(|p| core::Point2f::new(p.x, p.y))
            .collect();
        let mut next_pts = core::Vector::<core::Point2f>::new();
        let mut status = core::Vector::<u8>::new();
        let mut err = core::Vector::<f32>::new();

        video::calc_optical_flow_pyr_lk(
            prev,
            next,
            &prev_pts,
            &mut next_pts,
            &mut status,
            &mut err,
            core::Size::new(self.params.win_size, self.params.win_size),
            self.params.max_level,
            self.criteria,
            0,
            1e-4,
        )?;

        Ok(next_pts
            .iter()
            .zip(status.iter())
            .map(|(p, st)| {
                if st == 1 {
                    Some(na::Point2::new(p.x, p.y))
                } else {
                    None
                }
            })
            .collect())
    }
}
