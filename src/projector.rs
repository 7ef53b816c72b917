//! Pinhole camera over a flat ground plane.
//!
//! World frame is Y-up with the ground at `Y = 0`; the camera sits at
//! `(0, h, 0)` and looks down `-Z` before pitch (about X) and yaw (about Y)
//! are applied. Roll is always zero.

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Camera pose as supplied by the calibration collaborator. Angles are in
/// degrees; an absent aspect ratio is taken from the frame dimensions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Calibration {
    pub cam_height: f32,
    pub cam_pitch: f32,
    pub cam_fov: f32,
    pub cam_yaw: f32,
    pub aspect_ratio: Option<f32>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            cam_height: 15.0,
            cam_pitch: -30.0,
            cam_fov: 50.0,
            cam_yaw: 0.0,
            aspect_ratio: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroundProjector {
    height: f32,
    tan_half_fov_h: f32,
    tan_half_fov_v: f32,
    // camera -> world
    rotation: na::Rotation3<f32>,
}

impl GroundProjector {
    pub fn new(
        fov_vertical_deg: f32,
        aspect_ratio: f32,
        cam_height: f32,
        pitch_deg: f32,
        yaw_deg: f32,
    ) -> Result<Self, Error> {
        if !(fov_vertical_deg.is_finite() && fov_vertical_deg > 0.0 && fov_vertical_deg < 180.0) {
            return Err(Error::InvalidCalibration(format!(
                "vertical fov must be in (0, 180) degrees, got {}",
                fov_vertical_deg
            )));
        }

        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "aspect ratio must be positive, got {}",
                aspect_ratio
            )));
        }

        if !(cam_height.is_finite() && cam_height > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "camera height must be positive, got {}",
                cam_height
            )));
        }

        if !(pitch_deg.is_finite() && yaw_deg.is_finite()) {
            return Err(Error::InvalidCalibration(
                "pitch and yaw must be finite".to_string(),
            ));
        }

        let fov_v = fov_vertical_deg.to_radians();
        let tan_half_fov_v = (fov_v / 2.0).tan();
        let fov_h = 2.0 * (tan_half_fov_v * aspect_ratio).atan();

        let pitch = na::Rotation3::from_axis_angle(&na::Vector3::x_axis(), pitch_deg.to_radians());
        let yaw = na::Rotation3::from_axis_angle(&na::Vector3::y_axis(), yaw_deg.to_radians());

        Ok(Self {
            height: cam_height,
            tan_half_fov_h: (fov_h / 2.0).tan(),
            tan_half_fov_v,
            rotation: yaw * pitch,
        })
    }

    pub fn from_calibration(cal: &Calibration, dims: (u32, u32)) -> Result<Self, Error> {
        let aspect = match cal.aspect_ratio {
            Some(a) => a,
            None if dims.1 > 0 => dims.0 as f32 / dims.1 as f32,
            None => {
                return Err(Error::InvalidCalibration(
                    "frame height is zero".to_string(),
                ))
            }
        };

        Self::new(cal.cam_fov, aspect, cal.cam_height, cal.cam_pitch, cal.cam_yaw)
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Ground `(X, Z)` hit by the ray through pixel `(u, v)`, or `None` when
    /// the ray is parallel to the ground or meets it behind the camera.
    pub fn pixel_to_ground(&self, u: f32, v: f32, width: u32, height: u32) -> Option<na::Point2<f32>> {
        let x_ndc = 2.0 * u / width as f32 - 1.0;
        let y_ndc = 1.0 - 2.0 * v / height as f32;

        let ray_cam = na::Vector3::new(
            x_ndc * self.tan_half_fov_h,
            y_ndc * self.tan_half_fov_v,
            -1.0,
        );
        let ray = self.rotation * ray_cam;

        if ray.y.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -self.height / ray.y;
        if t < 0.0 {
            return None;
        }

        let hit = na::Point3::new(0.0, self.height, 0.0) + ray * t;

        Some(na::Point2::new(hit.x, hit.z))
    }

    /// Pixel (truncated) where the ground point `(x, z)` is seen, or `None`
    /// when it lies behind the camera.
    pub fn ground_to_pixel(&self, x: f32, z: f32, width: u32, height: u32) -> Option<(i32, i32)> {
        let rel = na::Vector3::new(x, -self.height, z);
        let cam = self.rotation.inverse() * rel;

        if cam.z >= 0.0 {
            return None;
        }

        let x_ndc = cam.x / (-cam.z * self.tan_half_fov_h);
        let y_ndc = cam.y / (-cam.z * self.tan_half_fov_v);

        let u = (x_ndc + 1.0) * width as f32 / 2.0;
        let v = (1.0 - y_ndc) * height as f32 / 2.0;

        Some((u as i32, v as i32))
    }

    /// Metric distance on the ground between two pixels, if both project.
    pub fn ground_distance(
        &self,
        a: na::Point2<f32>,
        b: na::Point2<f32>,
        dims: (u32, u32),
    ) -> Option<f32> {
        let ga = self.pixel_to_ground(a.x, a.y, dims.0, dims.1)?;
        let gb = self.pixel_to_ground(b.x, b.y, dims.0, dims.1)?;

        Some(na::distance(&ga, &gb))
    }
}
