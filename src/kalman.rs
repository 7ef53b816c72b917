use nalgebra as na;

const PROCESS_NOISE: f32 = 0.03;
const MEASUREMENT_NOISE: f32 = 1.0;

/// Constant-velocity filter over `[x, y, vx, vy]` with position-only
/// measurements. Time step is one frame.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    pub state: na::Vector4<f32>,
    pub covariance: na::Matrix4<f32>,
    transition: na::Matrix4<f32>,
    measurement: na::Matrix2x4<f32>,
    process_noise: na::Matrix4<f32>,
    measurement_noise: na::Matrix2<f32>,
}

impl KalmanFilter {
    pub fn new(pos: na::Point2<f32>) -> Self {
        #[rustfmt::skip]
        let transition = na::Matrix4::new(
            1.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        #[rustfmt::skip]
        let measurement = na::Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );

        Self {
            state: na::Vector4::new(pos.x, pos.y, 0.0, 0.0),
            covariance: na::Matrix4::zeros(),
            transition,
            measurement,
            process_noise: na::Matrix4::identity() * PROCESS_NOISE,
            measurement_noise: na::Matrix2::identity() * MEASUREMENT_NOISE,
        }
    }

    #[inline]
    pub fn position(&self) -> na::Point2<f32> {
        na::Point2::new(self.state[0], self.state[1])
    }

    #[inline]
    pub fn velocity(&self) -> na::Vector2<f32> {
        na::Vector2::new(self.state[2], self.state[3])
    }

    /// Moves the position component only; velocity and covariance stay.
    #[inline]
    pub fn shift(&mut self, offset: na::Vector2<f32>) {
        self.state[0] += offset.x;
        self.state[1] += offset.y;
    }

    pub fn predict(&mut self) -> na::Point2<f32> {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;

        self.position()
    }

    pub fn correct(&mut self, z: na::Point2<f32>) -> na::Point2<f32> {
        let innovation = z.coords - self.measurement * self.state;
        let s = self.measurement * self.covariance * self.measurement.transpose()
            + self.measurement_noise;

        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => return self.position(),
        };

        let gain = self.covariance * self.measurement.transpose() * s_inv;

        self.state += gain * innovation;
        self.covariance = (na::Matrix4::identity() - gain * self.measurement) * self.covariance;

        self.position()
    }
}
