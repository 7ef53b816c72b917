use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::detection::Detection;

/// Polygon in percent of the frame size (`0..=100` on both axes). With
/// fewer than three vertices the region is inactive and accepts everything.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RegionOfInterest {
    pub points: Vec<(f32, f32)>,
}

impl RegionOfInterest {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.points.len() > 2
    }

    fn polygon(&self, dims: (u32, u32)) -> Vec<na::Point2<f32>> {
        let (w, h) = (dims.0 as f32, dims.1 as f32);

        self.points
            .iter()
            .map(|&(x, y)| na::Point2::new(x * w / 100.0, y * h / 100.0))
            .collect()
    }

    /// Even-odd rule: count the edges crossed by a ray cast towards +x.
    fn polygon_contains(poly: &[na::Point2<f32>], p: na::Point2<f32>) -> bool {
        if poly.len() < 3 {
            return false;
        }

        let crossings = poly
            .iter()
            .zip(poly.iter().cycle().skip(1))
            .filter(|(a, b)| (a.y > p.y) != (b.y > p.y))
            .filter(|(a, b)| p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y))
            .count();

        crossings % 2 == 1
    }

    pub fn contains(&self, p: na::Point2<f32>, dims: (u32, u32)) -> bool {
        !self.is_active() || Self::polygon_contains(&self.polygon(dims), p)
    }

    /// Drops detections whose centre lies outside the region.
    pub fn retain(&self, detections: &mut Vec<Detection>, dims: (u32, u32)) {
        if !self.is_active() {
            return;
        }

        let poly = self.polygon(dims);
        detections.retain(|d| Self::polygon_contains(&poly, d.centroid()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    fn square() -> Vec<na::Point2<f32>> {
        vec![
            na::Point2::new(0.0, 0.0),
            na::Point2::new(10.0, 0.0),
            na::Point2::new(10.0, 10.0),
            na::Point2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn point_in_polygon() {
        let poly = square();
        let inside = |x, y, poly: &[na::Point2<f32>]| {
            RegionOfInterest::polygon_contains(poly, na::Point2::new(x, y))
        };

        assert!(inside(5.0, 5.0, &poly[..]));
        assert!(!inside(15.0, 5.0, &poly[..]));
        assert!(!inside(5.0, -1.0, &poly[..]));
        assert!(!inside(5.0, 5.0, &poly[..2]));

        // concave notch cut into the top edge
        let notched = vec![
            na::Point2::new(0.0, 0.0),
            na::Point2::new(4.0, 0.0),
            na::Point2::new(5.0, 6.0),
            na::Point2::new(6.0, 0.0),
            na::Point2::new(10.0, 0.0),
            na::Point2::new(10.0, 10.0),
            na::Point2::new(0.0, 10.0),
        ];
        assert!(!inside(5.0, 2.0, &notched[..]));
        assert!(inside(2.0, 2.0, &notched[..]));
        assert!(inside(5.0, 8.0, &notched[..]));
    }

    #[test]
    fn inactive_region_accepts_everything() {
        let roi = RegionOfInterest::new(vec![(0.0, 0.0), (50.0, 50.0)]);

        assert!(roi.contains(na::Point2::new(1000.0, 1000.0), (640, 480)));
    }

    #[test]
    fn retain_filters_by_centre_in_percent_space() {
        // left half of the frame
        let roi = RegionOfInterest::new(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)]);

        let mut dets = vec![
            Detection::new(BBox::ltwh(100.0, 100.0, 20.0, 20.0), "person", 0.9),
            Detection::new(BBox::ltwh(500.0, 100.0, 20.0, 20.0), "person", 0.9),
        ];
        roi.retain(&mut dets, (640, 480));

        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].center, (110.0, 110.0));
    }
}
