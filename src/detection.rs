use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Ltwh};

/// Single detector output: left-top-width-height box, category, score and
/// the box centre as reported by the detector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BBox<Ltwh>,
    #[serde(rename = "c")]
    pub category: String,
    #[serde(rename = "p")]
    pub score: f32,
    pub center: (f32, f32),
}

impl Detection {
    pub fn new<S: Into<String>>(bbox: BBox<Ltwh>, category: S, score: f32) -> Self {
        let c = bbox.center();

        Self {
            bbox,
            category: category.into(),
            score,
            center: (c.x, c.y),
        }
    }

    #[inline(always)]
    pub fn centroid(&self) -> na::Point2<f32> {
        na::Point2::new(self.center.0, self.center.1)
    }

    #[inline(always)]
    pub fn ltrb(&self) -> BBox<Ltrb> {
        self.bbox.as_ltrb()
    }
}
