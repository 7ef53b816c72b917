use serde_derive::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::detection::Detection;
use crate::error::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorSettings {
    pub score_threshold: f32,
    /// Categories to keep; empty keeps all.
    pub categories: Vec<String>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.4,
            categories: vec!["person".to_string()],
        }
    }
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if (0.0..=1.0).contains(&self.score_threshold) {
            Ok(())
        } else {
            Err(Error::InvalidSettings(format!(
                "score threshold must be in [0, 1], got {}",
                self.score_threshold
            )))
        }
    }

    pub fn accepts(&self, det: &Detection) -> bool {
        det.score >= self.score_threshold
            && (self.categories.is_empty() || self.categories.iter().any(|c| *c == det.category))
    }
}

/// Interchangeable detection back end. The tracker only sees the
/// `Detection`s it yields and never inspects which implementation is active.
pub trait Detector<I> {
    fn detect(&mut self, image: &I) -> Result<Vec<Detection>, Error>;

    fn update_settings(&mut self, settings: &DetectorSettings) -> Result<(), Error>;

    fn settings(&self) -> DetectorSettings;
}

/// Plays back pre-recorded detections, one batch per call, regardless of
/// the image it is given.
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    frames: VecDeque<Vec<Detection>>,
    settings: DetectorSettings,
}

impl ReplayDetector {
    pub fn new<I: IntoIterator<Item = Vec<Detection>>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            settings: DetectorSettings::default(),
        }
    }

    pub fn push(&mut self, detections: Vec<Detection>) {
        self.frames.push_back(detections);
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl<I> Detector<I> for ReplayDetector {
    fn detect(&mut self, _image: &I) -> Result<Vec<Detection>, Error> {
        let mut dets = self.frames.pop_front().unwrap_or_default();
        dets.retain(|d| self.settings.accepts(d));

        Ok(dets)
    }

    fn update_settings(&mut self, settings: &DetectorSettings) -> Result<(), Error> {
        settings.validate()?;
        self.settings = settings.clone();

        Ok(())
    }

    fn settings(&self) -> DetectorSettings {
        self.settings.clone()
    }
}
