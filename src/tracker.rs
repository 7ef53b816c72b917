use log::{debug, trace, warn};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assignment::{assign, Assignment, Candidate, CostMatrix};
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::projector::GroundProjector;
use crate::speed;
use crate::track::{Track, TrackSnapshot};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Association gate on raw centroid distance, px.
    pub max_distance: f32,
    /// A track is dropped once it has been missed more frames than this.
    pub max_disappeared: u32,
    pub history_len: usize,
    pub speed_window: usize,
    /// Applied to the shown speed on every frame before association.
    pub speed_decay: f32,
    /// Uncalibrated scale for the pixel speed fallback.
    pub fallback_meters_per_pixel: f32,
    pub assignment: Assignment,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            max_disappeared: 40,
            history_len: 50,
            speed_window: 10,
            speed_decay: 0.95,
            fallback_meters_per_pixel: 0.05,
            assignment: Assignment::Greedy,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), Error> {
        validate_max_distance(self.max_distance)?;

        if self.history_len == 0 || self.speed_window == 0 {
            return Err(Error::InvalidSettings(
                "history and speed windows must hold at least one entry".to_string(),
            ));
        }

        if !(self.speed_decay.is_finite() && (0.0..=1.0).contains(&self.speed_decay)) {
            return Err(Error::InvalidSettings(format!(
                "speed decay must be in [0, 1], got {}",
                self.speed_decay
            )));
        }

        if !(self.fallback_meters_per_pixel.is_finite() && self.fallback_meters_per_pixel >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "fallback scale must be non-negative, got {}",
                self.fallback_meters_per_pixel
            )));
        }

        Ok(())
    }
}

fn validate_max_distance(max_distance: f32) -> Result<(), Error> {
    if max_distance.is_finite() && max_distance > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSettings(format!(
            "max distance must be positive, got {}",
            max_distance
        )))
    }
}

/// Runtime adjustment of the gating parameters; absent fields are kept.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSettings {
    pub max_distance: Option<f32>,
    pub max_disappeared: Option<u32>,
}

/// Owns the live tracks and runs the per-frame cycle: camera motion
/// compensation, prediction, association, correction, speed, expiry.
///
/// Not internally synchronised; one caller drives `update` per frame.
pub struct Tracker {
    config: TrackerConfig,
    tracks: BTreeMap<u32, Track>,
    next_id: u32,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            tracks: BTreeMap::new(),
            next_id: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Takes effect from the next `update`. Nothing changes if any field is
    /// rejected.
    pub fn apply_settings(&mut self, settings: &TrackerSettings) -> Result<(), Error> {
        if let Some(max_distance) = settings.max_distance {
            if let Err(err) = validate_max_distance(max_distance) {
                warn!("tracker: rejected settings {:?}: {}", settings, err);
                return Err(err);
            }
        }

        if let Some(max_distance) = settings.max_distance {
            self.config.max_distance = max_distance;
        }

        if let Some(max_disappeared) = settings.max_disappeared {
            self.config.max_disappeared = max_disappeared;
        }

        debug!(
            "tracker: max_distance={} max_disappeared={}",
            self.config.max_distance, self.config.max_disappeared
        );

        Ok(())
    }

    #[inline]
    pub fn tracks(&self) -> &BTreeMap<u32, Track> {
        &self.tracks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn snapshots(&self) -> Vec<TrackSnapshot> {
        self.tracks.values().map(Track::snapshot).collect()
    }

    pub fn update(
        &mut self,
        frame: &Frame,
        projector: Option<&GroundProjector>,
    ) -> &BTreeMap<u32, Track> {
        for track in self.tracks.values_mut() {
            track.compensate(frame.camera_shift);
            track.predict(self.config.speed_decay);
        }

        if frame.is_empty() {
            self.expire();
            return &self.tracks;
        }

        if self.tracks.is_empty() {
            for det in frame.iter() {
                self.register(det);
            }
            return &self.tracks;
        }

        let ids: Vec<u32> = self.tracks.keys().copied().collect();
        let track_candidates: Vec<Candidate> = self
            .tracks
            .values()
            .map(|t| Candidate {
                centroid: t.centroid,
                bbox: t.bbox,
            })
            .collect();
        let det_candidates: Vec<Candidate> = frame
            .iter()
            .map(|d| Candidate {
                centroid: d.centroid(),
                bbox: d.ltrb(),
            })
            .collect();

        let costs = CostMatrix::new(&track_candidates, &det_candidates, self.config.max_distance);
        let matching = assign(&costs, self.config.max_distance, self.config.assignment);

        for &(row, col) in &matching.matched {
            let det = &frame.detections[col];
            let id = ids[row];

            if let Some(track) = self.tracks.get_mut(&id) {
                let measured = det.centroid();
                let sample = speed::estimate(
                    track.prev_centroid,
                    measured,
                    projector,
                    frame.dims,
                    frame.fps,
                    self.config.fallback_meters_per_pixel,
                );

                track.correct(measured, det.ltrb());

                if let Some(sample) = sample {
                    track.record_speed(sample);
                }

                trace!(
                    "tracker: #{} <- detection {} ({:.1}px, {:?})",
                    id,
                    col,
                    costs.distance[[row, col]],
                    sample
                );
            }
        }

        for &col in &matching.unmatched_detections {
            self.register(&frame.detections[col]);
        }

        self.expire();

        &self.tracks
    }

    fn register(&mut self, det: &Detection) {
        let id = self.next_id;
        self.next_id += 1;

        let track = Track::new(
            id,
            det.centroid(),
            det.ltrb(),
            self.config.history_len,
            self.config.speed_window,
        );

        debug!("tracker: registered #{} at {:?}", id, det.center);
        self.tracks.insert(id, track);
    }

    fn expire(&mut self) {
        let max_disappeared = self.config.max_disappeared;

        self.tracks.retain(|id, t| {
            let keep = t.disappeared <= max_disappeared;
            if !keep {
                debug!("tracker: deregistered #{} after {} missed frames", id, t.disappeared);
            }
            keep
        });
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            config: TrackerConfig::default(),
            tracks: BTreeMap::new(),
            next_id: 0,
        }
    }
}
