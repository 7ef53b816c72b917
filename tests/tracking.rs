use approx::assert_relative_eq;
use groundtrack::bbox::BBox;
use groundtrack::{
    Assignment, Calibration, Detection, Frame, GroundProjector, Snapshot, SpeedSample, Tracker,
    TrackerConfig,
};
use nalgebra as na;

const DIMS: (u32, u32) = (1280, 720);
const FPS: f32 = 25.0;

fn person(cx: f32, cy: f32) -> Detection {
    Detection::new(BBox::ltwh(cx - 10.0, cy - 20.0, 20.0, 40.0), "person", 0.9)
}

fn frame(dets: Vec<Detection>) -> Frame {
    Frame::new(DIMS, dets, FPS)
}

fn projector() -> GroundProjector {
    GroundProjector::from_calibration(&Calibration::default(), DIMS).unwrap()
}

#[test]
fn stationary_person_keeps_identity() {
    let proj = projector();
    let mut tracker = Tracker::default();

    for _ in 0..5 {
        tracker.update(&frame(vec![person(640.0, 500.0)]), Some(&proj));
    }

    assert_eq!(tracker.len(), 1);

    let t = &tracker.tracks()[&0];
    assert_eq!(t.age, 5);
    assert_eq!(t.disappeared, 0);
    assert!(t.current_speed().abs() < 1e-3);
    assert_relative_eq!(t.centroid.x, 640.0, epsilon = 1e-3);
    assert_relative_eq!(t.centroid.y, 500.0, epsilon = 1e-3);
}

#[test]
fn track_expires_after_max_disappeared() {
    let mut tracker = Tracker::default();
    let max_disappeared = tracker.config().max_disappeared;

    tracker.update(&frame(vec![person(200.0, 200.0)]), None);

    for missed in 1..=max_disappeared {
        let tracks = tracker.update(&frame(vec![]), None);
        assert_eq!(tracks[&0].disappeared, missed);
    }

    assert!(tracker.update(&frame(vec![]), None).is_empty());
}

#[test]
fn unmatched_track_expires_while_others_are_seen() {
    let mut tracker = Tracker::new(TrackerConfig {
        max_disappeared: 3,
        ..Default::default()
    })
    .unwrap();

    tracker.update(&frame(vec![person(100.0, 100.0), person(900.0, 600.0)]), None);

    for missed in 1..=3 {
        let tracks = tracker.update(&frame(vec![person(900.0, 600.0)]), None);
        assert_eq!(tracks[&0].disappeared, missed);
        assert_eq!(tracks[&1].disappeared, 0);
    }

    let tracks = tracker.update(&frame(vec![person(900.0, 600.0)]), None);
    assert_eq!(tracks.keys().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn disappeared_resets_only_on_match() {
    let mut tracker = Tracker::default();
    tracker.update(&frame(vec![person(200.0, 200.0)]), None);

    for _ in 0..3 {
        tracker.update(&frame(vec![]), None);
    }
    assert_eq!(tracker.tracks()[&0].disappeared, 3);

    // far away detection: new track, old one keeps counting
    tracker.update(&frame(vec![person(900.0, 600.0)]), None);
    assert_eq!(tracker.tracks()[&0].disappeared, 4);
    assert_eq!(tracker.tracks()[&1].disappeared, 0);

    tracker.update(&frame(vec![person(202.0, 200.0), person(900.0, 600.0)]), None);
    assert_eq!(tracker.tracks()[&0].disappeared, 0);
    assert_eq!(tracker.tracks()[&0].age, 2);
}

#[test]
fn speed_follows_ground_plane_geometry() {
    let proj = projector();
    let mut tracker = Tracker::default();

    tracker.update(&frame(vec![person(640.0, 500.0)]), Some(&proj));
    tracker.update(&frame(vec![person(640.0, 520.0)]), Some(&proj));

    // down the centre column the ground range is h / tan(depression angle)
    let range = |v: f32| {
        let y_ndc = 1.0 - 2.0 * v / 720.0;
        let above_axis = (y_ndc * 25f32.to_radians().tan()).atan();
        15.0 / (30f32.to_radians() - above_axis).tan()
    };
    let expected = (range(500.0) - range(520.0)).abs() * FPS * 3.6;

    let t = &tracker.tracks()[&0];
    assert_relative_eq!(t.current_speed(), expected, max_relative = 1e-3);
}

/// Walks right at 10 px per frame; with the 0.05 m/px fallback at 25 fps
/// that is 45 km/h.
fn walk(tracker: &mut Tracker, frames: usize) {
    for i in 0..frames {
        tracker.update(&frame(vec![person(100.0 + 10.0 * i as f32, 300.0)]), None);
    }
}

#[test]
fn steady_walker_keeps_its_speed() {
    let mut tracker = Tracker::default();
    walk(&mut tracker, 60);

    assert_eq!(tracker.len(), 1);

    let t = &tracker.tracks()[&0];
    assert_relative_eq!(t.current_speed(), 45.0, max_relative = 0.02);
    assert!(matches!(t.last_sample, Some(SpeedSample::Pixels(v)) if (v - 45.0).abs() < 1.0));
}

#[test]
fn shown_speed_is_mean_of_recent_samples() {
    let mut tracker = Tracker::default();
    let window = tracker.config().speed_window;
    walk(&mut tracker, 40);

    let t = &tracker.tracks()[&0];
    assert_eq!(t.age, 40);
    assert_eq!(t.speed.num_samples(), window);

    let samples: Vec<f32> = t.speed.iter().copied().collect();
    let mean = samples.iter().sum::<f32>() / samples.len() as f32;

    assert_relative_eq!(t.current_speed(), mean, max_relative = 1e-6);
    for v in samples {
        assert_relative_eq!(v, 45.0, max_relative = 0.05);
    }
}

#[test]
fn shown_speed_decays_while_missed() {
    let mut tracker = Tracker::default();

    tracker.update(&frame(vec![person(640.0, 500.0)]), None);
    tracker.update(&frame(vec![person(650.0, 500.0)]), None);

    let measured = tracker.tracks()[&0].current_speed();
    assert!(measured > 0.0);

    tracker.update(&frame(vec![]), None);
    assert_relative_eq!(
        tracker.tracks()[&0].current_speed(),
        measured * 0.95,
        max_relative = 1e-5
    );
}

#[test]
fn camera_shift_keeps_track_matched() {
    let config = TrackerConfig {
        max_distance: 50.0,
        ..Default::default()
    };

    let mut compensated = Tracker::new(config.clone()).unwrap();
    compensated.update(&frame(vec![person(300.0, 200.0)]), None);
    compensated.update(
        &frame(vec![person(150.0, 200.0)]).with_camera_shift(na::Vector2::new(-150.0, 0.0)),
        None,
    );

    assert_eq!(compensated.len(), 1);
    assert_eq!(compensated.tracks()[&0].disappeared, 0);
    assert!(compensated.tracks()[&0].current_speed().abs() < 1e-3);

    let mut raw = Tracker::new(config).unwrap();
    raw.update(&frame(vec![person(300.0, 200.0)]), None);
    raw.update(&frame(vec![person(150.0, 200.0)]), None);

    assert_eq!(raw.len(), 2);
}

#[test]
fn identical_input_gives_identical_ids() {
    let frames = vec![
        vec![person(100.0, 100.0), person(110.0, 100.0), person(400.0, 300.0)],
        vec![person(105.0, 100.0), person(105.0, 101.0)],
        vec![person(104.0, 100.0), person(401.0, 300.0), person(700.0, 700.0)],
    ];

    let run = || {
        let mut tracker = Tracker::default();
        frames
            .iter()
            .map(|dets| {
                tracker
                    .update(&frame(dets.clone()), None)
                    .values()
                    .map(|t| (t.id, t.disappeared))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn optimal_assignment_recovers_greedy_loser() {
    let first = vec![person(100.0, 100.0), person(106.0, 100.0)];
    let second = vec![person(105.0, 100.0), person(80.0, 100.0)];

    let mut greedy = Tracker::default();
    greedy.update(&frame(first.clone()), None);
    greedy.update(&frame(second.clone()), None);

    // track 1 takes the shared nearest detection, track 0 misses
    assert_eq!(greedy.len(), 3);
    assert_eq!(greedy.tracks()[&0].disappeared, 1);

    let mut optimal = Tracker::new(TrackerConfig {
        assignment: Assignment::Optimal,
        ..Default::default()
    })
    .unwrap();
    optimal.update(&frame(first), None);
    optimal.update(&frame(second), None);

    assert_eq!(optimal.len(), 2);
    assert!(optimal.tracks().values().all(|t| t.disappeared == 0));
}

#[test]
fn snapshot_serialises_for_consumers() {
    let mut tracker = Tracker::default();
    tracker.update(&frame(vec![person(100.0, 100.0), person(500.0, 300.0)]), None);

    let snap = Snapshot::capture(1, &tracker);
    assert_eq!(snap.currently_tracked, 2);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["currentlyTracked"], 2);
    assert_eq!(json["tracks"][1]["id"], 1);
    assert_eq!(json["tracks"][0]["history"].as_array().unwrap().len(), 1);
}
