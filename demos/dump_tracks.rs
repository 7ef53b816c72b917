use groundtrack::{Calibration, Detection, Frame, GroundProjector, Tracker};
use log::warn;

const DIMS: (u32, u32) = (1280, 720);
const FPS: f32 = 25.0;

fn main() -> Result<(), groundtrack::Error> {
    use std::io::BufRead;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args();

    let _ = args.next();
    let in_file_name = match args.next() {
        Some(name) => name,
        None => {
            eprintln!("usage: dump_tracks <detections file>");
            std::process::exit(2);
        }
    };
    let dets_file = std::fs::File::open(in_file_name)?;

    let projector = GroundProjector::from_calibration(&Calibration::default(), DIMS)?;
    let mut tracker = Tracker::default();

    for line in std::io::BufReader::new(dets_file).lines() {
        let line = line?;

        let (idx, dets): (u64, Vec<Detection>) = if let Some(pos) = line.find(':') {
            let (idx, vector) = line.split_at(pos);

            match (idx.trim().parse::<u64>(), serde_json::from_str(&vector[1..])) {
                (Ok(idx), Ok(dets)) => (idx, dets),
                (Ok(_), Err(err)) => {
                    warn!("wrong file format: parse json failed: {}", err);
                    continue;
                }
                (Err(_), _) => {
                    warn!("wrong file format: parse frame index failed");
                    continue;
                }
            }
        } else {
            warn!("wrong file format: expected `:`");
            continue;
        };

        let frame = Frame::new(DIMS, dets, FPS);

        for t in tracker.update(&frame, Some(&projector)).values() {
            if t.disappeared == 0 {
                println!(
                    "{} {} {} {} {:.2}",
                    idx,
                    t.id,
                    t.centroid.x,
                    t.centroid.y,
                    t.current_speed()
                );
            }
        }
    }

    Ok(())
}
