use anyhow::{Context, bail};
use gesture_grid::pipeline::{Detection, RecognizerConfig, Report};
use gesture_grid::session::RecognitionSession;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: replay_tester <detections.jsonl> <frame_width> <frame_height> [--fields N] [--overlay out.png]";

struct ReplayArgs {
    detections_path: PathBuf,
    frame_width: u32,
    frame_height: u32,
    n_fields: usize,
    overlay_path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> anyhow::Result<ReplayArgs> {
    if args.len() < 4 {
        bail!(USAGE);
    }

    let mut parsed = ReplayArgs {
        detections_path: PathBuf::from(&args[1]),
        frame_width: args[2].parse().context("frame width must be a positive integer")?,
        frame_height: args[3].parse().context("frame height must be a positive integer")?,
        n_fields: RecognizerConfig::default().n_fields,
        overlay_path: None,
    };

    let mut rest = args[4..].iter();
    while let Some(flag) = rest.next() {
        let value = rest.next().with_context(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--fields" => {
                parsed.n_fields = value.parse().context("--fields must be an integer")?;
            }
            "--overlay" => parsed.overlay_path = Some(PathBuf::from(value)),
            other => bail!("unknown option {other}\n{USAGE}"),
        }
    }
    Ok(parsed)
}

/// One line of the log is one frame: a JSON array of `[x, y, w, h]` boxes.
fn parse_frame(line: &str) -> anyhow::Result<Vec<Detection>> {
    let boxes: Vec<[u32; 4]> = serde_json::from_str(line)?;
    Ok(boxes.into_iter().map(Detection::from).collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Logging & Argument Parsing ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args)?;

    // --- 2. Detection Log ---
    let log = tokio::fs::read_to_string(&args.detections_path)
        .await
        .with_context(|| format!("reading {}", args.detections_path.display()))?;

    // --- 3. Recognition Session ---
    let config = RecognizerConfig {
        n_fields: args.n_fields,
        ..RecognizerConfig::new(args.frame_width, args.frame_height)
    };
    let session = RecognitionSession::spawn(config).context("invalid recognizer configuration")?;

    // --- 4. Replay Loop ---
    let mut frames = 0u64;
    let mut gestures = 0u64;
    for (line_no, line) in log.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let detections =
            parse_frame(line).with_context(|| format!("line {}: malformed frame", line_no + 1))?;
        frames += 1;

        match session.process_frame(detections).await {
            Ok(Report::GestureCompleted(gesture)) => {
                gestures += 1;
                let path: Vec<(u32, u32)> = gesture.path.iter().map(|p| (p.x, p.y)).collect();
                info!(frame = frames, pattern = %gesture.pattern, ?path, "gesture recognized");
            }
            Ok(_) => {}
            Err(err) => warn!(frame = frames, %err, "frame skipped"),
        }
    }

    // --- 5. Overlay & Summary ---
    if let Some(path) = &args.overlay_path {
        let overlay = session.overlay().await?;
        overlay
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing overlay to {}", path.display()))?;
        info!(path = %path.display(), "overlay saved");
    }

    session.shutdown().await;
    println!("Replay complete: {frames} frames, {gestures} gestures recognized.");
    Ok(())
}
