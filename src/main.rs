mod capture;
mod cloak;
mod display;
mod pipeline;

use anyhow::{Context, Result};
use capture::{FrameSource, WebcamCapture};
use clap::Parser;
use cloak::{BackgroundEstimator, MaskBuilder, DEFAULT_TOLERANCE};
use display::{FrameSink, InputEvents, KeyCommand, WindowDisplay};
use pipeline::PipelineController;
use std::time::{Duration, Instant};

/// Pause before retrying after a failed frame read.
const READ_RETRY_PAUSE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// List available capture devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Hue tolerance around the clicked color, out of 180
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u8,

    /// Number of frames sampled for the background median
    #[arg(long, default_value_t = 30)]
    background_frames: u32,

    /// Delay between background samples in milliseconds
    #[arg(long, default_value_t = 100)]
    background_delay_ms: u64,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Start on the grayscale mask view instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if args.list_devices {
        return list_devices();
    }

    tracing::info!("ChromaCloak starting");
    tracing::info!("Target FPS: {}", args.fps);

    let mut capture =
        WebcamCapture::new(args.input_device).context("Failed to initialize webcam capture")?;
    let (capture_width, capture_height) = capture.resolution();
    tracing::info!("Capture: {}x{}", capture_width, capture_height);

    let estimator = BackgroundEstimator::new(
        args.background_frames,
        Duration::from_millis(args.background_delay_ms),
    );

    // The session cannot start without a reference background.
    let background = estimator
        .capture(&mut capture)
        .context("Failed to capture the initial background")?;

    let (width, height) = background.dimensions();
    let mut window =
        WindowDisplay::new("ChromaCloak", width, height).context("Failed to open preview window")?;

    let controller =
        PipelineController::new(background, MaskBuilder::default(), args.tolerance);

    tracing::info!("Click the color to cloak");
    tracing::info!("Press 'b' to recapture the background, 'm' to toggle the mask view, 'q' to quit");

    run_pipeline(
        &mut capture,
        &mut window,
        controller,
        estimator,
        args.fps,
        args.show_mask,
    )
}

fn list_devices() -> Result<()> {
    let cameras =
        nokhwa::query(nokhwa::utils::ApiBackend::Auto).context("Failed to query capture devices")?;

    println!("Available cameras:");
    for camera in cameras {
        println!("{:<5} | {}", camera.index(), camera.human_name());
    }
    Ok(())
}

fn run_pipeline<C, D>(
    capture: &mut C,
    display: &mut D,
    mut controller: PipelineController,
    estimator: BackgroundEstimator,
    target_fps: u32,
    mut show_mask: bool,
) -> Result<()>
where
    C: FrameSource,
    D: FrameSink + InputEvents,
{
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps as f32);
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_process_time = Duration::ZERO;
    let mut total_display_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop");

    while display.is_open() {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let frame = match capture.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Frame read failed, retrying: {}", e);
                std::thread::sleep(READ_RETRY_PAUSE);
                continue;
            }
        };
        total_capture_time += capture_start.elapsed();

        // Handle pending input before this frame is processed, so a click
        // or recapture takes effect in the same iteration.
        let input = display.poll_input();
        match input.key {
            Some(KeyCommand::Quit) => break,
            Some(KeyCommand::ToggleMaskView) => show_mask = !show_mask,
            Some(KeyCommand::RecaptureBackground) => {
                // Blocks the loop for the full capture duration.
                match estimator.capture(capture) {
                    Ok(background) => {
                        controller.set_background(background);
                        tracing::info!("Background updated");
                    }
                    Err(e) => {
                        tracing::error!("Keeping the previous background: {}", e);
                    }
                }
            }
            None => {}
        }

        if let Some((x, y)) = input.click {
            controller.select_color(&frame, x, y);
        }

        // Mask + composite (or passthrough / debug view)
        let process_start = Instant::now();
        let output = if show_mask {
            controller.mask_preview(&frame)
        } else {
            controller.process(&frame)
        };
        total_process_time += process_start.elapsed();

        // Present
        let display_start = Instant::now();
        display.show(&output).context("Failed to display frame")?;
        total_display_time += display_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_process_ms = total_process_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_display_ms = total_display_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_process_ms + avg_display_ms;
            let actual_fps = 1000.0 / total_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, process={:.1}ms, display={:.1}ms, total={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_process_ms,
                avg_display_ms,
                total_ms,
                actual_fps
            );
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    Ok(())
}
