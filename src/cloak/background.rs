use crate::capture::FrameSource;
use image::RgbImage;
use ndarray::{Array2, ArrayView1, Axis};
use std::time::Duration;
use thiserror::Error;

/// Background estimation obtained zero usable frames.
#[derive(Debug, Error)]
#[error("could not capture any frames for the background")]
pub struct NoFramesCaptured;

/// Samples consecutive frames and reduces them to a per-pixel temporal
/// median, giving a static reference scene that shrugs off transient
/// motion and sensor noise.
#[derive(Clone, Copy, Debug)]
pub struct BackgroundEstimator {
    sample_count: u32,
    frame_delay: Duration,
}

impl Default for BackgroundEstimator {
    fn default() -> Self {
        Self {
            sample_count: 30,
            frame_delay: Duration::from_millis(100),
        }
    }
}

impl BackgroundEstimator {
    pub fn new(sample_count: u32, frame_delay: Duration) -> Self {
        Self {
            sample_count,
            frame_delay,
        }
    }

    /// Read `sample_count` frames from `source`, spacing reads by
    /// `frame_delay` so the sensor settles between samples.
    ///
    /// Failed reads are logged and skipped; the median is computed over
    /// whatever was captured. All captured frames must share dimensions.
    pub fn capture<S: FrameSource>(&self, source: &mut S) -> Result<RgbImage, NoFramesCaptured> {
        tracing::info!(
            "Capturing background over {} frames. Please move out of the frame",
            self.sample_count
        );

        let mut samples: Vec<RgbImage> = Vec::with_capacity(self.sample_count as usize);
        for i in 0..self.sample_count {
            match source.next_frame() {
                Ok(frame) => samples.push(frame),
                Err(e) => {
                    tracing::warn!("Skipping background frame {}/{}: {}", i + 1, self.sample_count, e);
                }
            }
            if !self.frame_delay.is_zero() {
                std::thread::sleep(self.frame_delay);
            }
        }

        if samples.is_empty() {
            return Err(NoFramesCaptured);
        }
        if (samples.len() as u32) < self.sample_count {
            tracing::warn!(
                "Background captured from {} of {} frames",
                samples.len(),
                self.sample_count
            );
        }

        Ok(median_stack(&samples))
    }
}

/// Per-pixel, per-channel median across a set of equally sized frames.
/// Even counts take the truncated mean of the two middle samples.
fn median_stack(samples: &[RgbImage]) -> RgbImage {
    let (width, height) = samples[0].dimensions();
    if samples.len() == 1 {
        return samples[0].clone();
    }

    let n = samples.len();
    let len = samples[0].as_raw().len();
    let mut stack = Array2::<u8>::zeros((n, len));
    for (mut row, frame) in stack.rows_mut().into_iter().zip(samples) {
        row.assign(&ArrayView1::from(frame.as_raw().as_slice()));
    }

    let mut lane = Vec::with_capacity(n);
    let data: Vec<u8> = stack
        .axis_iter(Axis(1))
        .map(|column| {
            lane.clear();
            lane.extend(column.iter().copied());
            lane.sort_unstable();
            if n % 2 == 1 {
                lane[n / 2]
            } else {
                ((lane[n / 2 - 1] as u16 + lane[n / 2] as u16) / 2) as u8
            }
        })
        .collect();

    RgbImage::from_raw(width, height, data).expect("median stack preserves frame dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;
    use image::Rgb;

    /// Feeds a fixed frame sequence; `Err` entries simulate dropped reads.
    struct ScriptedSource {
        frames: Vec<Option<RgbImage>>,
        cursor: usize,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Option<RgbImage>>) -> Self {
            Self { frames, cursor: 0 }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<RgbImage, CaptureError> {
            let entry = self.frames.get(self.cursor).cloned().flatten();
            self.cursor += 1;
            entry.ok_or_else(|| CaptureError::Acquisition("scripted dropout".into()))
        }

        fn resolution(&self) -> (u32, u32) {
            (4, 4)
        }
    }

    fn estimator(samples: u32) -> BackgroundEstimator {
        BackgroundEstimator::new(samples, Duration::ZERO)
    }

    #[test]
    fn identical_frames_come_back_unchanged() {
        let frame = RgbImage::from_fn(4, 4, |x, y| Rgb([x as u8, y as u8, 7]));
        let mut source = ScriptedSource::new(vec![Some(frame.clone()); 5]);

        let background = estimator(5).capture(&mut source).unwrap();
        assert_eq!(background.as_raw(), frame.as_raw());
    }

    #[test]
    fn zero_usable_frames_is_an_error() {
        let mut source = ScriptedSource::new(vec![None; 5]);
        assert!(estimator(5).capture(&mut source).is_err());
    }

    #[test]
    fn partial_capture_still_produces_a_background() {
        let frame = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));
        let mut source = ScriptedSource::new(vec![
            None,
            Some(frame.clone()),
            None,
            Some(frame.clone()),
            Some(frame.clone()),
        ]);

        let background = estimator(5).capture(&mut source).unwrap();
        assert_eq!(background.as_raw(), frame.as_raw());
    }

    #[test]
    fn median_rejects_outlier_samples() {
        // A transient bright pixel in one of three frames must not survive.
        let steady = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let mut flash = steady.clone();
        flash.put_pixel(1, 1, Rgb([250, 250, 250]));

        let mut source = ScriptedSource::new(vec![
            Some(steady.clone()),
            Some(flash),
            Some(steady.clone()),
        ]);

        let background = estimator(3).capture(&mut source).unwrap();
        assert_eq!(background.as_raw(), steady.as_raw());
    }

    #[test]
    fn odd_count_median_picks_the_middle_sample() {
        let values = [10u8, 200, 30];
        let frames = values
            .iter()
            .map(|&v| Some(RgbImage::from_pixel(2, 2, Rgb([v, v, v]))))
            .collect();
        let mut source = ScriptedSource::new(frames);

        let background = estimator(3).capture(&mut source).unwrap();
        assert_eq!(background.get_pixel(0, 0), &Rgb([30, 30, 30]));
    }

    #[test]
    fn even_count_median_averages_the_middle_pair() {
        let values = [10u8, 20, 31, 200];
        let frames = values
            .iter()
            .map(|&v| Some(RgbImage::from_pixel(2, 2, Rgb([v, v, v]))))
            .collect();
        let mut source = ScriptedSource::new(frames);

        let background = estimator(4).capture(&mut source).unwrap();
        assert_eq!(background.get_pixel(0, 0), &Rgb([25, 25, 25]));
    }
}
