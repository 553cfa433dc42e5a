//! Feature pipeline for the learned classifier.
//!
//! Converts raw strokes into a fixed `[1, max_points, 4]` tensor of
//! `(dx, dy, dt, pen_lift)` rows: bounding-box and time normalisation,
//! delta encoding, stationary-pen denoising, per-channel standardisation and
//! finally index resampling or zero padding. The steps must run in this order
//! to match how the model was trained.

use bytemuck::{Pod, Zeroable};

use crate::api::config::FeatureConfig;
use crate::input::gesture::Gesture;

/// Lower bound for the bounding-box sides and the time span.
const SPAN_FLOOR: f32 = 1e-6;

/// One row of the model input.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FeatureFrame {
    pub dx: f32,
    pub dy: f32,
    pub dt: f32,
    /// 1.0 on the first point of every stroke after the first.
    pub pen: f32,
}

impl FeatureFrame {
    pub const CHANNELS: usize = 4;

    fn channels(&self) -> [f32; 4] {
        [self.dx, self.dy, self.dt, self.pen]
    }

    fn from_channels(c: [f32; 4]) -> Self {
        Self { dx: c[0], dy: c[1], dt: c[2], pen: c[3] }
    }

    fn motion(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// Fixed-shape model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    frames: Vec<FeatureFrame>,
}

impl FeatureTensor {
    /// All-zero tensor with `rows` frames.
    pub fn zeros(rows: usize) -> Self {
        Self {
            frames: vec![FeatureFrame::default(); rows],
        }
    }

    /// `[batch, rows, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        [1, self.frames.len(), FeatureFrame::CHANNELS]
    }

    pub fn frames(&self) -> &[FeatureFrame] {
        &self.frames
    }

    /// Row-major flat view, `rows * 4` floats.
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.frames)
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.as_slice().to_vec()
    }
}

/// Run the full pipeline.
pub fn preprocess(gesture: &Gesture, config: &FeatureConfig) -> FeatureTensor {
    let frames = delta_frames(gesture);
    let frames = denoise(frames, config.motion_epsilon);
    let frames = standardize(frames, config.std_floor);
    FeatureTensor {
        frames: fit_length(&frames, config.max_points),
    }
}

/// Normalise the whole gesture into its bounding box and time span, then
/// emit one delta row per point after the very first.
pub fn delta_frames(gesture: &Gesture) -> Vec<FeatureFrame> {
    let mut points = gesture.points();
    let Some(first) = points.next() else {
        return Vec::new();
    };
    let last = gesture.points().last().unwrap_or(first);

    let (min_x, max_x, min_y, max_y) = gesture.points().fold(
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY),
        |(lx, hx, ly, hy), p| (lx.min(p.x), hx.max(p.x), ly.min(p.y), hy.max(p.y)),
    );
    let w = (max_x - min_x).max(SPAN_FLOOR);
    let h = (max_y - min_y).max(SPAN_FLOOR);
    let scale = 1.0 / w.max(h);

    let t0 = first.t;
    let span = (last.t - t0).max(SPAN_FLOOR);

    let mut frames = Vec::with_capacity(gesture.point_count());
    let mut prev: Option<(f32, f32, f32)> = None;

    for stroke in &gesture.strokes {
        for (j, p) in stroke.iter().enumerate() {
            let x = (p.x - min_x) * scale;
            let y = (p.y - min_y) * scale;
            let t = (p.t - t0) / span;

            if let Some((px, py, pt)) = prev {
                frames.push(FeatureFrame {
                    dx: x - px,
                    dy: y - py,
                    dt: t - pt,
                    pen: if j == 0 { 1.0 } else { 0.0 },
                });
            }
            prev = Some((x, y, t));
        }
    }

    frames
}

/// Drop rows whose spatial motion is below `epsilon`.
pub fn denoise(frames: Vec<FeatureFrame>, epsilon: f32) -> Vec<FeatureFrame> {
    frames.into_iter().filter(|f| f.motion() > epsilon).collect()
}

/// Zero mean, unit variance per channel (population statistics).
pub fn standardize(frames: Vec<FeatureFrame>, std_floor: f32) -> Vec<FeatureFrame> {
    if frames.is_empty() {
        return frames;
    }
    let n = frames.len() as f32;

    let mut mean = [0.0f32; 4];
    for f in &frames {
        for (m, v) in mean.iter_mut().zip(f.channels()) {
            *m += v;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut var = [0.0f32; 4];
    for f in &frames {
        for ((acc, v), m) in var.iter_mut().zip(f.channels()).zip(mean) {
            *acc += (v - m) * (v - m);
        }
    }
    let std = var.map(|v| (v / n).sqrt() + std_floor);

    frames
        .iter()
        .map(|f| {
            let c = f.channels();
            FeatureFrame::from_channels(std::array::from_fn(|i| (c[i] - mean[i]) / std[i]))
        })
        .collect()
}

/// Pick evenly spaced rows when too long, zero-pad when too short.
pub fn fit_length(frames: &[FeatureFrame], max_points: usize) -> Vec<FeatureFrame> {
    if max_points == 0 {
        return Vec::new();
    }
    let n = frames.len();
    if n > max_points {
        if max_points == 1 {
            return vec![frames[0]];
        }
        let step = (n - 1) as f64 / (max_points - 1) as f64;
        (0..max_points)
            .map(|i| {
                // ties go to even, like numpy's round
                let idx = (i as f64 * step).round_ties_even() as usize;
                frames[idx.min(n - 1)]
            })
            .collect()
    } else {
        let mut out = frames.to_vec();
        out.resize(max_points, FeatureFrame::default());
        out
    }
}
