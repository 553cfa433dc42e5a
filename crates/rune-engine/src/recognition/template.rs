use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::RecognitionConfig;
use crate::input::gesture::{Gesture, Point};
use super::geometry::{
    bounding_box, distance_at_best_angle, normalize, path_length, resample, scale_to_square,
};

/// A reference shape for the geometric recognizer.
/// `id` is the symbol the recognizer reports, so it doubles as a spell id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneTemplate {
    pub id: String,
    pub name: String,
    pub strokes: Gesture,
}

impl RuneTemplate {
    pub fn new(id: &str, name: &str, strokes: Vec<Vec<Point>>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            strokes: Gesture::new(strokes),
        }
    }
}

/// A template with its normalized point set cached.
struct PreparedTemplate {
    template: RuneTemplate,
    points: Vec<Vec2>,
}

/// Outcome of a recognition pass: the nearest template (if any) and the
/// mean point distance to it.
#[derive(Debug, Clone, Copy)]
pub struct Recognition<'a> {
    pub template: Option<&'a RuneTemplate>,
    pub distance: f32,
}

impl<'a> Recognition<'a> {
    /// The matched template, if it is closer than `threshold`.
    pub fn accepted(&self, threshold: f32) -> Option<&'a RuneTemplate> {
        self.template.filter(|_| self.distance < threshold)
    }
}

/// Rotation-invariant nearest-template classifier for single- and
/// multi-stroke gestures.
///
/// Each candidate is resampled to a fixed point count, scaled into a square,
/// has its indicative angle rotated out and is recentred on the origin, then
/// compared against every template with a golden-section search over the
/// residual rotation.
pub struct TemplateRecognizer {
    config: RecognitionConfig,
    templates: Vec<PreparedTemplate>,
}

impl TemplateRecognizer {
    pub fn new(config: RecognitionConfig, templates: Vec<RuneTemplate>) -> Self {
        let mut recognizer = Self {
            config,
            templates: Vec::with_capacity(templates.len()),
        };
        for template in templates {
            recognizer.add_template(template);
        }
        recognizer
    }

    /// Register a template. Templates are flattened in their stored stroke
    /// order; only the drawn gesture is permuted.
    pub fn add_template(&mut self, template: RuneTemplate) {
        let points = self.prepare(&template.strokes.positions());
        self.templates.push(PreparedTemplate { template, points });
    }

    pub fn templates(&self) -> impl Iterator<Item = &RuneTemplate> {
        self.templates.iter().map(|t| &t.template)
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Resample, scale to square, rotate out the indicative angle, recentre.
    pub fn prepare(&self, polyline: &[Vec2]) -> Vec<Vec2> {
        let resampled = resample(polyline, self.config.resample_points);
        let squared = scale_to_square(&resampled, self.config.square_size);
        normalize(&squared, true)
    }

    /// Rejects accidental taps, flicks and degenerate slivers before any
    /// matching is attempted.
    pub fn is_gesture_complete(&self, gesture: &Gesture) -> bool {
        let points = gesture.positions();
        if points.len() < self.config.min_points {
            return false;
        }

        let (lo, hi) = bounding_box(&points);
        let extent = hi - lo;
        let aspect = if extent.y > 0.0 { extent.x / extent.y } else { 0.0 };
        let total = path_length(&points);

        total > self.config.min_length_ratio * self.config.square_size
            && (self.config.min_aspect..=self.config.max_aspect).contains(&aspect)
    }

    /// Find the nearest template over every permitted stroke ordering.
    pub fn recognize(&self, gesture: &Gesture) -> Recognition<'_> {
        let mut best = Recognition {
            template: None,
            distance: f32::INFINITY,
        };

        let candidates: Vec<Vec<Vec2>> = stroke_orders(gesture, self.config.max_permuted_strokes)
            .into_iter()
            .filter(|polyline| polyline.len() >= 2)
            .map(|polyline| self.prepare(&polyline))
            .collect();

        for prepared in &self.templates {
            for candidate in &candidates {
                let d = distance_at_best_angle(
                    candidate,
                    &prepared.points,
                    self.config.angle_range,
                    self.config.angle_precision,
                );
                if d < best.distance {
                    best = Recognition {
                        template: Some(&prepared.template),
                        distance: d,
                    };
                }
            }
        }

        match best.template {
            Some(t) => log::debug!("recognized {} at distance {:.2}", t.id, best.distance),
            None => log::debug!("no template candidate"),
        }
        best
    }
}

/// Flattened polylines for every stroke order and direction combination.
///
/// Up to `max_permuted` strokes this is the full `k! * 2^k` search. Beyond
/// that only the drawn order and its complete reversal are produced.
pub fn stroke_orders(gesture: &Gesture, max_permuted: usize) -> Vec<Vec<Vec2>> {
    let strokes: Vec<Vec<Vec2>> = gesture
        .strokes
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.iter().map(Point::pos).collect())
        .collect();

    if strokes.len() <= 1 {
        return vec![strokes.concat()];
    }

    if strokes.len() > max_permuted {
        let forward = strokes.concat();
        let mut backward = forward.clone();
        backward.reverse();
        return vec![forward, backward];
    }

    let mut out = Vec::new();
    let mut used = vec![false; strokes.len()];
    let mut prefix = Vec::with_capacity(strokes.len());
    permute(&strokes, &mut used, &mut prefix, &mut out);
    out
}

fn permute(
    strokes: &[Vec<Vec2>],
    used: &mut [bool],
    prefix: &mut Vec<(usize, bool)>,
    out: &mut Vec<Vec<Vec2>>,
) {
    if prefix.len() == strokes.len() {
        let mut polyline = Vec::new();
        for &(idx, reversed) in prefix.iter() {
            if reversed {
                polyline.extend(strokes[idx].iter().rev());
            } else {
                polyline.extend(strokes[idx].iter());
            }
        }
        out.push(polyline);
        return;
    }

    for idx in 0..strokes.len() {
        if used[idx] {
            continue;
        }
        used[idx] = true;
        for reversed in [false, true] {
            prefix.push((idx, reversed));
            permute(strokes, used, prefix, out);
            prefix.pop();
        }
        used[idx] = false;
    }
}
