//! Built-in rune shapes and JSON template sets.
//!
//! Shapes are authored in a 100x100 box (y down), one template per spell id.

use serde::{Deserialize, Serialize};

use crate::input::gesture::Point;
use super::template::RuneTemplate;

/// Points sampled per polyline segment when building a built-in shape.
const SAMPLES_PER_SEGMENT: usize = 8;
/// Time between generated samples (milliseconds).
const SAMPLE_STEP_MS: f32 = 16.0;

/// A template set as exported by a rune editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSet {
    pub templates: Vec<RuneTemplate>,
}

impl TemplateSet {
    /// Parse a template set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The shapes shipped with the game.
    pub fn builtin() -> Self {
        Self { templates: builtin_runes() }
    }

    pub fn get(&self, id: &str) -> Option<&RuneTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }
}

/// Sample a polyline through `vertices` into a timed stroke.
fn polyline(vertices: &[(f32, f32)]) -> Vec<Point> {
    let mut out = Vec::with_capacity(vertices.len() * SAMPLES_PER_SEGMENT);
    let mut t = 0.0;
    for pair in vertices.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        for i in 0..SAMPLES_PER_SEGMENT {
            let f = i as f32 / SAMPLES_PER_SEGMENT as f32;
            out.push(Point::new(x0 + (x1 - x0) * f, y0 + (y1 - y0) * f, t));
            t += SAMPLE_STEP_MS;
        }
    }
    if let Some(&(x, y)) = vertices.last() {
        out.push(Point::new(x, y, t));
    }
    out
}

fn circle(cx: f32, cy: f32, r: f32) -> Vec<Point> {
    let n = 48;
    (0..=n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            Point::new(cx + r * a.cos(), cy + r * a.sin(), i as f32 * SAMPLE_STEP_MS)
        })
        .collect()
}

/// One template for each spell in the default spell book.
pub fn builtin_runes() -> Vec<RuneTemplate> {
    vec![
        RuneTemplate::new(
            "Fehu",
            "Fehu",
            vec![
                polyline(&[(20.0, 0.0), (20.0, 100.0)]),
                polyline(&[(20.0, 30.0), (70.0, 0.0)]),
                polyline(&[(20.0, 55.0), (70.0, 25.0)]),
            ],
        ),
        RuneTemplate::new(
            "Thurisaz",
            "Thurisaz",
            vec![
                polyline(&[(30.0, 0.0), (30.0, 100.0)]),
                polyline(&[(30.0, 25.0), (70.0, 50.0), (30.0, 75.0)]),
            ],
        ),
        RuneTemplate::new(
            "Venhu",
            "Venhu",
            vec![polyline(&[(0.0, 0.0), (33.0, 100.0), (66.0, 0.0), (100.0, 100.0)])],
        ),
        RuneTemplate::new("Isaz", "Isaz", vec![circle(50.0, 50.0, 50.0)]),
        RuneTemplate::new(
            "Lefu",
            "Lefu",
            vec![
                polyline(&[(30.0, 0.0), (30.0, 100.0)]),
                polyline(&[(30.0, 0.0), (70.0, 35.0)]),
            ],
        ),
        RuneTemplate::new(
            "Tiwaz",
            "Tiwaz",
            vec![
                polyline(&[(50.0, 0.0), (50.0, 100.0)]),
                polyline(&[(10.0, 40.0), (50.0, 0.0), (90.0, 40.0)]),
            ],
        ),
        RuneTemplate::new(
            "Uruz",
            "Uruz",
            vec![polyline(&[(20.0, 100.0), (20.0, 0.0), (80.0, 30.0), (80.0, 100.0)])],
        ),
        RuneTemplate::new(
            "Algiz",
            "Algiz",
            vec![
                polyline(&[(50.0, 100.0), (50.0, 0.0)]),
                polyline(&[(10.0, 0.0), (50.0, 45.0), (90.0, 0.0)]),
            ],
        ),
        RuneTemplate::new(
            "Nauthiz",
            "Nauthiz",
            vec![
                polyline(&[(50.0, 0.0), (50.0, 100.0)]),
                polyline(&[(20.0, 30.0), (80.0, 60.0)]),
            ],
        ),
        RuneTemplate::new(
            "Hagalaz",
            "Hagalaz",
            vec![
                polyline(&[(20.0, 0.0), (20.0, 100.0)]),
                polyline(&[(80.0, 0.0), (80.0, 100.0)]),
                polyline(&[(20.0, 35.0), (80.0, 65.0)]),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::RecognitionConfig;
    use crate::input::gesture::Gesture;
    use crate::recognition::template::TemplateRecognizer;

    fn redraw(template: &RuneTemplate, scale: f32, dx: f32, dy: f32) -> Gesture {
        Gesture::new(
            template
                .strokes
                .strokes
                .iter()
                .map(|s| s.iter().map(|p| Point::new(p.x * scale + dx, p.y * scale + dy, p.t)).collect())
                .collect(),
        )
    }

    #[test]
    fn builtin_ids_are_unique() {
        let set = TemplateSet::builtin();
        for t in &set.templates {
            assert_eq!(set.templates.iter().filter(|o| o.id == t.id).count(), 1, "{}", t.id);
        }
        assert!(set.get("Fehu").is_some());
        assert!(set.get("Ansuz").is_none());
    }

    #[test]
    fn every_builtin_recognizes_itself() {
        let set = TemplateSet::builtin();
        let config = RecognitionConfig::default();
        let threshold = config.match_threshold;
        let recognizer = TemplateRecognizer::new(config, set.templates.clone());

        for template in &set.templates {
            let drawn = redraw(template, 2.5, 140.0, 60.0);
            assert!(recognizer.is_gesture_complete(&drawn), "{} gated", template.id);
            let result = recognizer.recognize(&drawn);
            let matched = result.accepted(threshold).map(|t| t.id.as_str());
            assert_eq!(matched, Some(template.id.as_str()), "distance {}", result.distance);
        }
    }

    #[test]
    fn template_set_from_json() {
        let json = r#"{
            "templates": [
                {
                    "id": "Sowilo",
                    "name": "Sowilo",
                    "strokes": [[
                        { "x": 0.0, "y": 0.0, "t": 0.0 },
                        { "x": 40.0, "y": 40.0, "t": 16.0 },
                        { "x": 0.0, "y": 60.0 }
                    ]]
                }
            ]
        }"#;
        let set = TemplateSet::from_json(json).unwrap();
        let sowilo = set.get("Sowilo").unwrap();
        assert_eq!(sowilo.strokes.stroke_count(), 1);
        assert_eq!(sowilo.strokes.strokes[0][2].t, 0.0);
    }
}
