//! Wavefront OBJ model data
//!
//! Only vertex positions are interpreted. Face and grouping lines are kept
//! verbatim so a normalized model can be written back with its topology.

use std::fmt::Write as _;

use glam::DVec3;

/// A model as read from an `.obj` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMesh {
    /// Vertex positions in file order
    pub vertices: Vec<DVec3>,
    /// `f`, `l`, `g`, `s` and `usemtl` lines, untouched
    pub topology: Vec<String>,
}

impl ModelMesh {
    /// Parse OBJ text. Returns an error message naming the offending line.
    pub fn parse_obj(text: &str) -> Result<Self, String> {
        let mut mesh = ModelMesh::default();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let mut coords = [0.0f64; 3];
                    for coord in coords.iter_mut() {
                        let value = parts
                            .next()
                            .ok_or_else(|| format!("line {}: vertex needs 3 coordinates", number + 1))?;
                        *coord = value
                            .parse()
                            .map_err(|_| format!("line {}: invalid coordinate {:?}", number + 1, value))?;
                    }
                    mesh.vertices.push(DVec3::from_array(coords));
                }
                Some("f" | "l" | "g" | "s" | "usemtl") => mesh.topology.push(line.to_string()),
                _ => {}
            }
        }

        if mesh.vertices.is_empty() {
            return Err("model has no vertices".to_string());
        }
        Ok(mesh)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (DVec3, DVec3) {
        self.vertices.iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(min, max), v| (min.min(*v), max.max(*v)),
        )
    }

    /// Center the bounding box on the origin and scale uniformly so the
    /// largest extent equals `dimension`.
    pub fn normalize(&mut self, dimension: f64) {
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        let extent = (max - min).max_element();
        // A single point or a degenerate mesh keeps its scale
        let scale = if extent > f64::EPSILON { dimension / extent } else { 1.0 };

        for vertex in &mut self.vertices {
            *vertex = (*vertex - center) * scale;
        }
    }

    /// Serialize back to OBJ text under object name `name`.
    pub fn to_obj(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "o {}", name);
        for v in &self.vertices {
            let _ = writeln!(out, "v {} {} {}", v.x, v.y, v.z);
        }
        for line in &self.topology {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
