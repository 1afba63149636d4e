//! Line scanner for mesh text
//!
//! Turns raw text into a lazy stream of typed records. Face indices are
//! resolved to zero-based, absolute indices before they leave the scanner,
//! so relative (negative) references never reach the assembly stage.

use std::collections::VecDeque;
use std::str::Lines;

use crate::error::{Error, Result};
use crate::model::{Color3, Triangle, Vector2, Vector3, VertexRef};

const MAX_COMPONENTS: usize = 7;
const MIN_COLOR_SQUARED: f32 = 0.001;

/// Group transform annotation kinds
///
/// Annotations are comment lines such as `#@offset 1 0 2`; they attach to
/// the most recent group marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// `#@offset x y z`
    Offset,
    /// `#@rotation x y z`, Euler XYZ degrees
    Rotation,
    /// `#@scale x y z`
    Scale,
}

impl TransformKind {
    /// Annotation keyword, without the `#@` prefix
    pub fn keyword(&self) -> &'static str {
        match self {
            TransformKind::Offset => "offset",
            TransformKind::Rotation => "rotation",
            TransformKind::Scale => "scale",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "offset" => Some(TransformKind::Offset),
            "rotation" => Some(TransformKind::Rotation),
            "scale" => Some(TransformKind::Scale),
            _ => None,
        }
    }
}

/// One typed record scanned from the text
#[derive(Debug, Clone, PartialEq)]
pub enum Record<'a> {
    /// `v x y z`, with the colour of `v x y z r g b` or `v x y z w r g b`
    Position(Vector3, Option<Color3>),
    /// `vn x y z`
    Normal(Vector3),
    /// `vt u v`
    TexCoord(Vector2),
    /// One triangle of an `f` line, with absolute zero-based indices
    Face(Triangle),
    /// `g name`
    GroupMarker(&'a str),
    /// `o name`
    ObjectName(&'a str),
    /// `usemtl name`
    MaterialUse(&'a str),
    /// One path of an `mtllib` line
    MaterialLib(&'a str),
    /// `#@offset`, `#@rotation` or `#@scale`
    GroupTransform(TransformKind, Vector3),
}

/// Lazy record iterator over borrowed mesh text
///
/// A malformed line yields one `Err` item and leaves the scanner usable, so
/// callers can choose between aborting and skipping.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    lines: Lines<'a>,
    line_number: usize,
    positions: u32,
    normals: u32,
    uvs: u32,
    pending: VecDeque<Record<'a>>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: text.lines(),
            line_number: 0,
            positions: 0,
            normals: 0,
            uvs: 0,
            pending: VecDeque::new(),
        }
    }

    /// Rewind to the start of the text
    pub fn restart(&mut self) {
        *self = Self::new(self.text);
    }

    /// 1-based number of the line most recently read
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn error(&self, raw: &str, message: impl Into<String>) -> Error {
        Error::parse(self.line_number, raw.trim(), message)
    }

    fn scan_line(&mut self, raw: &'a str) -> Result<Option<Record<'a>>> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if let Some(annotation) = line.strip_prefix("#@") {
            return self.scan_annotation(raw, annotation);
        }
        if line.starts_with('#') {
            return Ok(None);
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        match keyword {
            "v" => {
                let (v, count) = self.components(raw, rest, 3, 7, "position")?;
                self.positions += 1;
                let color = match count {
                    6 => Some(Color3::new(v[3], v[4], v[5])),
                    7 => Some(Color3::new(v[4], v[5], v[6])),
                    _ => None,
                };
                // near-black colours count as uncoloured
                let color =
                    color.filter(|c| c.r * c.r + c.g * c.g + c.b * c.b > MIN_COLOR_SQUARED);
                Ok(Some(Record::Position(Vector3::new(v[0], v[1], v[2]), color)))
            }
            "vn" => {
                let (v, _) = self.components(raw, rest, 3, 3, "normal")?;
                self.normals += 1;
                Ok(Some(Record::Normal(Vector3::new(v[0], v[1], v[2]))))
            }
            "vt" => {
                let (v, _) = self.components(raw, rest, 1, 3, "texture coordinate")?;
                self.uvs += 1;
                Ok(Some(Record::TexCoord(Vector2::new(v[0], v[1]))))
            }
            "f" => self.scan_face(raw, rest),
            "g" => Ok(Some(Record::GroupMarker(rest))),
            "o" => Ok(Some(Record::ObjectName(rest))),
            "usemtl" => {
                if rest.is_empty() {
                    return Err(self.error(raw, "usemtl requires a material name"));
                }
                Ok(Some(Record::MaterialUse(rest)))
            }
            "mtllib" => {
                let mut paths = rest.split_whitespace();
                let Some(first) = paths.next() else {
                    return Err(self.error(raw, "mtllib requires a library path"));
                };
                self.pending.extend(paths.map(Record::MaterialLib));
                Ok(Some(Record::MaterialLib(first)))
            }
            "s" | "l" | "p" => Ok(None),
            _ => {
                log::debug!(
                    "line {}: ignoring unsupported keyword '{}'",
                    self.line_number,
                    keyword
                );
                Ok(None)
            }
        }
    }

    fn scan_annotation(&mut self, raw: &str, annotation: &str) -> Result<Option<Record<'a>>> {
        let annotation = annotation.trim();
        let (keyword, rest) = annotation
            .split_once(char::is_whitespace)
            .unwrap_or((annotation, ""));
        let Some(kind) = TransformKind::from_keyword(keyword) else {
            return Ok(None);
        };
        let (v, _) = self.components(raw, rest, 3, 3, kind.keyword())?;
        Ok(Some(Record::GroupTransform(
            kind,
            Vector3::new(v[0], v[1], v[2]),
        )))
    }

    /// Parse between `min` and `max` floats, `max` at most seven
    fn components(
        &self,
        raw: &str,
        rest: &str,
        min: usize,
        max: usize,
        what: &str,
    ) -> Result<([f32; MAX_COMPONENTS], usize)> {
        let mut values = [0.0_f32; MAX_COMPONENTS];
        let mut count = 0;
        for token in rest.split_whitespace() {
            if count == max {
                return Err(self.error(
                    raw,
                    format!("{} has more than {} components", what, max),
                ));
            }
            let value: f32 = token.parse().map_err(|_| {
                self.error(raw, format!("invalid {} component '{}'", what, token))
            })?;
            values[count] = value;
            count += 1;
        }
        if count < min {
            return Err(self.error(
                raw,
                format!("{} needs {} components, found {}", what, min, count),
            ));
        }
        Ok((values, count))
    }

    fn scan_face(&mut self, raw: &str, rest: &str) -> Result<Option<Record<'a>>> {
        let corners = rest
            .split_whitespace()
            .map(|token| self.corner(raw, token))
            .collect::<Result<Vec<_>>>()?;
        if corners.len() < 3 {
            return Err(self.error(
                raw,
                format!("face needs at least 3 corners, found {}", corners.len()),
            ));
        }

        // fan around the first corner; polygons are expected to be convex
        let first = corners[0];
        let mut triangles = corners
            .windows(2)
            .skip(1)
            .map(|pair| Record::Face(Triangle::new(first, pair[0], pair[1])));
        let head = triangles.next();
        self.pending.extend(triangles);
        Ok(head)
    }

    /// Parse `v`, `v/t`, `v//n` or `v/t/n`
    fn corner(&self, raw: &str, token: &str) -> Result<VertexRef> {
        let mut parts = token.split('/');
        let position = match parts.next() {
            Some(p) if !p.is_empty() => self.resolve(raw, p, self.positions, "position")?,
            _ => return Err(self.error(raw, format!("corner '{}' has no position", token))),
        };
        let uv = match parts.next() {
            Some(t) if !t.is_empty() => Some(self.resolve(raw, t, self.uvs, "texture coordinate")?),
            _ => None,
        };
        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(self.resolve(raw, n, self.normals, "normal")?),
            _ => None,
        };
        if parts.next().is_some() {
            return Err(self.error(raw, format!("corner '{}' has too many fields", token)));
        }
        Ok(VertexRef {
            position,
            uv,
            normal,
        })
    }

    /// Resolve a 1-based or negative relative index against `count`
    fn resolve(&self, raw: &str, token: &str, count: u32, what: &str) -> Result<u32> {
        let index: i64 = token
            .parse()
            .map_err(|_| self.error(raw, format!("invalid {} index '{}'", what, token)))?;
        let resolved = match index {
            0 => {
                return Err(self.error(
                    raw,
                    format!("{} index 0 is invalid, indices are 1-based", what),
                ));
            }
            i if i > 0 => i - 1,
            i => i64::from(count) + i,
        };
        if resolved < 0 || resolved >= i64::from(count) {
            return Err(self.error(
                raw,
                format!(
                    "{} index {} out of range, {} defined so far",
                    what, index, count
                ),
            ));
        }
        Ok(resolved as u32)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            let raw = self.lines.next()?;
            self.line_number += 1;
            match self.scan_line(raw) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
