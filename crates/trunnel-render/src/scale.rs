//! Scales mapping data onto chart coordinates.
//!
//! The semantics follow the d3 scale family the chart was designed against: linear scales
//! interpolate without clamping, point scales spread a discrete domain evenly across a range
//! (first and last keys on the range ends), and linear ticks use 1/2/5 x 10^k steps.

use crate::{Error, Result};
use indexmap::IndexSet;
use palette::Srgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d0 == d1 {
            return r0 + (r1 - r0) * 0.5;
        }
        let t = (v - d0) / (d1 - d0);
        r0 + t * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Labels for `ticks(count)`, printed with the fixed precision the tick step needs and
    /// thousands grouping.
    pub fn tick_labels(&self, count: usize) -> Vec<String> {
        let step = tick_step(self.domain.0, self.domain.1, count);
        let precision = if step.is_finite() && step != 0.0 {
            (-(step.abs().log10().floor())).max(0.0) as usize
        } else {
            0
        };
        self.ticks(count)
            .into_iter()
            .map(|v| format_grouped_fixed(v, precision))
            .collect()
    }
}

fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (a, b) = if stop < start {
        (stop, start)
    } else {
        (start, stop)
    };
    let step = tick_increment(a, b, count as f64);
    if step < 0.0 { -1.0 / step } else { step }
}

/// Evenly spaced, human-friendly tick values covering `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (a, b) = if reverse { (stop, start) } else { (start, stop) };
    let inc = tick_increment(a, b, count as f64);
    if !inc.is_finite() || inc == 0.0 {
        return Vec::new();
    }

    let mut out: Vec<f64> = if inc > 0.0 {
        let i0 = (a / inc).ceil() as i64;
        let i1 = (b / inc).floor() as i64;
        (i0..=i1).map(|i| i as f64 * inc).collect()
    } else {
        let inv = -inc;
        let i0 = (a * inv).ceil() as i64;
        let i1 = (b * inv).floor() as i64;
        (i0..=i1).map(|i| i as f64 / inv).collect()
    };
    if reverse {
        out.reverse();
    }
    out
}

fn format_grouped_fixed(v: f64, precision: usize) -> String {
    let s = format!("{:.*}", precision, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = s.chars().all(|c| c == '0' || c == '.');
    if v < 0.0 && !is_zero {
        // d3-format uses a true minus sign.
        format!("\u{2212}{grouped}")
    } else {
        grouped
    }
}

/// Maps an ordered set of unique keys onto evenly spaced positions of a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointScale {
    pub domain: IndexSet<String>,
    pub range: (f64, f64),
}

impl PointScale {
    pub fn new(domain: IndexSet<String>, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn step(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.domain.len();
        (r1 - r0) / (n.saturating_sub(1).max(1) as f64)
    }

    /// Position of `key`, or `None` when the key is not part of the domain.
    pub fn apply(&self, key: &str) -> Option<f64> {
        let idx = self.domain.get_index_of(key)?;
        let (r0, r1) = self.range;
        if self.domain.len() == 1 {
            return Some(r0 + (r1 - r0) * 0.5);
        }
        Some(r0 + self.step() * idx as f64)
    }
}

/// Linear index -> colour scale interpolating in sRGB between two colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    start: Srgb<f32>,
    end: Srgb<f32>,
    domain: (f64, f64),
}

impl ColorScale {
    /// `start`/`end` accept CSS colour keywords (`red`, `Yellow`) and `#rgb`/`#rrggbb` hex.
    pub fn new(start: &str, end: &str, domain: (f64, f64)) -> Result<Self> {
        Ok(Self {
            start: parse_color(start)?,
            end: parse_color(end)?,
            domain,
        })
    }

    pub fn apply(&self, v: f64) -> String {
        let (d0, d1) = self.domain;
        let t = if d0 == d1 { 0.5 } else { (v - d0) / (d1 - d0) };
        let t = t as f32;
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        let c: Srgb<u8> = Srgb::new(
            lerp(self.start.red, self.end.red),
            lerp(self.start.green, self.end.green),
            lerp(self.start.blue, self.end.blue),
        )
        .into_format();
        format!("rgb({}, {}, {})", c.red, c.green, c.blue)
    }
}

pub fn parse_color(text: &str) -> Result<Srgb<f32>> {
    let s = text.trim().to_ascii_lowercase();
    let parsed: Option<Srgb<u8>> = if s.starts_with('#') {
        s.parse().ok()
    } else {
        palette::named::from_str(&s)
    };
    parsed
        .map(|c| c.into_format())
        .ok_or_else(|| Error::InvalidColor {
            color: text.to_string(),
        })
}
