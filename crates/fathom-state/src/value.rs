//! Values held in the data pool
//!
//! Interfaces exchange scalars, text, numeric series (one entry per sea
//! state, time step or device) and coordinate layouts. The store never looks
//! inside a value; it only hands out references to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Easting, northing and depth of one position in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance to another point
    pub fn distance_2d(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A value produced or consumed by an interface
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Numeric series, indexed by position
    Series(Vec<f64>),
    /// Positions, such as device or anchor locations
    Layout(Vec<Point>),
}

impl Value {
    /// Scalar as a float, integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Value::Series(series) => Some(series),
            _ => None,
        }
    }

    pub fn as_layout(&self) -> Option<&[Point]> {
        match self {
            Value::Layout(points) => Some(points),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("-"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Series(series) => match series.as_slice() {
                [] => f.write_str("series(empty)"),
                [first, .., last] => {
                    write!(f, "series({} values, {}..{})", series.len(), first, last)
                }
                [only] => write!(f, "series({})", only),
            },
            Value::Layout(points) => write!(f, "layout({} points)", points.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<f64>> for Value {
    fn from(series: Vec<f64>) -> Self {
        Value::Series(series)
    }
}

impl From<Vec<Point>> for Value {
    fn from(points: Vec<Point>) -> Self {
        Value::Layout(points)
    }
}
