use std::cmp::{max, min};
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A location in source text. Lines are 1 based, columns are 0 based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
}

impl Point {
    pub fn new(line: usize, column: usize) -> Point {
        assert!(line >= 1, "Lines are 1 based, got line {line}");
        Point { line, column }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self < other
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A `Span` describes a contiguous region of source text, from `start` to `end`. Both ends are considered part of the
/// span when testing containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Point,
    pub end: Point,
}

impl Span {
    pub fn new(start: Point, end: Point) -> Span {
        assert!(start <= end, "Span ends ({end}) before it starts ({start})");
        Span { start, end }
    }

    /// Shorthand for building a span out of raw coordinates.
    pub fn of(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Span {
        Span::new(Point::new(start_line, start_column), Point::new(end_line, end_column))
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.contains_point(other.start) && self.contains_point(other.end)
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.contains_point(other.start) || self.contains_point(other.end) || other.contains(self)
    }

    /// Given two spans, returns a new span that includes both.
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span { start: min(a.start, b.start), end: max(a.end, b.end) }
    }

    /// Given a nonempty slice of Spans, returns a new Span that includes them all.
    pub fn combine_all(spans: &[Span]) -> Span {
        assert!(!spans.is_empty());

        let mut final_span = spans[0];

        for span in &spans[1..] {
            final_span = Span::combine(&final_span, span);
        }

        final_span
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
