//! Wildcard path patterns for document and reference triggers.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  /// `{name}`, matches any single segment.
  Wildcard(String),
}

/// A slash-separated path pattern such as `users/{userId}/posts/{postId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
  segments: Vec<Segment>,
}

impl PathPattern {
  pub fn parse(pattern: &str) -> Self {
    let segments = split_path(pattern)
      .map(|segment| {
        if segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}') {
          Segment::Wildcard(segment[1..segment.len() - 1].to_string())
        } else {
          Segment::Literal(segment.to_string())
        }
      })
      .collect();
    Self { segments }
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  pub fn has_wildcards(&self) -> bool {
    self
      .segments
      .iter()
      .any(|s| matches!(s, Segment::Wildcard(_)))
  }

  /// Match a concrete path segment by segment.
  ///
  /// Segment counts must be equal; wildcard segments accept any non-empty
  /// segment and literal segments must be identical.
  pub fn matches(&self, path: &str) -> bool {
    let actual: Vec<&str> = split_path(path).collect();
    if actual.len() != self.segments.len() {
      return false;
    }

    self
      .segments
      .iter()
      .zip(actual)
      .all(|(expected, actual)| match expected {
        Segment::Literal(literal) => literal == actual,
        Segment::Wildcard(_) => !actual.is_empty(),
      })
  }
}

impl fmt::Display for PathPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.segments.iter().enumerate() {
      if i > 0 {
        f.write_str("/")?;
      }
      match segment {
        Segment::Literal(literal) => f.write_str(literal)?,
        Segment::Wildcard(name) => write!(f, "{{{}}}", name)?,
      }
    }
    Ok(())
  }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|segment| !segment.is_empty())
}
