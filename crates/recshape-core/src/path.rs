//! Property paths
//!
//! A path addresses a single value inside nested records and arrays. It is
//! written either as text (`a.b[0].c`, `a["key.with.dots"]`) or as a sequence
//! of [`Segment`]s. Text without `.` or `[` is taken as one key verbatim, so
//! a key that itself contains a dot must be passed as a one-element sequence.
//!
//! Resolution never fails: an unparsable path or a root that cannot carry
//! properties makes [`get`] return nothing, [`set`] do nothing and [`has`]
//! answer `false`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::value::{Record, UNDEFINED, Value};

static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"[^.\[\]]+|\[(?:(-?\d+(?:\.\d+)?)|"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')\]"#,
    )
    .expect("Invalid path segment pattern")
});

static ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(.)").expect("Invalid escape pattern"));

/// Largest array index `set` will write; higher indices are rejected
const MAX_ARRAY_INDEX: usize = (u32::MAX - 1) as usize;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Property name. Canonical numeric names also index arrays.
    Key(String),
    /// Array index. Also addresses the record key of the same digits.
    Index(usize),
}

impl Segment {
    /// Record key addressed by this segment
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// Array index addressed by this segment, if any
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(key) => key
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == *key),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A normalized, non-empty sequence of segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Build a path from segments. Fails on an empty sequence.
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::InvalidPath {
                path: String::new(),
                message: "path has no segments".to_string(),
            });
        }
        Ok(Self(segments))
    }

    /// Parse path text.
    ///
    /// Recognizes bare names, bracketed indices (`[0]`) and bracketed quoted
    /// keys (`['a.b']`, `["a.b"]`) with backslash escapes.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let path = Path::parse("a.b[0].c")?;
    /// assert_eq!(path.segments().len(), 4);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidPath {
                path: String::new(),
                message: "path is empty".to_string(),
            });
        }

        if !text.contains(['.', '[']) {
            return Ok(Self(vec![Segment::Key(text.to_string())]));
        }

        let mut segments = Vec::new();
        if text.starts_with('.') {
            segments.push(Segment::Key(String::new()));
        }
        for caps in SEGMENT.captures_iter(text) {
            let segment = if let Some(number) = caps.get(1) {
                match number.as_str().parse::<usize>() {
                    Ok(index) => Segment::Index(index),
                    Err(_) => Segment::Key(number.as_str().to_string()),
                }
            } else if let Some(quoted) = caps.get(2).or_else(|| caps.get(3)) {
                Segment::Key(ESCAPE.replace_all(quoted.as_str(), "$1").into_owned())
            } else {
                Segment::Key(caps[0].to_string())
            };
            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(Error::InvalidPath {
                path: text.to_string(),
                message: "no segments found".to_string(),
            });
        }
        Ok(Self(segments))
    }

    /// The normalized segments
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if key.contains(['.', '[', ']']) => {
                    write!(f, "[\"{}\"]", key.replace('\\', "\\\\").replace('"', "\\\""))?
                }
                Segment::Key(key) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSegment {
    Index(usize),
    Key(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPath {
    Text(String),
    Segments(Vec<RawSegment>),
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let path = match RawPath::deserialize(deserializer)? {
            RawPath::Text(text) => Path::parse(&text),
            RawPath::Segments(raw) => Path::new(
                raw.into_iter()
                    .map(|segment| match segment {
                        RawSegment::Index(index) => Segment::Index(index),
                        RawSegment::Key(key) => Segment::Key(key),
                    })
                    .collect(),
            ),
        };
        path.map_err(serde::de::Error::custom)
    }
}

/// Anything that can be normalized into a [`Path`].
///
/// `None` means the path is invalid; operations then fall back silently.
pub trait IntoPath {
    /// Normalize into a path
    fn into_path(self) -> Option<Path>;
}

impl IntoPath for Path {
    fn into_path(self) -> Option<Path> {
        Some(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Option<Path> {
        Some(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Option<Path> {
        match Path::parse(self) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::trace!(error = %err, "ignoring invalid path");
                None
            }
        }
    }
}

impl IntoPath for String {
    fn into_path(self) -> Option<Path> {
        self.as_str().into_path()
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Option<Path> {
        self.as_str().into_path()
    }
}

impl IntoPath for usize {
    fn into_path(self) -> Option<Path> {
        Some(Path(vec![Segment::Index(self)]))
    }
}

impl IntoPath for Segment {
    fn into_path(self) -> Option<Path> {
        Some(Path(vec![self]))
    }
}

impl IntoPath for Vec<Segment> {
    fn into_path(self) -> Option<Path> {
        Path::new(self).ok()
    }
}

impl IntoPath for &[Segment] {
    fn into_path(self) -> Option<Path> {
        Path::new(self.to_vec()).ok()
    }
}

impl<const N: usize> IntoPath for [Segment; N] {
    fn into_path(self) -> Option<Path> {
        Path::new(self.into()).ok()
    }
}

impl<T: IntoPath> IntoPath for Option<T> {
    fn into_path(self) -> Option<Path> {
        self.and_then(IntoPath::into_path)
    }
}

/// Single-segment access on something that carries properties
pub trait Resolve {
    /// Value visible at `segment`, own or inherited
    fn lookup(&self, segment: &Segment) -> Option<&Value>;

    /// Mutable access to a value at `segment`
    fn lookup_mut(&mut self, segment: &Segment) -> Option<&mut Value>;

    /// Write `value` at `segment`. Returns whether the write happened.
    fn assign(&mut self, segment: &Segment, value: Value) -> bool;

    /// Whether a property exists at `segment`
    fn contains(&self, segment: &Segment) -> bool {
        self.lookup(segment).is_some()
    }
}

impl Resolve for Record {
    fn lookup(&self, segment: &Segment) -> Option<&Value> {
        self.get(segment.as_key().as_ref())
    }

    fn lookup_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        self.get_mut(segment.as_key().as_ref())
    }

    fn assign(&mut self, segment: &Segment, value: Value) -> bool {
        self.insert(segment.as_key().into_owned(), value);
        true
    }
}

impl Resolve for Value {
    fn lookup(&self, segment: &Segment) -> Option<&Value> {
        match self {
            Value::Record(record) => record.lookup(segment),
            Value::Array(items) => segment.as_index().and_then(|index| items.get(index)),
            _ => None,
        }
    }

    fn lookup_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        match self {
            Value::Record(record) => record.lookup_mut(segment),
            Value::Array(items) => segment.as_index().and_then(|index| items.get_mut(index)),
            _ => None,
        }
    }

    fn assign(&mut self, segment: &Segment, value: Value) -> bool {
        match self {
            Value::Record(record) => record.assign(segment, value),
            Value::Array(items) => {
                let Some(index) = segment.as_index().filter(|index| *index <= MAX_ARRAY_INDEX)
                else {
                    return false;
                };
                if index >= items.len() {
                    let Some(len) = index.checked_add(1) else {
                        return false;
                    };
                    items.resize(len, Value::Undefined);
                }
                items[index] = value;
                true
            }
            _ => false,
        }
    }

    fn contains(&self, segment: &Segment) -> bool {
        match self {
            Value::Record(record) => record.contains(segment),
            Value::Array(items) => segment
                .as_index()
                .and_then(|index| items.get(index))
                .is_some_and(|item| !item.is_undefined()),
            _ => false,
        }
    }
}

fn walk<'a, R: Resolve + ?Sized>(root: &'a R, segments: &[Segment]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.lookup(first)?;
    for segment in rest {
        current = current.lookup(segment)?;
    }
    Some(current)
}

/// Read the value at `path`.
///
/// Returns `None` when the path is invalid, cannot be walked to the end, or
/// ends on an undefined value.
///
/// # Example
///
/// ```rust,ignore
/// let root = Value::from(json!({"testA": {"testB": [1]}}));
/// assert_eq!(get(&root, "testA.testB[0]"), Some(&Value::from(1)));
/// ```
pub fn get<'a, R: Resolve + ?Sized>(root: &'a R, path: impl IntoPath) -> Option<&'a Value> {
    let path = path.into_path()?;
    walk(root, path.segments()).filter(|value| !value.is_undefined())
}

/// Read the value at `path`, or `default` when [`get`] finds nothing
pub fn get_or<'a, R: Resolve + ?Sized>(
    root: &'a R,
    path: impl IntoPath,
    default: &'a Value,
) -> &'a Value {
    get(root, path).unwrap_or(default)
}

/// Write `value` at `path`.
///
/// Every container before the last segment must already exist; nothing is
/// created along the way. Writing past the end of an array grows it and
/// leaves the gap as holes. Returns whether the value was written.
pub fn set<R: Resolve + ?Sized>(root: &mut R, path: impl IntoPath, value: Value) -> bool {
    let Some(path) = path.into_path() else {
        return false;
    };
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };
    let Some((first, rest)) = parents.split_first() else {
        return root.assign(last, value);
    };

    let Some(mut current) = root.lookup_mut(first) else {
        tracing::trace!(%path, "set target parent missing");
        return false;
    };
    for segment in rest {
        let Some(next) = current.lookup_mut(segment) else {
            tracing::trace!(%path, "set target parent missing");
            return false;
        };
        current = next;
    }
    current.assign(last, value)
}

/// Whether `path` exists on `root`
pub fn has<R: Resolve + ?Sized>(root: &R, path: impl IntoPath) -> bool {
    let Some(path) = path.into_path() else {
        return false;
    };
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };
    if parents.is_empty() {
        return root.contains(last);
    }
    walk(root, parents).is_some_and(|parent| parent.contains(last))
}

/// Whether `path` exists and its value matches `expected`.
///
/// A [`Value::Function`] is called with the resolved value; any other
/// expected value is compared with strict equality.
pub fn has_value<R: Resolve + ?Sized>(root: &R, path: impl IntoPath, expected: &Value) -> bool {
    let Some(path) = path.into_path() else {
        return false;
    };
    if !has(root, &path) {
        return false;
    }
    let resolved = get(root, &path).unwrap_or(&UNDEFINED);
    match expected {
        Value::Function(predicate) => predicate.call(resolved),
        other => resolved == other,
    }
}
