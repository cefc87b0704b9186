//! Structured PromQL construction
//!
//! Queries are assembled from selectors and label matchers instead of raw
//! string concatenation. Label names are compile-time constants, label values
//! are always rendered as escaped string literals, and range widths must parse
//! as PromQL durations, so caller input can never change the shape of a query.

use std::fmt::{self, Write};
use std::str::FromStr;
use thiserror::Error;

/// Istio request counter, labelled by source and destination app
pub const REQUESTS_METRIC: &str = "istio_requests_total";
/// Cumulative node-to-node latency in seconds
pub const LATENCY_SUM_METRIC: &str = "node_latency_sum";
/// Number of node-to-node latency observations
pub const LATENCY_COUNT_METRIC: &str = "node_latency_count";

/// Lookback used when the caller does not pass a range width
pub const DEFAULT_RANGE_WIDTH: &str = "5m";

const UNKNOWN_APP: &str = "unknown";
const MILLIS_PER_SECOND: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid range width {0:?}: expected a duration such as 30s, 5m or 1h30m")]
    InvalidRangeWidth(String),
}

/// Lookback window of a range vector selector, e.g. `5m` or `1h30m`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWidth(String);

impl RangeWidth {
    /// Parse an optional request parameter, falling back to
    /// [`DEFAULT_RANGE_WIDTH`] when it is absent or empty
    pub fn from_param(param: Option<&str>) -> Result<Self, QueryError> {
        match param.filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RangeWidth {
    fn default() -> Self {
        Self(DEFAULT_RANGE_WIDTH.to_string())
    }
}

impl FromStr for RangeWidth {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_duration(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(QueryError::InvalidRangeWidth(s.to_string()))
        }
    }
}

impl fmt::Display for RangeWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One or more `<digits><unit>` groups. Unit ordering is left to the backend.
fn is_duration(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return false;
        }

        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_lowercase() {
            i += 1;
        }
        if !matches!(&s[unit_start..i], "ms" | "s" | "m" | "h" | "d" | "w" | "y") {
            return false;
        }
    }

    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchOp {
    Equal,
    NotEqual,
}

impl MatchOp {
    fn as_str(self) -> &'static str {
        match self {
            MatchOp::Equal => "=",
            MatchOp::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone)]
struct LabelMatcher {
    name: &'static str,
    op: MatchOp,
    value: String,
}

/// Instant vector selector: a metric name plus label matchers
#[derive(Debug, Clone)]
pub struct Selector {
    metric: &'static str,
    matchers: Vec<LabelMatcher>,
}

impl Selector {
    pub fn new(metric: &'static str) -> Self {
        Self {
            metric,
            matchers: Vec::new(),
        }
    }

    /// Add a `label="value"` matcher
    pub fn eq(self, label: &'static str, value: impl Into<String>) -> Self {
        self.matcher(label, MatchOp::Equal, value.into())
    }

    /// Add a `label!="value"` matcher
    pub fn ne(self, label: &'static str, value: impl Into<String>) -> Self {
        self.matcher(label, MatchOp::NotEqual, value.into())
    }

    fn matcher(mut self, name: &'static str, op: MatchOp, value: String) -> Self {
        self.matchers.push(LabelMatcher { name, op, value });
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric)?;
        if self.matchers.is_empty() {
            return Ok(());
        }

        f.write_char('{')?;
        for (i, matcher) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(matcher.name)?;
            f.write_str(matcher.op.as_str())?;
            write_string_literal(f, &matcher.value)?;
        }
        f.write_char('}')
    }
}

/// Double-quoted PromQL string literal with every breakout character escaped
fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// A complete query expression, only obtainable from the builders below
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromQuery(String);

impl PromQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn rate(selector: &Selector, range: &RangeWidth) -> String {
    format!("rate({}[{}])", selector, range)
}

fn in_group(selector: Selector, group: Option<&str>) -> Selector {
    match group.filter(|g| !g.is_empty()) {
        Some(group) => selector.eq("app_group", group),
        None => selector,
    }
}

fn known_apps_only(selector: Selector) -> Selector {
    selector
        .ne("source_app", UNKNOWN_APP)
        .ne("destination_app", UNKNOWN_APP)
}

/// Request rate of every series touching `app`, on either side of the call
pub fn requests_between_pair(group: Option<&str>, app: &str, range: &RangeWidth) -> PromQuery {
    let selector = known_apps_only(in_group(Selector::new(REQUESTS_METRIC), group).eq("app", app));
    PromQuery(rate(&selector, range))
}

/// Request rate of every app pair in the group. Only source-side reports are
/// read so each call is counted once.
pub fn requests_within_group(group: Option<&str>, range: &RangeWidth) -> PromQuery {
    let selector = known_apps_only(in_group(
        Selector::new(REQUESTS_METRIC).eq("reporter", "source"),
        group,
    ));
    PromQuery(rate(&selector, range))
}

/// Mean latency in milliseconds from `node` to each destination node
pub fn latency_from_node(node: &str, range: &RangeWidth) -> PromQuery {
    latency_ratio(Some(node), range)
}

/// Mean latency in milliseconds for every origin/destination node pair
pub fn latency_all_nodes(range: &RangeWidth) -> PromQuery {
    latency_ratio(None, range)
}

fn latency_ratio(origin: Option<&str>, range: &RangeWidth) -> PromQuery {
    let scoped = |metric: &'static str| match origin {
        Some(node) => Selector::new(metric).eq("origin_node", node),
        None => Selector::new(metric),
    };

    PromQuery(format!(
        "({} / {}) * {}",
        rate(&scoped(LATENCY_SUM_METRIC), range),
        rate(&scoped(LATENCY_COUNT_METRIC), range),
        MILLIS_PER_SECOND
    ))
}
