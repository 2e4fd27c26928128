//! Filter expressions in the API's query grammar.
//!
//! A filter is a list of operator clauses plus an optional `or` node:
//!
//! - `eq(status,live)`: one field, one value
//! - `in(sku,a,b,c)`: one field, several values
//! - `eq(price.gt,100:price.lt,200)`: one field with sub-fields
//! - `(eq(a,1)|eq(b,2))`: alternatives, always encoded first
//!
//! Clauses are joined with `:` in insertion order.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// The value side of a filter term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    /// A single value: `op(field,value)`.
    Scalar(String),
    /// Several values: `op(field,v1,v2)`.
    List(Vec<String>),
    /// Sub-field values: `op(field.a,1:field.b,2)`.
    Nested(Vec<(String, String)>),
}

impl FilterValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().map(string_form).collect()),
            Value::Object(map) => Self::Nested(
                map.iter()
                    .map(|(key, value)| (key.clone(), string_form(value)))
                    .collect(),
            ),
            other => Self::Scalar(string_form(other)),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Clause {
    Terms {
        operator: String,
        terms: Vec<(String, FilterValue)>,
    },
    Raw(String),
}

/// A filter expression.
///
/// # Example
///
/// ```rust
/// use elasticpath::query::Filter;
///
/// let filter = Filter::new()
///     .eq("status", "live")
///     .eq("slug", "new-slug")
///     .gt("stock", 2);
/// assert_eq!(filter.to_string(), "eq(status,live):eq(slug,new-slug):gt(stock,2)");
///
/// let either = Filter::new()
///     .eq("enabled", "true")
///     .or([
///         Filter::new().eq("category", "hoodies"),
///         Filter::new().eq("category", "t-shirts"),
///     ]);
/// assert_eq!(
///     either.to_string(),
///     "(eq(category,hoodies)|eq(category,t-shirts)):eq(enabled,true)"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    or: Vec<Filter>,
    clauses: Vec<Clause>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field` = `value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("eq", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds `field` > `value`.
    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("gt", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds `field` >= `value`.
    #[must_use]
    pub fn ge(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("ge", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds `field` < `value`.
    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("lt", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds `field` <= `value`.
    #[must_use]
    pub fn le(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("le", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds a pattern match on `field`; `*` is the wildcard.
    #[must_use]
    pub fn like(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.op("like", field, FilterValue::Scalar(value.to_string()))
    }

    /// Adds `field` in `values`.
    #[must_use]
    pub fn in_<I>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.op("in", field, FilterValue::List(values))
    }

    /// Adds sub-field conditions, rendered `op(field.sub,value:...)`.
    #[must_use]
    pub fn nested<I, K, V>(self, operator: impl Into<String>, field: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        self.op(operator, field, FilterValue::Nested(pairs))
    }

    /// Adds a term under an arbitrary operator.
    ///
    /// Terms for an operator that is already present join its clause; a field
    /// that is already present under that operator has its value replaced.
    #[must_use]
    pub fn op(mut self, operator: impl Into<String>, field: impl Into<String>, value: FilterValue) -> Self {
        let operator = operator.into();
        let field = field.into();

        let existing = self.clauses.iter_mut().find_map(|clause| match clause {
            Clause::Terms { operator: op, terms } if *op == operator => Some(terms),
            _ => None,
        });

        match existing {
            Some(terms) => match terms.iter_mut().find(|(name, _)| *name == field) {
                Some(term) => term.1 = value,
                None => terms.push((field, value)),
            },
            None => self.clauses.push(Clause::Terms {
                operator,
                terms: vec![(field, value)],
            }),
        }
        self
    }

    /// Adds alternative groups, joined by `|`.
    #[must_use]
    pub fn or<I: IntoIterator<Item = Self>>(mut self, groups: I) -> Self {
        self.or.extend(groups);
        self
    }

    /// Returns `true` if the filter renders to an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.or.iter().all(Self::is_empty)
    }

    /// Builds a filter from a JSON description such as
    /// `{"eq": {"status": "live"}, "or": [{"gt": {"stock": 2}}]}`.
    ///
    /// Input that does not follow that shape is kept in its string form
    /// instead of being rejected.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            let raw = string_form(value);
            if raw.is_empty() || value.is_null() {
                return Self::new();
            }
            return Self {
                or: Vec::new(),
                clauses: vec![Clause::Raw(raw)],
            };
        };

        let mut filter = Self::new();
        for (operator, value) in map {
            match (operator.as_str(), value) {
                ("or", Value::Array(groups)) => {
                    filter.or.extend(groups.iter().map(Self::from_value));
                }
                (_, Value::Object(fields)) => {
                    for (field, value) in fields {
                        filter = filter.op(operator.as_str(), field.as_str(), FilterValue::from_json(value));
                    }
                }
                (_, other) => filter
                    .clauses
                    .push(Clause::Raw(format!("{operator}({})", string_form(other)))),
            }
        }
        filter
    }

    /// Parses a filter string produced by [`Filter::to_string`].
    ///
    /// Parsing never fails: segments that do not look like `op(field,value)`
    /// are kept verbatim, so re-encoding returns the original text.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut filter = Self::new();

        for part in split_outside(input, ':') {
            if part.is_empty() {
                continue;
            }

            if part.starts_with('(') && part.ends_with(')') && part.len() >= 2 {
                let inner = &part[1..part.len() - 1];
                filter
                    .or
                    .extend(split_outside(inner, '|').into_iter().map(Self::parse));
                continue;
            }

            match parse_clause(part) {
                Some((operator, terms)) => match filter.clauses.last_mut() {
                    Some(Clause::Terms {
                        operator: last,
                        terms: existing,
                    }) if *last == operator => existing.extend(terms),
                    _ => filter.clauses.push(Clause::Terms { operator, terms }),
                },
                None => filter.clauses.push(Clause::Raw(part.to_string())),
            }
        }

        filter
    }

    fn write_body(&self, out: &mut String) {
        let groups: Vec<String> = self
            .or
            .iter()
            .filter(|group| !group.is_empty())
            .map(ToString::to_string)
            .collect();

        let mut parts: Vec<String> = Vec::new();
        if !groups.is_empty() {
            parts.push(format!("({})", groups.join("|")));
        }

        for clause in &self.clauses {
            match clause {
                Clause::Raw(raw) => parts.push(raw.clone()),
                Clause::Terms { operator, terms } => {
                    for (field, value) in terms {
                        parts.push(render_term(operator, field, value));
                    }
                }
            }
        }

        out.push_str(&parts.join(":"));
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_body(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&Value> for Filter {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

fn render_term(operator: &str, field: &str, value: &FilterValue) -> String {
    match value {
        FilterValue::Scalar(value) => format!("{operator}({field},{value})"),
        FilterValue::List(values) => format!("{operator}({field},{})", values.join(",")),
        FilterValue::Nested(pairs) => {
            let inner = pairs
                .iter()
                .map(|(sub, value)| format!("{field}.{sub},{value}"))
                .collect::<Vec<_>>()
                .join(":");
            format!("{operator}({inner})")
        }
    }
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(string_form).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Splits on `sep` where it is outside parentheses and double quotes.
fn split_outside(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            c if c == sep && !quoted && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_clause(part: &str) -> Option<(String, Vec<(String, FilterValue)>)> {
    let open = part.find('(')?;
    if !part.ends_with(')') || open == 0 {
        return None;
    }
    let operator = &part[..open];
    let inner = &part[open + 1..part.len() - 1];

    let pieces = split_outside(inner, ':');
    if pieces.len() == 1 {
        let (field, rest) = inner.split_once(',')?;
        let values = split_outside(rest, ',');
        let value = if values.len() == 1 {
            FilterValue::Scalar(rest.to_string())
        } else {
            FilterValue::List(values.into_iter().map(str::to_string).collect())
        };
        return Some((operator.to_string(), vec![(field.to_string(), value)]));
    }

    let mut field: Option<&str> = None;
    let mut pairs = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let (path, value) = piece.split_once(',')?;
        let (head, sub) = path.split_once('.')?;
        if field.is_some_and(|f| f != head) {
            return None;
        }
        field = Some(head);
        pairs.push((sub.to_string(), value.to_string()));
    }

    Some((
        operator.to_string(),
        vec![(field?.to_string(), FilterValue::Nested(pairs))],
    ))
}
