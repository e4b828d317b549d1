use crate::model::FilterExpr;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Load request coming from a data grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<FilterExpr>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<SortSpec>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Sort as the grid sends it: one descriptor or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    // Must come first: a single `Other(Value)` would swallow arrays too.
    Many(Vec<SortInput>),
    One(SortInput),
}

impl SortSpec {
    pub fn entries(&self) -> Vec<&SortInput> {
        match self {
            SortSpec::Many(items) => items.iter().collect(),
            SortSpec::One(item) => vec![item],
        }
    }
}

impl From<SortInput> for SortSpec {
    fn from(input: SortInput) -> Self {
        SortSpec::One(input)
    }
}

impl From<Vec<SortInput>> for SortSpec {
    fn from(inputs: Vec<SortInput>) -> Self {
        SortSpec::Many(inputs)
    }
}

impl From<&str> for SortSpec {
    fn from(field: &str) -> Self {
        SortSpec::One(SortInput::Field(field.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortInput {
    /// Bare field name, ascending.
    Field(String),
    /// `desc` is read by truthiness: `null`, `false`, `0` and `""` sort ascending.
    Selector {
        selector: String,
        #[serde(default, deserialize_with = "truthy")]
        desc: bool,
    },
    /// Any other shape; compiles to an invalid entry.
    Other(Value),
}

impl SortInput {
    pub fn selector(selector: impl Into<String>, desc: bool) -> Self {
        SortInput::Selector {
            selector: selector.into(),
            desc,
        }
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// What `load` and `byKey` hand back to the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub data: Vec<Value>,
    pub total_count: u64,
}

/// Listing response body. The backend wraps pages in `{data, total, ...}` and
/// returns a bare array when no pagination was requested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    Envelope { data: Vec<Value>, total: u64 },
    Bare(Vec<Value>),
}

impl ListResponse {
    pub fn total(&self) -> u64 {
        match self {
            ListResponse::Envelope { total, .. } => *total,
            ListResponse::Bare(items) => items.len() as u64,
        }
    }

    pub fn into_result(self) -> LoadResult {
        match self {
            ListResponse::Envelope { data, total } => LoadResult {
                data,
                total_count: total,
            },
            ListResponse::Bare(data) => LoadResult {
                total_count: data.len() as u64,
                data,
            },
        }
    }
}
