use log::{debug, warn};
use reqwest::Url;

use crate::error::{Error, Result};
use crate::logic::FilterCompiler;
use crate::model::{LoadOptions, SearchNode, SortDescriptor, SortInput, SortOrder, SortSpec};

pub const SEARCH_PARAM: &str = "s";
pub const FIELDS_PARAM: &str = "fields";
pub const SORT_PARAM: &str = "sort";
pub const OFFSET_PARAM: &str = "offset";
pub const LIMIT_PARAM: &str = "limit";

// Only the query component of this URL is ever read back.
const QUERY_ONLY_BASE: &str = "http://localhost/";

/// Query in the REST grammar's terms, before string encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQuery {
    pub search: Option<SearchNode>,
    pub fields: Option<Vec<String>>,
    /// `None` entries are sort inputs that could not be compiled.
    pub sort: Option<Vec<Option<SortDescriptor>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl RequestQuery {
    /// Parameters in grammar order: `s`, `fields`, `sort`, `offset`, `limit`.
    /// Absent or empty parts produce no parameter at all.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(search) = self.search.as_ref().filter(|s| s.is_searchable()) {
            pairs.push((SEARCH_PARAM, search.to_string()));
        }

        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            pairs.push((FIELDS_PARAM, fields.join(",")));
        }

        if let Some(sort) = &self.sort {
            for descriptor in sort {
                match descriptor {
                    Some(descriptor) => pairs.push((SORT_PARAM, descriptor.to_param())),
                    None => warn!("Skipping invalid sort entry"),
                }
            }
        }

        if let Some(offset) = self.offset {
            pairs.push((OFFSET_PARAM, offset.to_string()));
        }

        if let Some(limit) = self.limit {
            pairs.push((LIMIT_PARAM, limit.to_string()));
        }

        pairs
    }

    /// Append the parameters to `url` with form-urlencoding. Leaves `url`
    /// untouched when there is nothing to send.
    pub fn append_to(&self, url: &mut Url) {
        let pairs = self.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }

    pub fn to_query_string(&self) -> Result<String> {
        let mut url = Url::parse(QUERY_ONLY_BASE).map_err(|err| Error::Url {
            url: QUERY_ONLY_BASE.to_string(),
            reason: err.to_string(),
        })?;
        self.append_to(&mut url);
        Ok(url.query().unwrap_or_default().to_string())
    }
}

/// Turns grid load options into a REST grammar query.
#[derive(Debug, Clone, Default)]
pub struct QueryAssembler {
    filters: FilterCompiler,
}

impl QueryAssembler {
    pub fn new(filters: FilterCompiler) -> Self {
        Self { filters }
    }

    pub fn filter_compiler(&self) -> &FilterCompiler {
        &self.filters
    }

    pub fn build(&self, options: &LoadOptions) -> Result<RequestQuery> {
        let search = match &options.filter {
            Some(filter) => {
                let node = self.filters.compile(filter)?;
                Some(node).filter(SearchNode::is_searchable)
            }
            None => None,
        };

        let query = RequestQuery {
            search,
            fields: options.select.clone(),
            sort: self.compile_sort(options.sort.as_ref())?,
            offset: options.skip,
            limit: options.take,
        };

        debug!("Assembled query: {:?}", query);
        Ok(query)
    }

    /// Compile load options straight to the encoded query string.
    pub fn compile(&self, options: &LoadOptions) -> Result<String> {
        self.build(options)?.to_query_string()
    }

    pub fn compile_sort(&self, sort: Option<&SortSpec>) -> Result<Option<Vec<Option<SortDescriptor>>>> {
        let sort = match sort {
            Some(sort) => sort,
            None => return Ok(None),
        };

        let mut descriptors = Vec::new();
        for input in sort.entries() {
            let descriptor = match input {
                SortInput::Field(field) => Some(SortDescriptor::asc(field.as_str())),
                SortInput::Selector { selector, desc } => Some(SortDescriptor {
                    field: selector.clone(),
                    order: if *desc { SortOrder::Desc } else { SortOrder::Asc },
                }),
                SortInput::Other(value) => {
                    self.filters
                        .policy()
                        .absorb(Error::InvalidSort(value.to_string()))?;
                    None
                }
            };
            descriptors.push(descriptor);
        }

        Ok(Some(descriptors))
    }
}
