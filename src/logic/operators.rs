use std::collections::HashMap;

use crate::error::{Error, Result};

/// Condition and connective tokens of the REST query grammar.
pub mod tokens {
    pub const AND: &str = "$and";
    pub const OR: &str = "$or";
    pub const EQUALS: &str = "$eq";
    pub const NOT_EQUALS: &str = "$ne";
    pub const GREATER_THAN: &str = "$gt";
    pub const LOWER_THAN: &str = "$lt";
    pub const GREATER_THAN_EQUALS: &str = "$gte";
    pub const LOWER_THAN_EQUALS: &str = "$lte";
    pub const STARTS: &str = "$starts";
    pub const ENDS: &str = "$ends";
    pub const CONTAINS: &str = "$cont";
    pub const EXCLUDES: &str = "$excl";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorPair {
    pub positive: String,
    pub negated: String,
    /// False when `negated` only approximates the logical complement.
    pub exact_negation: bool,
}

/// Maps grid operator symbols to their target tokens, both as written and
/// under negation. Immutable once built; extend by building a new table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    entries: HashMap<String, OperatorPair>,
}

impl OperatorTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The grid operator set mapped onto the REST query grammar.
    ///
    /// The grammar has no "does not start/end with", so `startswith` and
    /// `endswith` negate to substring exclusion. That is stricter than the
    /// true complement (`"banana"` does not start with `"an"` but is still
    /// excluded by `$excl "an"`), and is flagged as a lossy negation.
    pub fn nestjsx() -> Self {
        use tokens::*;

        Self::empty()
            .with_operator("and", AND, OR)
            .with_operator("or", OR, AND)
            .with_operator("=", EQUALS, NOT_EQUALS)
            .with_operator("<>", NOT_EQUALS, EQUALS)
            .with_operator(">", GREATER_THAN, LOWER_THAN_EQUALS)
            .with_operator(">=", GREATER_THAN_EQUALS, LOWER_THAN)
            .with_operator("<", LOWER_THAN, GREATER_THAN_EQUALS)
            .with_operator("<=", LOWER_THAN_EQUALS, GREATER_THAN)
            .with_lossy_operator("startswith", STARTS, EXCLUDES)
            .with_lossy_operator("endswith", ENDS, EXCLUDES)
            .with_operator("contains", CONTAINS, EXCLUDES)
            .with_operator("notcontains", EXCLUDES, CONTAINS)
    }

    pub fn with_operator(
        self,
        symbol: impl Into<String>,
        positive: impl Into<String>,
        negated: impl Into<String>,
    ) -> Self {
        self.insert(symbol.into(), positive.into(), negated.into(), true)
    }

    pub fn with_lossy_operator(
        self,
        symbol: impl Into<String>,
        positive: impl Into<String>,
        negated: impl Into<String>,
    ) -> Self {
        self.insert(symbol.into(), positive.into(), negated.into(), false)
    }

    fn insert(mut self, symbol: String, positive: String, negated: String, exact_negation: bool) -> Self {
        self.entries.insert(
            symbol,
            OperatorPair {
                positive,
                negated,
                exact_negation,
            },
        );
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&OperatorPair> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Target token for `symbol`, or for its negation when `negated` is set.
    pub fn resolve(&self, symbol: &str, negated: bool) -> Result<&str> {
        let pair = self
            .get(symbol)
            .ok_or_else(|| Error::UnknownOperator(symbol.to_string()))?;

        Ok(if negated {
            pair.negated.as_str()
        } else {
            pair.positive.as_str()
        })
    }

    /// Whether resolving `symbol` under negation is lossless. Unknown symbols
    /// report `true`; `resolve` rejects them anyway.
    pub fn is_exact_negation(&self, symbol: &str) -> bool {
        self.get(symbol).map_or(true, |pair| pair.exact_negation)
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::nestjsx()
    }
}
