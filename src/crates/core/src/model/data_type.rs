use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeKind {
    /// Closed set of terms.
    Finite(Vec<String>),
    /// Fixed enumeration declared by the app.
    Enum(Vec<String>),
    /// Terms loaded by the app at startup (e.g. from its own data).
    List(Vec<String>),
    /// Spoken term -> value the intent receives.
    NamedValues(IndexMap<String, Value>),
    FreeText,
    Number,
}

/// A slot type. The id doubles as the type name on the wire.
///
/// Data types are shared between parameters through `Arc`; the registration
/// document lists each `Arc` once, so two structurally equal types built
/// separately are two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    id: String,
    kind: DataTypeKind,
}

impl DataType {
    pub fn new(id: impl Into<String>, kind: DataTypeKind) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            kind,
        })
    }

    pub fn finite<I, S>(id: impl Into<String>, terms: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, DataTypeKind::Finite(collect_terms(terms)))
    }

    pub fn enumeration<I, S>(id: impl Into<String>, terms: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, DataTypeKind::Enum(collect_terms(terms)))
    }

    pub fn list<I, S>(id: impl Into<String>, terms: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, DataTypeKind::List(collect_terms(terms)))
    }

    pub fn named_values<I, S>(id: impl Into<String>, values: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(term, value)| (term.into(), value))
            .collect();
        Self::new(id, DataTypeKind::NamedValues(values))
    }

    pub fn free_text(id: impl Into<String>) -> Arc<Self> {
        Self::new(id, DataTypeKind::FreeText)
    }

    pub fn number(id: impl Into<String>) -> Arc<Self> {
        Self::new(id, DataTypeKind::Number)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &DataTypeKind {
        &self.kind
    }

    /// The enumerable terms, in declaration order, if this type has a
    /// bounded set of legal values.
    pub fn terms_if_finite(&self) -> Option<Vec<&str>> {
        match &self.kind {
            DataTypeKind::Finite(terms) | DataTypeKind::Enum(terms) | DataTypeKind::List(terms) => {
                Some(terms.iter().map(String::as_str).collect())
            }
            DataTypeKind::NamedValues(values) => Some(values.keys().map(String::as_str).collect()),
            DataTypeKind::FreeText | DataTypeKind::Number => None,
        }
    }

    /// Maps a spoken term back to its value. Only named-value types map.
    pub fn value_for_term(&self, term: &str) -> Option<&Value> {
        match &self.kind {
            DataTypeKind::NamedValues(values) => values.get(term),
            _ => None,
        }
    }
}

fn collect_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    terms.into_iter().map(Into::into).collect()
}
