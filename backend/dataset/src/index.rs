use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// The `index` column, compared numerically when it parses as a number.
///
/// `"7"` and `"7.0"` are the same key; non-numeric indices are compared as
/// text.
#[derive(Debug, Clone)]
pub enum IndexKey {
    Numeric(f64),
    Text(String),
}

impl IndexKey {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => IndexKey::Numeric(if n == 0.0 { 0.0 } else { n }),
            _ => IndexKey::Text(raw.to_string()),
        }
    }

    /// Output ordering for combined files: numbers ascending, then every
    /// non-numeric index in the order it was met (callers use a stable sort).
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Numeric(a), IndexKey::Numeric(b)) => a.total_cmp(b),
            (IndexKey::Numeric(_), IndexKey::Text(_)) => Ordering::Less,
            (IndexKey::Text(_), IndexKey::Numeric(_)) => Ordering::Greater,
            (IndexKey::Text(_), IndexKey::Text(_)) => Ordering::Equal,
        }
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IndexKey::Numeric(a), IndexKey::Numeric(b)) => a.to_bits() == b.to_bits(),
            (IndexKey::Text(a), IndexKey::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            IndexKey::Numeric(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            IndexKey::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}
