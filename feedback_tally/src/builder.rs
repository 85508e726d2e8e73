pub use crate::config::*;

/// A builder for counting answers incrementally.
///
/// Unlike [`crate::tally_values`], the list of categories is checked up front.
///
/// ```
/// pub use feedback_tally::builder::TallyBuilder;
/// # use feedback_tally::TallyErrors;
///
/// let mut builder = TallyBuilder::new(feedback_tally::YES_NO)?;
///
/// builder.add_value("yes");
/// builder.add_value(" No ");
/// builder.add_value("maybe");
///
/// let tally = builder.build();
/// assert_eq!(tally.get("Yes"), Some(1));
/// assert_eq!(tally.get("No"), Some(1));
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct TallyBuilder {
    _categories: Vec<String>,
    _normalized: Vec<String>,
    _counts: Vec<u64>,
    _skipped: u64,
}

impl TallyBuilder {
    pub fn new(categories: &[&str]) -> Result<TallyBuilder, TallyErrors> {
        if categories.is_empty() {
            return Err(TallyErrors::EmptyCategories);
        }
        let mut normalized: Vec<String> = Vec::new();
        for c in categories {
            let n = c.trim().to_lowercase();
            if normalized.contains(&n) {
                return Err(TallyErrors::DuplicateCategory(c.to_string()));
            }
            normalized.push(n);
        }
        Ok(TallyBuilder {
            _categories: categories.iter().map(|c| c.to_string()).collect(),
            _normalized: normalized,
            _counts: vec![0; categories.len()],
            _skipped: 0,
        })
    }

    /// Counts one answer. Returns false if the answer matched no category.
    pub fn add_value(&mut self, value: &str) -> bool {
        self.add_weighted(value, 1)
    }

    /// Counts an answer `weight` times.
    pub fn add_weighted(&mut self, value: &str, weight: u64) -> bool {
        let v = value.trim().to_lowercase();
        match self._normalized.iter().position(|n| *n == v) {
            Some(idx) => {
                self._counts[idx] += weight;
                true
            }
            None => {
                self._skipped += weight;
                false
            }
        }
    }

    /// Number of answers that matched no category so far.
    pub fn skipped(&self) -> u64 {
        self._skipped
    }

    pub fn build(self) -> Tally {
        Tally {
            counts: self._categories.into_iter().zip(self._counts).collect(),
        }
    }
}
