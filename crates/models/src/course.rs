use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::Display as StrumDisplay;

/// Number of leading characters of a course code that name its subject
pub const SUBJECT_PREFIX_LEN: usize = 4;

/// How a predecessor relates to the course that lists it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Classification {
    /// No marker seen yet
    #[default]
    None,
    Required,
    Recommended,
}

/// A catalog course, either fully parsed or a stub discovered by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub code: String,
    pub page_id: Option<String>,
    pub title: String,
    /// `None` until the detail page has been parsed
    pub required: Option<Vec<Course>>,
    /// `None` until the detail page has been parsed
    pub recommended: Option<Vec<Course>>,
}

impl Course {
    /// Creates a course whose prerequisites have not been determined yet
    pub fn new(code: impl Into<String>, page_id: Option<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            page_id,
            title: title.into().trim().to_string(),
            required: None,
            recommended: None,
        }
    }

    /// Whether both predecessor lists have been determined
    pub fn is_filled(&self) -> bool {
        self.required.is_some() && self.recommended.is_some()
    }

    /// Sets each predecessor list that is still undetermined.
    ///
    /// Lists that were already determined are left untouched, so filling twice
    /// is a no-op.
    ///
    /// # Returns
    /// `true` if at least one list was set
    pub fn fill(&mut self, required: Vec<Course>, recommended: Vec<Course>) -> bool {
        let mut changed = false;

        if self.required.is_none() {
            self.required = Some(required);
            changed = true;
        }
        if self.recommended.is_none() {
            self.recommended = Some(recommended);
            changed = true;
        }

        changed
    }

    /// Codes of the required predecessors, empty if undetermined
    pub fn required_codes(&self) -> impl Iterator<Item = &str> {
        self.required.iter().flatten().map(|c| c.code.as_str())
    }

    /// Codes of the recommended predecessors, empty if undetermined
    pub fn recommended_codes(&self) -> impl Iterator<Item = &str> {
        self.recommended.iter().flatten().map(|c| c.code.as_str())
    }

    /// Predecessors of the given classification, empty if undetermined
    pub fn predecessors(&self, classification: Classification) -> &[Course] {
        let list = match classification {
            Classification::Required => &self.required,
            Classification::Recommended => &self.recommended,
            Classification::None => return &[],
        };

        list.as_deref().unwrap_or_default()
    }
}

impl Display for Course {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.code, self.title)
    }
}

/// Returns the subject prefix of a course code, or the whole code if it is shorter
pub fn subject_prefix(code: &str) -> &str {
    code.char_indices()
        .nth(SUBJECT_PREFIX_LEN)
        .map_or(code, |(idx, _)| &code[..idx])
}
