use crate::course::Course;
use indexmap::IndexMap;

/// Deduplicated, insertion-ordered mapping from course code to [`Course`]
///
/// Entries are never replaced or removed. The insertion order is the row and
/// column order of the adjacency matrix built from the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    courses: IndexMap<String, Course>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a course unless its code is already registered.
    ///
    /// If the registered entry has undetermined prerequisites and the incoming
    /// course has them, the registered entry is filled from it. A filled entry
    /// is never touched.
    ///
    /// # Returns
    /// `true` if the code was not registered before
    pub fn insert(&mut self, course: Course) -> bool {
        match self.courses.get_mut(&course.code) {
            Some(existing) => {
                if let (Some(required), Some(recommended)) = (course.required, course.recommended)
                {
                    existing.fill(required, recommended);
                }
                false
            }
            None => {
                self.courses.insert(course.code.clone(), course);
                true
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.courses.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }

    /// Position of the code in insertion order
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.courses.get_index_of(code)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.courses.keys().map(String::as_str)
    }
}

impl FromIterator<Course> for Registry {
    fn from_iter<I: IntoIterator<Item = Course>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for course in iter {
            registry.insert(course);
        }
        registry
    }
}
