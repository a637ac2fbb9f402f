#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use itertools::Itertools;

/// Errors raised while building or filling in a rubric.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RubricError {
    /// A rubric needs at least one criterion.
    #[error("the rubric does not define any criteria")]
    Empty,
    /// Criterion names double as CSV column headers and rubric file keys.
    #[error("criterion `{0}` is defined more than once")]
    Duplicate(String),
    /// The name cannot be written to the rubric exchange file unambiguously.
    #[error("criterion name `{0}` is not allowed (must be non-empty, no `:`, not start with `#`)")]
    ReservedName(String),
    /// The maximum mark must be a finite, non-negative number.
    #[error("criterion `{name}` has an invalid maximum of {max}")]
    InvalidMax {
        /// name of the offending criterion
        name: String,
        /// the rejected maximum
        max:  f64,
    },
    /// A mark was given for a criterion the rubric does not have.
    #[error("criterion `{0}` is not part of the rubric")]
    UnknownCriterion(String),
}

/// A single row of a rubric: what is being marked, how much it is worth and
/// what was awarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Name of the criterion, eg. `compiles`.
    pub name: String,
    /// Maximum mark available.
    pub max:  f64,
    /// Awarded mark.
    pub mark: f64,
}

impl Criterion {
    /// Creates an unmarked criterion worth `max`.
    pub fn new(name: impl Into<String>, max: f64) -> Self {
        Self {
            name: name.into(),
            max,
            mark: 0.0,
        }
    }
}

/// A structured mark sheet for one student, or the master template every
/// student copy is made from.
///
/// Criteria keep their configured order; names and maxima are fixed once the
/// template is built; only marks, comments and the total change afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rubric {
    /// Directory name of the student this rubric belongs to (empty for the
    /// master template).
    student:  String,
    /// Criteria in insertion order.
    criteria: Vec<Criterion>,
    /// Sum of all marks, set by [`Rubric::add_marks`].
    total:    f64,
    /// Free-text grader remarks.
    comments: String,
}

impl Rubric {
    /// Builds a master rubric from `(name, max)` pairs, validating that the
    /// names can be round-tripped through the rubric file and the ledger.
    pub fn template<I, S>(criteria: I) -> Result<Self, RubricError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let criteria: Vec<Criterion> = criteria
            .into_iter()
            .map(|(name, max)| {
                let name: String = name.into();
                Criterion::new(name.trim(), max)
            })
            .collect();

        if criteria.is_empty() {
            return Err(RubricError::Empty);
        }

        for c in &criteria {
            if c.name.is_empty() || c.name.contains(':') || c.name.starts_with('#') {
                return Err(RubricError::ReservedName(c.name.clone()));
            }
            if !c.max.is_finite() || c.max < 0.0 {
                return Err(RubricError::InvalidMax {
                    name: c.name.clone(),
                    max:  c.max,
                });
            }
        }

        if let Some(dup) = criteria.iter().map(|c| c.name.as_str()).duplicates().next() {
            return Err(RubricError::Duplicate(dup.to_string()));
        }

        Ok(Self {
            criteria,
            ..Self::default()
        })
    }

    /// Produces a fresh rubric for `student` from a template: same criteria
    /// and maxima, zeroed marks, no comments, no total.
    pub fn for_student(template: &Rubric, student: impl Into<String>) -> Self {
        Self {
            student:  student.into(),
            criteria: template
                .criteria
                .iter()
                .map(|c| Criterion::new(c.name.clone(), c.max))
                .collect(),
            total:    0.0,
            comments: String::new(),
        }
    }

    /// Name of the owning student.
    pub fn student(&self) -> &str {
        &self.student
    }

    /// Criteria in order.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Criterion names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.name.as_str())
    }

    /// Looks up the mark awarded for `name`.
    pub fn mark(&self, name: &str) -> Option<f64> {
        self.criteria.iter().find(|c| c.name == name).map(|c| c.mark)
    }

    /// Sets the mark for an existing criterion.
    pub fn set_mark(&mut self, name: &str, mark: f64) -> Result<(), RubricError> {
        let criterion = self
            .criteria
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| RubricError::UnknownCriterion(name.to_string()))?;
        criterion.mark = mark;
        Ok(())
    }

    /// Grader comments.
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Replaces the grader comments.
    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
    }

    /// Total mark. Only meaningful after [`Rubric::add_marks`].
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Overrides the total; used when restoring a rubric from the ledger.
    pub(crate) fn set_total(&mut self, total: f64) {
        self.total = total;
    }

    /// Sums the marks of every criterion into the total and returns it.
    ///
    /// Call once all marks are in. Calling it again recomputes rather than
    /// accumulates.
    pub fn add_marks(&mut self) -> f64 {
        self.total = self.criteria.iter().map(|c| c.mark).sum();
        self.total
    }

    /// Sum of all maxima.
    pub fn out_of(&self) -> f64 {
        self.criteria.iter().map(|c| c.max).sum()
    }

    /// True when both rubrics have the same criteria names in the same order.
    pub fn same_shape(&self, other: &Rubric) -> bool {
        self.names().eq(other.names())
    }
}

impl Display for Rubric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{}", self.student, self.total, self.out_of())
    }
}

/// Finalized rubrics in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeTable {
    /// one finalized rubric per graded student
    rows: Vec<Rubric>,
}

impl GradeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finalized rubric.
    pub fn push(&mut self, rubric: Rubric) {
        self.rows.push(rubric);
    }

    /// Number of graded students.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no student has been graded yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in processing order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rubric> {
        self.rows.iter()
    }

    /// Finds the rubric of `student`.
    pub fn find(&self, student: &str) -> Option<&Rubric> {
        self.rows.iter().find(|r| r.student() == student)
    }
}

impl FromIterator<Rubric> for GradeTable {
    fn from_iter<T: IntoIterator<Item = Rubric>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GradeTable {
    type IntoIter = std::slice::Iter<'a, Rubric>;
    type Item = &'a Rubric;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
