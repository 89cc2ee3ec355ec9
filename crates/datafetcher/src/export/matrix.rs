use crate::{
    error::{Error, Result},
    util::create_csv_writer,
};
use csv::ReaderBuilder;
use log::info;
use models::Registry;
use std::path::Path;

/// Leading CSV columns before the per-course columns
const LEADING_HEADERS: [&str; 2] = ["code", "title"];

/// Square 0/1 matrix of required-by relations
///
/// Row `i` and column `i` both stand for `codes[i]`; `cells[i][j]` is 1 iff
/// course `i` requires course `j`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    pub codes: Vec<String>,
    pub titles: Vec<String>,
    pub cells: Vec<Vec<u8>>,
}

impl AdjacencyMatrix {
    /// Builds the matrix in registry order.
    ///
    /// Only required predecessors count; recommended ones and predecessors
    /// that are not registered are left out.
    pub fn from_registry(registry: &Registry) -> Self {
        let n = registry.len();
        let mut cells = vec![vec![0u8; n]; n];

        for (i, course) in registry.iter().enumerate() {
            for code in course.required_codes() {
                if let Some(j) = registry.index_of(code) {
                    cells[i][j] = 1;
                }
            }
        }

        Self {
            codes: registry.codes().map(str::to_string).collect(),
            titles: registry.iter().map(|c| c.title.clone()).collect(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    /// Cell value for the pair of codes, `None` if either code or the cell is absent
    pub fn get(&self, row: &str, col: &str) -> Option<u8> {
        self.cells
            .get(self.index_of(row)?)?
            .get(self.index_of(col)?)
            .copied()
    }

    /// Number of courses required by row `i`; missing cells count as 0
    pub fn out_degree(&self, i: usize) -> usize {
        self.cells
            .get(i)
            .map_or(0, |row| row.iter().filter(|&&v| v != 0).count())
    }

    /// Number of courses requiring column `j`; missing cells count as 0
    pub fn in_degree(&self, j: usize) -> usize {
        self.cells
            .iter()
            .filter(|row| row.get(j).is_some_and(|&v| v != 0))
            .count()
    }

    /// Removes every course that neither requires nor is required by another.
    ///
    /// A course requiring itself counts as connected.
    ///
    /// # Returns
    /// The removed codes, in matrix order
    pub fn trim_isolated(&mut self) -> Vec<String> {
        let keep: Vec<bool> = (0..self.len())
            .map(|i| self.out_degree(i) > 0 || self.in_degree(i) > 0)
            .collect();

        let removed = self
            .codes
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| !**kept)
            .map(|(code, _)| code.clone())
            .collect();

        retain_flagged(&mut self.codes, &keep);
        retain_flagged(&mut self.titles, &keep);
        retain_flagged(&mut self.cells, &keep);
        for row in &mut self.cells {
            retain_flagged(row, &keep);
        }

        removed
    }

    /// Rows of `(code, title, cells)`
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, &[u8])> {
        self.codes
            .iter()
            .zip(&self.titles)
            .zip(&self.cells)
            .map(|((code, title), row)| (code.as_str(), title.as_str(), row.as_slice()))
    }

    /// Persists the matrix as CSV: `code,title,<codes...>` then one row per course
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let headers: Vec<&str> = LEADING_HEADERS
            .iter()
            .copied()
            .chain(self.codes.iter().map(String::as_str))
            .collect();
        let mut writer = create_csv_writer(path, &headers)?;

        for (code, title, row) in self.rows() {
            let mut record = vec![code.to_string(), title.to_string()];
            record.extend(row.iter().map(u8::to_string));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| Error::io(path, e))?;

        info!("Wrote {}x{} matrix to {}", self.len(), self.len(), path.display());
        Ok(())
    }

    /// Loads a matrix written by [`AdjacencyMatrix::write_csv`]
    ///
    /// # Returns
    /// The matrix, or [`Error::Matrix`] if the file is not a square 0/1 table
    /// whose rows match its columns
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

        let headers = reader.headers()?.clone();
        let leading: Vec<&str> = headers.iter().take(LEADING_HEADERS.len()).collect();
        if leading != LEADING_HEADERS {
            return Err(Error::Matrix(format!(
                "expected leading columns {LEADING_HEADERS:?}, found {leading:?}"
            )));
        }
        let columns: Vec<String> = headers
            .iter()
            .skip(LEADING_HEADERS.len())
            .map(str::to_string)
            .collect();

        let mut matrix = AdjacencyMatrix::default();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() + LEADING_HEADERS.len() {
                return Err(Error::Matrix(format!(
                    "row {} has {} fields, expected {}",
                    line + 1,
                    record.len(),
                    columns.len() + LEADING_HEADERS.len()
                )));
            }

            let row = record
                .iter()
                .skip(LEADING_HEADERS.len())
                .map(|cell| match cell.trim() {
                    "0" => Ok(0),
                    "1" => Ok(1),
                    other => Err(Error::Matrix(format!(
                        "row {} has non 0/1 cell {other:?}",
                        line + 1
                    ))),
                })
                .collect::<Result<Vec<u8>>>()?;

            matrix.codes.push(record[0].to_string());
            matrix.titles.push(record[1].to_string());
            matrix.cells.push(row);
        }

        if matrix.codes != columns {
            return Err(Error::Matrix(
                "row codes do not match column codes".to_string(),
            ));
        }

        info!("Loaded {0}x{0} matrix from {1}", matrix.len(), path.display());
        Ok(matrix)
    }
}

/// Keeps the values whose flag at the same position is set
fn retain_flagged<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Course;
    use tempfile::TempDir;

    fn course(code: &str, required: &[&str], recommended: &[&str]) -> Course {
        let stubs = |codes: &[&str]| -> Vec<Course> {
            codes
                .iter()
                .map(|c| Course::new(*c, Some(format!("{c}.htm")), "Stub"))
                .collect()
        };
        let mut course = Course::new(code, Some(format!("{code}.htm")), format!("Title {code}"));
        course.fill(stubs(required), stubs(recommended));
        course
    }

    fn sample() -> Registry {
        [
            course("AAAA1000", &["BBBB1000", "ZZZZ9999"], &["CCCC1000"]),
            course("BBBB1000", &[], &[]),
            course("CCCC1000", &[], &["AAAA1000"]),
            course("DDDD1000", &["DDDD1000"], &[]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_matrix_is_directed() {
        let matrix = AdjacencyMatrix::from_registry(&sample());

        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix.get("AAAA1000", "BBBB1000"), Some(1));
        assert_eq!(matrix.get("BBBB1000", "AAAA1000"), Some(0));
        assert_eq!(matrix.get("AAAA1000", "ZZZZ9999"), None);
    }

    #[test]
    fn test_recommended_relations_are_excluded() {
        let matrix = AdjacencyMatrix::from_registry(&sample());

        assert_eq!(matrix.get("AAAA1000", "CCCC1000"), Some(0));
        assert_eq!(matrix.get("CCCC1000", "AAAA1000"), Some(0));
    }

    #[test]
    fn test_degrees() {
        let matrix = AdjacencyMatrix::from_registry(&sample());

        assert_eq!(matrix.out_degree(0), 1);
        assert_eq!(matrix.in_degree(1), 1);
        assert_eq!(matrix.out_degree(2), 0);
        assert_eq!(matrix.in_degree(2), 0);
        assert_eq!(matrix.out_degree(3), 1);
    }

    #[test]
    fn test_trim_isolated() {
        let mut matrix = AdjacencyMatrix::from_registry(&sample());

        let removed = matrix.trim_isolated();

        assert_eq!(removed, ["CCCC1000"]);
        assert_eq!(matrix.codes, ["AAAA1000", "BBBB1000", "DDDD1000"]);
        assert_eq!(matrix.titles, ["Title AAAA1000", "Title BBBB1000", "Title DDDD1000"]);
        assert_eq!(matrix.cells, vec![vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 1]]);
        assert_eq!(matrix.get("CCCC1000", "AAAA1000"), None);
    }

    #[test]
    fn test_ragged_matrix_does_not_panic() {
        let mut matrix = AdjacencyMatrix {
            codes: vec!["AAAA1000".into(), "BBBB1000".into(), "CCCC1000".into()],
            titles: vec!["A".into(), "B".into(), "C".into()],
            cells: vec![vec![0, 1], vec![0]],
        };

        assert_eq!(matrix.get("AAAA1000", "BBBB1000"), Some(1));
        assert_eq!(matrix.get("BBBB1000", "CCCC1000"), None);
        assert_eq!(matrix.get("CCCC1000", "AAAA1000"), None);
        assert_eq!(matrix.out_degree(2), 0);
        assert_eq!(matrix.in_degree(2), 0);

        assert_eq!(matrix.trim_isolated(), ["CCCC1000"]);
        assert_eq!(matrix.codes, ["AAAA1000", "BBBB1000"]);
    }

    #[test]
    fn test_unfilled_courses_have_no_edges() {
        let registry: Registry = [Course::new("AAAA1000", None, "Stub")].into_iter().collect();
        let matrix = AdjacencyMatrix::from_registry(&registry);

        assert_eq!(matrix.cells, vec![vec![0]]);
    }

    #[test]
    fn test_csv_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output").join("adjacency_matrix.csv");
        let matrix = AdjacencyMatrix::from_registry(&sample());

        matrix.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("code,title,AAAA1000,BBBB1000,CCCC1000,DDDD1000\n"));
        assert!(text.contains("AAAA1000,Title AAAA1000,0,1,0,0\n"));

        assert_eq!(AdjacencyMatrix::read_csv(&path).unwrap(), matrix);
    }

    #[test]
    fn test_malformed_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matrix.csv");

        std::fs::write(&path, "code,title,AAAA1000\nAAAA1000,A,2\n").unwrap();
        assert!(matches!(AdjacencyMatrix::read_csv(&path), Err(Error::Matrix(_))));

        std::fs::write(&path, "code,title,AAAA1000\nAAAA1000,A\n").unwrap();
        assert!(matches!(AdjacencyMatrix::read_csv(&path), Err(Error::Matrix(_))));

        std::fs::write(&path, "code,title,AAAA1000\nBBBB1000,B,0\n").unwrap();
        assert!(matches!(AdjacencyMatrix::read_csv(&path), Err(Error::Matrix(_))));

        std::fs::write(&path, "id,AAAA1000\nAAAA1000,0\n").unwrap();
        assert!(matches!(AdjacencyMatrix::read_csv(&path), Err(Error::Matrix(_))));
    }
}
