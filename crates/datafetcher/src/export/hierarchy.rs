use crate::export::matrix::AdjacencyMatrix;
use models::{HierarchyRecord, Palette, course::subject_prefix};
use std::collections::{BTreeSet, HashMap};

/// Maps each subject prefix of `codes` to a colour.
///
/// Prefixes are sorted so the assignment does not depend on crawl order, and
/// get evenly spaced colours from the palette.
pub fn subject_colors<'a>(
    codes: impl IntoIterator<Item = &'a str>,
    palette: Palette,
) -> HashMap<String, String> {
    let prefixes: BTreeSet<&str> = codes.into_iter().map(subject_prefix).collect();
    let colors = palette.evenly_spaced(prefixes.len());

    prefixes
        .into_iter()
        .map(str::to_string)
        .zip(colors)
        .collect()
}

/// Converts the matrix into one hierarchy record per row
///
/// # Arguments
/// * `matrix` - The (usually trimmed) adjacency matrix
/// * `palette` - Colour map for the subject prefixes
///
/// # Returns
/// Records in matrix order; `imports` lists the required codes in column order
pub fn to_hierarchy(matrix: &AdjacencyMatrix, palette: Palette) -> Vec<HierarchyRecord> {
    let colors = subject_colors(matrix.codes.iter().map(String::as_str), palette);

    matrix
        .rows()
        .map(|(code, title, row)| {
            let imports = row
                .iter()
                .zip(&matrix.codes)
                .filter(|(value, _)| **value != 0)
                .map(|(_, import)| import.clone())
                .collect();
            let color = colors
                .get(subject_prefix(code))
                .cloned()
                .unwrap_or_default();

            HierarchyRecord::new(code.to_string(), title.to_string(), color, imports)
        })
        .collect()
}
