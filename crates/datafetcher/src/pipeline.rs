use crate::{
    config::Config,
    courses::{
        graph::build_graph,
        subjects::{list_courses, subject_page_id},
    },
    error::Result,
    export::{AdjacencyMatrix, to_hierarchy},
    fetch::Fetch,
    util::write_json,
};
use log::info;
use models::{HierarchyRecord, Registry};

/// Crawls the configured subjects and builds the adjacency matrix
pub async fn crawl<F: Fetch>(fetcher: &F, config: &Config) -> Result<AdjacencyMatrix> {
    let mut seeds = Vec::new();
    for subject in &config.subjects {
        seeds.extend(list_courses(fetcher, &config.markup, &subject_page_id(subject)).await?);
    }

    let registry = build_graph(
        fetcher,
        &config.markup,
        seeds,
        Registry::new(),
        config.recurse,
    )
    .await?;

    Ok(AdjacencyMatrix::from_registry(&registry))
}

/// Loads the persisted matrix, or crawls and persists it if there is none
///
/// An existing matrix file is trusted as is; delete it to crawl again.
pub async fn load_or_crawl<F: Fetch>(fetcher: &F, config: &Config) -> Result<AdjacencyMatrix> {
    if config.matrix_file.is_file() {
        info!("Using existing matrix {}", config.matrix_file.display());
        return AdjacencyMatrix::read_csv(&config.matrix_file);
    }

    let matrix = crawl(fetcher, config).await?;
    matrix.write_csv(&config.matrix_file)?;

    Ok(matrix)
}

/// Trims isolated courses and writes the hierarchy export
///
/// # Returns
/// The records written to the output file
pub fn export(mut matrix: AdjacencyMatrix, config: &Config) -> Result<Vec<HierarchyRecord>> {
    let removed = matrix.trim_isolated();
    info!(
        "Dropped {} unconnected courses, exporting {}",
        removed.len(),
        matrix.len()
    );

    let records = to_hierarchy(&matrix, config.palette);
    write_json(&records, &config.output_file)?;
    info!("Wrote {}", config.output_file.display());

    Ok(records)
}
