use datafetcher::{
    config::Config,
    fetch::CachedFetcher,
    pipeline::{export, load_or_crawl},
};
use log::error;
use std::process::ExitCode;

/// Builds the prerequisite hierarchy export for the configured subjects
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let result = async {
        let config = Config::from_env()?;
        let fetcher = CachedFetcher::http(&config.base_url, &config.cache_dir);

        let matrix = load_or_crawl(&fetcher, &config).await?;
        export(matrix, &config)
    }
    .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
