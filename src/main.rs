#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod config;
mod error;
mod fetch;
mod output;
mod parse;
mod scrape_menu;
mod tabular;

use std::time::Instant;

use crate::{config::Config, scrape_menu::scrape_menu};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::load()?;
    let start = Instant::now();
    let report = match scrape_menu(&config).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("scrape of {} failed: {e}", config.source_url);
            return Err(e.into());
        }
    };
    log::info!(
        "{} strategy: {} rows extracted, {} omitted, wrote {} in {:?}",
        report.strategy,
        report.extracted(),
        report.omitted().count(),
        config.output_path.display(),
        start.elapsed()
    );
    for row in report.omitted() {
        log::warn!(
            "omitted {} {}: {:?}",
            row.category,
            row.subcategory.as_deref().unwrap_or("-"),
            row.status
        );
    }
    Ok(())
}
