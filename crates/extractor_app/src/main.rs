mod config;

use std::sync::Arc;

use anyhow::Context;
use engine_logging::engine_info;
use extractor_engine::{run_worker_loop, ExtractionWorker, MirrorTreeDeriver, SpoolDirQueue};
use tokio_util::sync::CancellationToken;

use crate::config::{config_path, ExtractorConfig};

fn main() -> anyhow::Result<()> {
    let path = config_path();
    let config = ExtractorConfig::load(&path)?;
    engine_logging::initialize(
        config.log_destination,
        config.level_filter()?,
        &config.log_file,
    );
    engine_info!("Starting extraction worker with config {:?}", path);

    let queue = SpoolDirQueue::open(&config.queue_dir)
        .with_context(|| format!("opening extraction queue {:?}", config.queue_dir))?;
    let deriver = MirrorTreeDeriver::new(config.input_root.clone(), config.output_root.clone());
    let cancel = CancellationToken::new();
    let worker = ExtractionWorker::new(Arc::new(queue), Arc::new(deriver), config.worker_settings())
        .with_cancellation(cancel.clone());

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async move {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                engine_info!("Shutdown requested, finishing current stage");
                cancel.cancel();
            }
        });
        run_worker_loop(Arc::new(worker)).await
    });
    Ok(())
}
