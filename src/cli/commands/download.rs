//! Full download pipeline command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::{catalog_client, load_config, print_report, print_ytdlp_install_instructions, read_batch};
use crate::acquisition::{AcquisitionEngine, YtDlp};
use crate::batch::BatchRunner;
use crate::config::{Overrides, RunSettings};
use crate::resolver::TrackResolver;
use crate::tagger::Id3Tagger;

/// Resolve, download, tag and package the given input
pub fn cmd_download(
    rt: &Runtime,
    config_file: Option<&Path>,
    overrides: Overrides,
    input: &[String],
) -> anyhow::Result<()> {
    let settings = load_config(config_file, overrides)?.validate()?;
    let batch = read_batch(input)?;

    let Some(source) = audio_source(&settings) else {
        print_ytdlp_install_instructions();
        anyhow::bail!("yt-dlp is required for downloading");
    };

    println!(
        "Downloading {} input(s) into {} with {} worker(s)",
        batch.references.len(),
        settings.output_root.display(),
        settings.workers
    );

    rt.block_on(async {
        let cancel = CancellationToken::new();
        watch_ctrl_c(cancel.clone());

        let engine = AcquisitionEngine::new(
            Arc::new(source),
            Arc::new(Id3Tagger::new().context("creating tagger")?),
            settings.output_root.clone(),
        );
        let resolver = TrackResolver::new(catalog_client(settings.catalog.clone())?);

        let mut runner =
            BatchRunner::new(resolver, engine, settings.workers).with_cancellation(cancel);
        if let Some(archive_dir) = &settings.archive_dir {
            runner = runner.with_archive_dir(archive_dir);
        }

        let report = runner.run(&batch).await.context("packaging output")?;
        print_report(&report);
        Ok(())
    })
}

/// The configured yt-dlp, or the first one found on the system
fn audio_source(settings: &RunSettings) -> Option<YtDlp> {
    match &settings.ytdlp_path {
        Some(program) => {
            let source = YtDlp::new(program.clone());
            source.version().map(|_| source)
        }
        None => YtDlp::locate(),
    }
}

/// Cancel the batch on the first Ctrl-C; tracks in flight still finish.
pub(super) fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing tracks in progress");
            cancel.cancel();
        }
    });
}
