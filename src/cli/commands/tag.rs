//! In-place tagging command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::download::watch_ctrl_c;
use super::{catalog_client, load_config, print_report, read_batch};
use crate::acquisition::AcquisitionEngine;
use crate::batch::BatchRunner;
use crate::config::Overrides;
use crate::resolver::TrackResolver;
use crate::tagger::Id3Tagger;

/// Resolve the input and tag the matching files under the output directory
pub fn cmd_tag(
    rt: &Runtime,
    config_file: Option<&Path>,
    overrides: Overrides,
    input: &[String],
) -> anyhow::Result<()> {
    let settings = load_config(config_file, overrides)?.validate()?;
    let batch = read_batch(input)?;

    println!(
        "Tagging files for {} input(s) under {}",
        batch.references.len(),
        settings.output_root.display()
    );

    rt.block_on(async {
        let cancel = CancellationToken::new();
        watch_ctrl_c(cancel.clone());

        let engine = AcquisitionEngine::tagging_only(
            Arc::new(Id3Tagger::new().context("creating tagger")?),
            settings.output_root.clone(),
        );
        let resolver = TrackResolver::new(catalog_client(settings.catalog.clone())?);
        let runner = BatchRunner::new(resolver, engine, settings.workers).with_cancellation(cancel);

        let report = runner.retag(&batch).await;
        print_report(&report);
        Ok(())
    })
}
