//! Track listing command.

use std::path::Path;

use tokio::runtime::Runtime;

use super::{catalog_client, load_config, read_batch};
use crate::config::Overrides;
use crate::model::Track;
use crate::resolver::TrackResolver;

/// Print every track the input expands to, in download order
pub fn cmd_resolve(
    rt: &Runtime,
    config_file: Option<&Path>,
    overrides: Overrides,
    input: &[String],
) -> anyhow::Result<()> {
    let config = load_config(config_file, overrides)?;
    let catalog = config.catalog_config()?;
    let batch = read_batch(input)?;

    let resolution = rt.block_on(async {
        let resolver = TrackResolver::new(catalog_client(catalog)?);
        anyhow::Ok(resolver.resolve_batch(&batch.references).await)
    })?;

    for (i, track) in resolution.tracks.iter().enumerate() {
        println!("{:>4}. {}", i + 1, describe(track));
    }

    for failure in &resolution.failures {
        println!("✗ {}: {}", failure.reference, failure.error);
    }

    println!(
        "\n{} track(s), {} unresolved input(s), archive key {:?}",
        resolution.tracks.len(),
        resolution.failures.len(),
        batch.archive_key
    );
    Ok(())
}

fn describe(track: &Track) -> String {
    let isrc = if track.isrc.is_empty() {
        "no ISRC".to_string()
    } else {
        track.isrc.to_string()
    };
    format!(
        "{} - {} [{} {}-{:02}] ({})",
        track.artists.join(", "),
        track.title,
        track.album.name,
        track.disc_number,
        track.track_number,
        isrc
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Isrc;
    use crate::test_utils::mock_track;

    #[test]
    fn test_describe_track() {
        let line = describe(&mock_track("Song", 3));
        assert_eq!(
            line,
            "Test Artist, Featured Artist - Song [Test Album 1-03] (USUM71703861)"
        );
    }

    #[test]
    fn test_describe_track_without_isrc() {
        let mut track = mock_track("Song", 3);
        track.isrc = Isrc::empty();
        assert!(describe(&track).ends_with("(no ISRC)"));
    }
}
