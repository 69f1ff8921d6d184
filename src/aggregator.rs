use crate::error::LyricsError;
use crate::model::{Song, Variant, VariantSet};
use crate::sources::LyricsSource;
use log::{debug, info};
use std::thread;

/// Queries every source for `song`. A source that finds nothing is skipped;
/// the call only fails when no source produced a variant.
pub fn resolve(song: &Song, sources: &[Box<dyn LyricsSource>]) -> Result<VariantSet, LyricsError> {
    let results = sources.iter().map(|source| (source.id(), source.search(song)));
    collect(song, results)
}

/// Same contract as [`resolve`], with every source queried on its own thread.
/// Results are merged in registration order once all threads finish.
pub fn resolve_concurrently(
    song: &Song,
    sources: &[Box<dyn LyricsSource>],
) -> Result<VariantSet, LyricsError> {
    let results: Vec<(&str, Result<Variant, LyricsError>)> = thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| (source.id(), scope.spawn(move || source.search(song))))
            .collect();

        handles
            .into_iter()
            .map(|(id, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(LyricsError::not_found(song)));
                (id, result)
            })
            .collect()
    });
    collect(song, results)
}

fn collect<'a>(
    song: &Song,
    results: impl IntoIterator<Item = (&'a str, Result<Variant, LyricsError>)>,
) -> Result<VariantSet, LyricsError> {
    let mut variants = VariantSet::new();
    for (source_id, result) in results {
        match result {
            Ok(variant) => {
                debug!("{source_id} found {} - {}", variant.artist, variant.title);
                variants.insert(variant);
            }
            Err(err) => info!("{source_id}: {err}"),
        }
    }

    if variants.is_empty() {
        return Err(LyricsError::not_found(song));
    }
    Ok(variants)
}
