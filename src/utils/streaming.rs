//! Async streaming over paginated search results.
//!
//! Pages are fetched one at a time as the stream is polled, so consumers can
//! stop early without requesting the rest of the result set.

use async_stream::stream;
use futures_util::stream::Stream;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::models::{NextPage, Reference, SearchResultPage};

/// A boxed stream of references spanning several pages
pub type ReferenceStream = Pin<Box<dyn Stream<Item = Result<Reference, ClientError>> + Send>>;

enum Cursor {
    Loaded(SearchResultPage),
    Pending(NextPage),
}

/// Stream references starting from an already fetched page.
///
/// The stream ends when a page comes back empty, once `available`
/// references have been yielded, or after `max_pages` pages (the first page
/// counts). A failed page fetch is yielded as an error and ends the stream.
/// With `max_pages` of `Some(0)` the stream is empty.
pub fn reference_stream(first: SearchResultPage, max_pages: Option<usize>) -> ReferenceStream {
    walk(Cursor::Loaded(first), max_pages)
}

/// Stream references starting from a page that has not been fetched yet.
pub fn reference_stream_from(start: NextPage, max_pages: Option<usize>) -> ReferenceStream {
    walk(Cursor::Pending(start), max_pages)
}

fn walk(start: Cursor, max_pages: Option<usize>) -> ReferenceStream {
    if max_pages == Some(0) {
        debug!("Page limit is zero, nothing to fetch");
        return Box::pin(futures_util::stream::empty());
    }

    Box::pin(stream! {
        let mut cursor = start;
        let mut pages = 0usize;
        let mut yielded = 0u64;

        loop {
            let page = match cursor {
                Cursor::Loaded(page) => page,
                Cursor::Pending(next) => match next.fetch().await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(page = next.page(), error = %e, "Error fetching search page");
                        yield Err(e);
                        break;
                    }
                },
            };
            pages += 1;

            let available = page.available();
            let (references, next) = page.into_parts();
            let exhausted = references.is_empty();

            for reference in references {
                yielded += 1;
                yield Ok(reference);
            }

            if exhausted || yielded >= available {
                debug!(pages, yielded, available, "Search results exhausted");
                break;
            }
            if max_pages.is_some_and(|max| pages >= max) {
                debug!(pages, "Page limit reached");
                break;
            }

            cursor = Cursor::Pending(next);
        }
    })
}
