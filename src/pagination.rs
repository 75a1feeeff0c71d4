//! Pagination over JSON:API `links.next` chains.
//!
//! Planning Center paginates collections with offset cursors embedded in
//! the `links.next` URL. The [`Paginator`] offers four access patterns over
//! the same cursor semantics:
//!
//! - [`get_all_pages`](Paginator::get_all_pages): eager, sequential
//! - [`get_all_pages_parallel`](Paginator::get_all_pages_parallel): eager,
//!   bounded concurrency via a semaphore
//! - [`stream_pages`](Paginator::stream_pages): lazy page-at-a-time stream
//! - [`get_page`](Paginator::get_page): a single page by number
//!
//! Loop detection is deliberately weak: a `links.next` whose offset equals
//! the current page's offset stops the walk with a warning, but longer
//! cycles (page 3 pointing at page 5 pointing back at 3) are not detected.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::Stream;
use tokio::sync::Semaphore;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, ParamValue};
use crate::jsonapi::{Document, ResourceObject};

/// Options shared by all pagination access patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageOptions {
    /// Resources requested per page.
    pub per_page: u32,
    /// Upper bound on pages fetched; `None` walks the whole chain.
    pub max_pages: Option<u32>,
    /// In-flight request bound for the parallel variant.
    pub max_concurrency: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            per_page: 25,
            max_pages: None,
            max_concurrency: 5,
        }
    }
}

/// The aggregated result of an eager pagination walk.
#[derive(Clone, Debug, Default)]
pub struct PageSet {
    /// All resources, concatenated in page order.
    pub data: Vec<ResourceObject>,
    /// `meta.total_count` as reported by the server, 0 when absent.
    pub total_count: u64,
    /// Number of pages actually fetched.
    pub pages_fetched: u32,
    /// Wall-clock time for the whole walk.
    pub duration: Duration,
}

/// Walks paginated collections through a borrowed [`HttpClient`].
///
/// # Example
///
/// ```rust,ignore
/// use pco_api::pagination::{PageOptions, Paginator};
///
/// let paginator = Paginator::new(&client);
/// let pages = paginator
///     .get_all_pages("/people/v2/people", Vec::new(), PageOptions::default())
///     .await?;
/// println!("{} people over {} pages", pages.data.len(), pages.pages_fetched);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Paginator<'a> {
    client: &'a HttpClient,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator over the given client.
    #[must_use]
    pub const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Fetches every page of a collection sequentially.
    ///
    /// Equivalent to [`get_all_pages_observed`](Self::get_all_pages_observed)
    /// with a no-op progress callback.
    ///
    /// # Errors
    ///
    /// Propagates the first [`HttpError`] from any page request.
    pub async fn get_all_pages(
        &self,
        endpoint: &str,
        params: Vec<(String, ParamValue)>,
        options: PageOptions,
    ) -> Result<PageSet, HttpError> {
        self.get_all_pages_observed(endpoint, params, options, |_, _| {})
            .await
    }

    /// Fetches every page sequentially, reporting progress after each page.
    ///
    /// `on_progress(pages_fetched, total_count)` fires once per fetched page
    /// and is side-effect only. Empty pages are valid and still counted. The
    /// walk stops when `links.next` is absent, when `max_pages` is reached,
    /// or when the next cursor would revisit the current page (a warning is
    /// logged for the latter).
    ///
    /// # Errors
    ///
    /// Propagates the first [`HttpError`] from any page request.
    pub async fn get_all_pages_observed<P>(
        &self,
        endpoint: &str,
        params: Vec<(String, ParamValue)>,
        options: PageOptions,
        mut on_progress: P,
    ) -> Result<PageSet, HttpError>
    where
        P: FnMut(u32, u64),
    {
        let started = Instant::now();
        let mut set = PageSet::default();

        let mut request = first_request(endpoint, params, options)?;
        let mut current_offset = 0_u64;

        loop {
            let document = self.fetch_document(request).await?;
            set.pages_fetched += 1;
            set.total_count = document.total_count();

            let next = document.next_link().map(str::to_string);
            set.data.extend(document.into_resources());
            on_progress(set.pages_fetched, set.total_count);

            let Some(next_url) = next else { break };

            let next_offset = offset_param(&next_url).unwrap_or(0);
            if next_offset == current_offset {
                tracing::warn!(
                    endpoint,
                    offset = current_offset,
                    pages_fetched = set.pages_fetched,
                    "pagination loop detected, next page equals current page"
                );
                break;
            }
            if options.max_pages.is_some_and(|max| set.pages_fetched >= max) {
                break;
            }

            current_offset = next_offset;
            request = HttpRequest::builder(HttpMethod::Get, next_url).build()?;
        }

        set.duration = started.elapsed();
        Ok(set)
    }

    /// Fetches every page with bounded concurrency.
    ///
    /// Page 1 is fetched sequentially to learn `total_count` and the page
    /// size; pages 2..N then race through a semaphore that caps in-flight
    /// requests at `options.max_concurrency`. Results are reassembled in
    /// page-number order regardless of completion order, so the aggregate
    /// equals the sequential walk's.
    ///
    /// # Errors
    ///
    /// Propagates the first [`HttpError`] in page order.
    pub async fn get_all_pages_parallel(
        &self,
        endpoint: &str,
        params: Vec<(String, ParamValue)>,
        options: PageOptions,
    ) -> Result<PageSet, HttpError> {
        let started = Instant::now();
        let mut set = PageSet::default();

        let first = self
            .fetch_document(first_request(endpoint, params.clone(), options)?)
            .await?;
        set.pages_fetched = 1;
        set.total_count = first.total_count();

        let has_next = first.next_link().is_some();
        let resources = first.into_resources();
        let page_size = resources.len() as u64;
        set.data = resources;

        if !has_next || page_size == 0 || set.total_count <= page_size {
            set.duration = started.elapsed();
            return Ok(set);
        }

        let mut total_pages = (set.total_count + page_size - 1) / page_size;
        if let Some(max) = options.max_pages {
            total_pages = total_pages.min(u64::from(max));
        }
        if total_pages <= 1 {
            set.duration = started.elapsed();
            return Ok(set);
        }

        let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let fetches = (2..=total_pages).map(|page| {
            let semaphore = Arc::clone(&semaphore);
            let params = params.clone();
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("semaphore should never be closed");
                let offset = (page - 1) * page_size;
                let request = page_request(endpoint, params, options, offset)?;
                self.fetch_document(request).await.map(Document::into_resources)
            }
        });

        // join_all preserves input order, which is page-number order.
        for result in join_all(fetches).await {
            set.data.extend(result?);
            set.pages_fetched += 1;
        }

        set.duration = started.elapsed();
        Ok(set)
    }

    /// Fetches a single page by 1-based page number.
    ///
    /// # Errors
    ///
    /// Propagates the [`HttpError`] from the page request.
    pub async fn get_page(
        &self,
        endpoint: &str,
        params: Vec<(String, ParamValue)>,
        page_number: u32,
        options: PageOptions,
    ) -> Result<Document, HttpError> {
        let offset = u64::from(page_number.max(1) - 1) * u64::from(options.per_page);
        let request = page_request(endpoint, params, options, offset)?;
        self.fetch_document(request).await
    }

    /// Returns a lazy stream of page-data vectors.
    ///
    /// Each element is produced by one request at consumption time; dropping
    /// the stream early fetches nothing further. The stream is finite and is
    /// restartable only by calling this method again (a fresh call restarts
    /// from page 1). After an error element the stream ends.
    pub fn stream_pages(
        &self,
        endpoint: &str,
        params: Vec<(String, ParamValue)>,
        options: PageOptions,
    ) -> impl Stream<Item = Result<Vec<ResourceObject>, HttpError>> + 'a {
        enum State {
            First {
                endpoint: String,
                params: Vec<(String, ParamValue)>,
            },
            Next {
                url: String,
            },
            Done,
        }

        struct Cursor {
            state: State,
            offset: u64,
            fetched: u32,
        }

        let paginator = *self;
        let initial = Cursor {
            state: State::First {
                endpoint: endpoint.to_string(),
                params,
            },
            offset: 0,
            fetched: 0,
        };

        futures::stream::unfold(initial, move |mut cursor| async move {
            let request = match std::mem::replace(&mut cursor.state, State::Done) {
                State::Done => return None,
                State::First { endpoint, params } => {
                    match first_request(&endpoint, params, options) {
                        Ok(request) => request,
                        Err(error) => return Some((Err(error), cursor)),
                    }
                }
                State::Next { url } => match HttpRequest::builder(HttpMethod::Get, url).build() {
                    Ok(request) => request,
                    Err(error) => return Some((Err(error.into()), cursor)),
                },
            };

            match paginator.fetch_document(request).await {
                Err(error) => Some((Err(error), cursor)),
                Ok(document) => {
                    cursor.fetched += 1;
                    let next = document.next_link().map(str::to_string);
                    let resources = document.into_resources();

                    if let Some(url) = next {
                        let next_offset = offset_param(&url).unwrap_or(0);
                        let at_max = options.max_pages.is_some_and(|max| cursor.fetched >= max);
                        if next_offset == cursor.offset {
                            tracing::warn!(
                                offset = cursor.offset,
                                pages_fetched = cursor.fetched,
                                "pagination loop detected, next page equals current page"
                            );
                        } else if !at_max {
                            cursor.offset = next_offset;
                            cursor.state = State::Next { url };
                        }
                    }

                    Some((Ok(resources), cursor))
                }
            }
        })
    }

    /// Issues one request and decodes the envelope as a JSON:API document.
    async fn fetch_document(&self, request: HttpRequest) -> Result<Document, HttpError> {
        let response = self.client.request(request).await?;
        let document = serde_json::from_value(response.data)?;
        Ok(document)
    }
}

/// Builds the first-page request, adding `per_page` unless the caller set it.
fn first_request(
    endpoint: &str,
    mut params: Vec<(String, ParamValue)>,
    options: PageOptions,
) -> Result<HttpRequest, HttpError> {
    if !params.iter().any(|(name, _)| name == "per_page") {
        params.push((
            "per_page".to_string(),
            ParamValue::value(options.per_page.to_string()),
        ));
    }
    let mut builder = HttpRequest::builder(HttpMethod::Get, endpoint);
    for (name, value) in params {
        builder = builder.param(name, value);
    }
    Ok(builder.build()?)
}

/// Builds a request for the page starting at the given offset.
fn page_request(
    endpoint: &str,
    mut params: Vec<(String, ParamValue)>,
    options: PageOptions,
    offset: u64,
) -> Result<HttpRequest, HttpError> {
    params.retain(|(name, _)| name != "offset");
    params.push(("offset".to_string(), ParamValue::value(offset.to_string())));
    first_request(endpoint, params, options)
}

/// Extracts the `offset` query parameter from a pagination URL.
fn offset_param(url: &str) -> Option<u64> {
    let query = &url[url.find('?')? + 1..];
    for param in query.split('&') {
        let mut parts = param.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == "offset" {
                return value.parse().ok();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_param_extraction() {
        assert_eq!(
            offset_param("https://api.test/people/v2/people?offset=50&per_page=25"),
            Some(50)
        );
        assert_eq!(
            offset_param("https://api.test/people/v2/people?per_page=25"),
            None
        );
        assert_eq!(offset_param("https://api.test/people/v2/people"), None);
        assert_eq!(offset_param("https://api.test/p?offset=abc"), None);
    }

    #[test]
    fn test_first_request_adds_per_page_once() {
        let options = PageOptions {
            per_page: 50,
            ..PageOptions::default()
        };
        let request = first_request("/people/v2/people", Vec::new(), options).unwrap();
        assert_eq!(
            request.params,
            vec![(
                "per_page".to_string(),
                ParamValue::value("50")
            )]
        );

        let request = first_request(
            "/people/v2/people",
            vec![("per_page".to_string(), ParamValue::value("10"))],
            options,
        )
        .unwrap();
        assert_eq!(request.params.len(), 1);
        assert_eq!(request.params[0].1, ParamValue::value("10"));
    }

    #[test]
    fn test_page_request_replaces_offset() {
        let options = PageOptions::default();
        let request = page_request(
            "/people/v2/people",
            vec![("offset".to_string(), ParamValue::value("0"))],
            options,
            75,
        )
        .unwrap();

        let offsets: Vec<_> = request
            .params
            .iter()
            .filter(|(name, _)| name == "offset")
            .collect();
        assert_eq!(offsets.len(), 1);
        assert_eq!(offsets[0].1, ParamValue::value("75"));
    }

    #[test]
    fn test_default_options() {
        let options = PageOptions::default();
        assert_eq!(options.per_page, 25);
        assert_eq!(options.max_concurrency, 5);
        assert!(options.max_pages.is_none());
    }
}
