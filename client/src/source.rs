use std::future::Future;

use payloads::ClientError;
use payloads::requests::PageRequest;
use serde::de::DeserializeOwned;

use crate::Backend;
use crate::fetcher::FetcherConfig;

/// Where a [`crate::PaginatedFetcher`] gets its pages from.
///
/// Futures are not required to be `Send`: fetchers live on a single-threaded
/// event loop (the browser, or a current-thread runtime).
pub trait PageSource<T> {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<T>, ClientError>>;
}

/// Pages from `GET {endpoint}?limit=&page=`, items under `data_key`.
pub struct EndpointSource {
    backend: Backend,
    endpoint: String,
    data_key: String,
}

impl EndpointSource {
    pub fn new(backend: Backend, config: &FetcherConfig) -> Self {
        Self {
            backend,
            endpoint: config.endpoint.clone(),
            data_key: config.data_key.clone(),
        }
    }
}

impl<T: DeserializeOwned> PageSource<T> for EndpointSource {
    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> Result<Vec<T>, ClientError> {
        let result = self
            .backend
            .client
            .get_page(&self.endpoint, &self.data_key, &request)
            .await;
        self.backend.session.intercept(result)
    }
}
