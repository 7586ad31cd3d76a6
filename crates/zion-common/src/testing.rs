//! In-memory [`HttpTransport`] for tests.
//!
//! Routes are matched on the full request URL (query string included). The
//! size cap is enforced the same way [`ReqwestTransport`](crate::http::ReqwestTransport)
//! enforces it, so cap tests behave identically against the mock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::http::{GetRequest, HttpResponse, HttpTransport, TransportError};

#[derive(Debug)]
enum Route {
    Respond(HttpResponse),
    Fail(String),
    Timeout,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<GetRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 200 and `body`.
    pub fn ok(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.respond(url, 200, "OK", body)
    }

    pub fn respond(self, url: &str, status: u16, status_text: &str, body: impl Into<Vec<u8>>) -> Self {
        let resp = HttpResponse { status, status_text: status_text.to_owned(), body: body.into() };
        self.lock_routes().insert(url.to_owned(), Route::Respond(resp));
        self
    }

    /// Fail `url` with [`TransportError::Other`].
    pub fn fail(self, url: &str, message: &str) -> Self {
        self.lock_routes().insert(url.to_owned(), Route::Fail(message.to_owned()));
        self
    }

    pub fn time_out(self, url: &str) -> Self {
        self.lock_routes().insert(url.to_owned(), Route::Timeout);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<GetRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, HashMap<String, Route>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: GetRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request.clone());

        let routes = self.lock_routes();
        match routes.get(request.url.as_str()) {
            Some(Route::Respond(resp)) => match request.max_bytes {
                Some(limit) if resp.body.len() > limit => Err(TransportError::BodyTooLarge { limit }),
                _ => Ok(resp.clone()),
            },
            Some(Route::Fail(message)) => Err(TransportError::Other(message.clone())),
            Some(Route::Timeout) => Err(TransportError::Timeout),
            None => Ok(HttpResponse {
                status: 404,
                status_text: "Not Found".to_owned(),
                body: Vec::new(),
            }),
        }
    }
}
