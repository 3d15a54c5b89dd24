//! Local HTTP server that answers with canned JSON responses.

#![cfg(test)]

use std::sync::{Arc, Mutex};
use std::thread;

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Responses for one method + path. Served in order; the last one repeats.
pub struct MockRoute {
    method: &'static str,
    path: String,
    responses: Vec<(u16, String)>,
    hits: usize,
}

impl MockRoute {
    pub fn new(method: &'static str, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::sequence(method, path, vec![(status, body.into())])
    }

    pub fn sequence(method: &'static str, path: impl Into<String>, responses: Vec<(u16, String)>) -> Self {
        assert!(!responses.is_empty());
        Self {
            method,
            path: path.into(),
            responses,
            hits: 0,
        }
    }

    fn next_response(&mut self) -> (u16, String) {
        let index = self.hits.min(self.responses.len() - 1);
        self.hits += 1;
        self.responses[index].clone()
    }
}

pub struct MockServer {
    server: Arc<tiny_http::Server>,
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn start(routes: Vec<MockRoute>) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let mut routes = routes;
        thread::spawn(move || {
            for mut request in worker_server.incoming_requests() {
                let url = request.url().to_string();
                let (path, query) = match url.split_once('?') {
                    Some((p, q)) => (p.to_string(), Some(q.to_string())),
                    None => (url.clone(), None),
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let method = request.method().to_string();
                let headers = request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string(), h.value.to_string()))
                    .collect();

                let (status, response_body) = routes
                    .iter_mut()
                    .find(|r| r.method == method && r.path == path)
                    .map_or_else(
                        || (404, r#"{"error":{"code":"NotFound","message":"no route"}}"#.to_string()),
                        MockRoute::next_response,
                    );

                worker_requests.lock().unwrap().push(RecordedRequest {
                    method,
                    path,
                    query,
                    headers,
                    body,
                });

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap();
                let response = tiny_http::Response::from_string(response_body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
