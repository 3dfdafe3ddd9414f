//! Executes core `HttpRequest`s over the network with ureq.
//!
//! Status codes are never treated as errors here: any response that arrives
//! is handed back as data so the core can interpret it. Only failures below
//! HTTP become a `TransportError`. One attempt per request, no retries.

use std::time::Duration;

use dashboard_core::{HttpMethod, HttpRequest, HttpResponse, TransportError};
use tracing::debug;
use ureq::{Agent, RequestBuilder};

pub fn agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

pub fn execute(agent: &Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let result = match request.method {
        HttpMethod::Get => with_headers(agent.get(&request.path), &request.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&request.path), &request.headers).call(),
        HttpMethod::Post => {
            let builder = with_headers(agent.post(&request.path), &request.headers);
            match &request.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
        HttpMethod::Put => {
            let builder = with_headers(agent.put(&request.path), &request.headers);
            match &request.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };
    let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError::new(format!("reading response body: {e}")))?;

    debug!(method = request.method.as_str(), path = %request.path, status, "response received");
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
