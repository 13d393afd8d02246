// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama generate endpoint.

use serde::Serialize;
use serde_json::Value;

/// Body of a non-streaming `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub stream: bool,
    pub model: &'a str,
    pub options: GenerateOptions,
}

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

/// Pulls the reply text out of a response body.
///
/// Accepts the generate shape (`response`), a bare `message` string, and the
/// chat shape (`message.content`). Anything else is returned re-serialized so
/// the caller still gets a (degraded) reply.
pub fn extract_reply(body: &Value) -> String {
    let non_empty = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);

    body.get("response")
        .and_then(non_empty)
        .or_else(|| body.get("message").and_then(non_empty))
        .or_else(|| {
            body.get("message")
                .and_then(|m| m.get("content"))
                .and_then(non_empty)
        })
        .unwrap_or_else(|| body.to_string())
}
