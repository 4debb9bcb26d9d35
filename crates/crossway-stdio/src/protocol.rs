// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-delimited JSON exchanged with a pipeline process.
//!
//! Request (router to child), one line:
//! `{"id": 7, "prompt": "...", "memory": "..."}`
//!
//! Reply (child to router), one line, exactly one of `output` / `error`:
//! `{"id": 7, "output": "..."}` or `{"id": 7, "error": "..."}`
//!
//! Lines that do not parse as a reply are ignored, so a child may log to stdout.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct StdioRequest<'a> {
    pub id: u64,
    pub prompt: &'a str,
    pub memory: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StdioReply {
    pub id: u64,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Serialize a request as a single newline-terminated line.
pub fn encode_request(request: &StdioRequest<'_>) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}

/// Parse a reply line; `None` for anything that is not a reply.
pub fn decode_reply(line: &str) -> Option<StdioReply> {
    serde_json::from_str(line.trim()).ok()
}
