//! Response rendering for the login flow

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::IgnoredAny;

use crate::error::{OAuthError, Result};

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized!";

/// Re-indent a JSON document with one tab per nesting level.
///
/// The input is only validated, never rebuilt: every token (string escapes,
/// number text, duplicate keys) is copied as received and only whitespace
/// between tokens changes.
pub fn indent_json(raw: &str) -> Result<String> {
    serde_json::from_str::<IgnoredAny>(raw).map_err(OAuthError::InvalidProfileJson)?;

    let mut out = String::with_capacity(raw.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // container just opened; its newline waits until we know it is not empty
    let mut opened = false;

    for ch in raw.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            continue;
        }

        if opened && ch != '}' && ch != ']' {
            push_newline(&mut out, depth);
        }

        match ch {
            '{' | '[' => {
                out.push(ch);
                depth += 1;
                opened = true;
                continue;
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if !opened {
                    push_newline(&mut out, depth);
                }
                out.push(ch);
            }
            ',' => {
                out.push(ch);
                push_newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            '"' => {
                out.push(ch);
                in_string = true;
            }
            _ => out.push(ch),
        }
        opened = false;
    }

    Ok(out)
}

fn push_newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Plain-text reply for visitors without a profile
pub fn unauthorized() -> Response {
    (StatusCode::OK, UNAUTHORIZED_MESSAGE).into_response()
}

/// Render the profile, or the unauthorized message when there is none.
pub fn render_profile(profile: &str) -> Result<Response> {
    if profile.is_empty() {
        return Ok(unauthorized());
    }

    let pretty = indent_json(profile)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        pretty,
    )
        .into_response())
}
