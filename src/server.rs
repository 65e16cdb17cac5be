use anyhow::{Result, anyhow};
use std::io::{self, Read};
use std::time::Instant;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::app_state::AppState;
use crate::callbacks::{Event, handle_event};
use crate::error::EventError;
use crate::rendering::render_page;
use crate::settings::Settings;

// Headroom for the JSON envelope around a base64 upload.
const ENVELOPE_SLACK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json(status: u16, body: String) -> Self {
        Self { status, content_type: "application/json", body }
    }

    fn text(status: u16, body: &str) -> Self {
        Self { status, content_type: "text/plain; charset=utf-8", body: body.to_string() }
    }

    fn error(err: &EventError) -> Self {
        Self::json(err.status_code(), serde_json::json!({ "error": err.to_string() }).to_string())
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_string(self.body).with_status_code(self.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            response = response.with_header(header);
        }
        response
    }
}

/// Answer one request. Pure apart from the session state, so it can be
/// exercised without a socket.
pub fn route(state: &mut AppState, page: &str, method: &Method, url: &str, body: &str, now: Instant) -> Reply {
    let path = url.split('?').next().unwrap_or("/");

    match (path, method) {
        ("/" | "/spectrogram.html", Method::Get) => Reply::html(page.to_string()),
        ("/events", Method::Post) => {
            let result = serde_json::from_str::<Event>(body)
                .map_err(|e| EventError::BadEvent(e.to_string()))
                .and_then(|event| handle_event(state, event, now));
            match result {
                Ok(outputs) => match serde_json::to_string(&outputs) {
                    Ok(json) => Reply::json(200, json),
                    Err(e) => Reply::error(&EventError::Internal(e.into())),
                },
                Err(err) => {
                    log::warn!("Rejected event: {}", err);
                    Reply::error(&err)
                }
            }
        }
        ("/health", Method::Get) => Reply::text(200, "ok"),
        ("/" | "/spectrogram.html" | "/events" | "/health", _) => Reply::text(405, "method not allowed"),
        _ => Reply::text(404, "not found"),
    }
}

/// Serve the viewer until the process is killed. Requests are handled one at a
/// time, each to completion.
pub fn serve(settings: &Settings) -> Result<()> {
    let addr = settings.bind_address();
    let server = Server::http(&addr).map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
    log::info!("Serving on http://{}/spectrogram.html", addr);

    let page = render_page(settings.tick_interval_ms);
    let body_limit = body_limit(settings.max_upload_bytes());
    let mut state = AppState::new(settings);

    for request in server.incoming_requests() {
        handle_request(&mut state, &page, body_limit, request);
    }
    Ok(())
}

/// Largest request body accepted: an upload of `max_upload_bytes` after base64
/// growth, plus the JSON envelope.
fn body_limit(max_upload_bytes: usize) -> usize {
    (max_upload_bytes / 3)
        .saturating_mul(4)
        .saturating_add(ENVELOPE_SLACK_BYTES)
}

/// Read at most `limit` bytes of body. Chunked requests declare no length, so
/// the cap is enforced while reading.
fn read_body<R: Read>(reader: R, limit: usize) -> Result<String, Reply> {
    let mut bytes = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| read_failed(&e))?;

    if bytes.len() > limit {
        return Err(Reply::error(&EventError::UploadTooLarge { size: bytes.len(), limit }));
    }
    String::from_utf8(bytes).map_err(|e| Reply::text(400, &format!("request body is not UTF-8: {}", e)))
}

fn read_failed(e: &io::Error) -> Reply {
    Reply::text(400, &format!("could not read request body: {}", e))
}

fn handle_request(state: &mut AppState, page: &str, body_limit: usize, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let reply = match request.body_length() {
        Some(len) if len > body_limit => Reply::error(&EventError::UploadTooLarge { size: len, limit: body_limit }),
        _ => match read_body(request.as_reader(), body_limit) {
            Ok(body) => route(state, page, &method, &url, &body, Instant::now()),
            Err(reply) => reply,
        },
    };

    log::debug!("{:?} {} -> {}", method, url, reply.status);
    if let Err(e) = request.respond(reply.into_response()) {
        log::warn!("Failed to send response for {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::audio_data::tests::sine_wav_bytes;
    use crate::data::data_uri;

    fn fixture() -> (AppState, String) {
        let settings = Settings::default();
        (AppState::new(&settings), render_page(settings.tick_interval_ms))
    }

    fn post(state: &mut AppState, page: &str, body: &str) -> Reply {
        route(state, page, &Method::Post, "/events", body, Instant::now())
    }

    #[test]
    fn page_is_served_on_both_paths() {
        let (mut state, page) = fixture();
        for url in ["/", "/spectrogram.html", "/spectrogram.html?v=2"] {
            let reply = route(&mut state, &page, &Method::Get, url, "", Instant::now());
            assert_eq!(reply.status, 200, "{url}");
            assert!(reply.body.contains("Audio Spectrogram Viewer"));
            assert!(reply.content_type.starts_with("text/html"));
        }
    }

    #[test]
    fn unknown_paths_and_methods() {
        let (mut state, page) = fixture();
        assert_eq!(route(&mut state, &page, &Method::Get, "/nope", "", Instant::now()).status, 404);
        assert_eq!(route(&mut state, &page, &Method::Post, "/", "", Instant::now()).status, 405);
        assert_eq!(route(&mut state, &page, &Method::Get, "/events", "", Instant::now()).status, 405);
        assert_eq!(route(&mut state, &page, &Method::Get, "/health", "", Instant::now()).body, "ok");
    }

    #[test]
    fn body_limit_saturates_for_huge_settings() {
        assert_eq!(body_limit(3 * 1024), 4 * 1024 + ENVELOPE_SLACK_BYTES);
        let huge = Settings { max_upload_mb: usize::MAX / 1024, ..Settings::default() };
        assert_eq!(body_limit(huge.max_upload_bytes()), usize::MAX);
    }

    #[test]
    fn unsized_body_is_capped_while_reading() {
        let body = vec![b'x'; 100];
        let reply = read_body(std::io::Cursor::new(body.clone()), 64).unwrap_err();
        assert_eq!(reply.status, 413);

        assert_eq!(read_body(std::io::Cursor::new(body), 100).unwrap().len(), 100);
        assert_eq!(read_body(std::io::Cursor::new(vec![0xff, 0xfe]), 64).unwrap_err().status, 400);
    }

    #[test]
    fn malformed_event_is_bad_request() {
        let (mut state, page) = fixture();
        let reply = post(&mut state, &page, r#"{"type":"explode"}"#);
        assert_eq!(reply.status, 400);
        assert!(reply.body.contains("error"));
    }

    #[test]
    fn event_errors_carry_status_and_message() {
        let (mut state, page) = fixture();
        let reply = post(&mut state, &page, r#"{"type":"play","target":"full"}"#);
        assert_eq!(reply.status, 409);
        let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(json["error"], "no audio has been uploaded yet");
    }

    #[test]
    fn upload_then_draw_over_http() {
        let (mut state, page) = fixture();
        let upload = serde_json::json!({
            "type": "upload",
            "contents": data_uri::encode("audio/wav", &sine_wav_bytes(220.0, 6.0, 8000, 1)),
        });
        let reply = post(&mut state, &page, &upload.to_string());
        assert_eq!(reply.status, 200);
        let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(json["spectrogram"]["data"][0]["type"], "heatmap");
        assert_eq!(json["interval_disabled"], true);

        let reply = post(&mut state, &page, r#"{"type":"draw_rect","x0":4.2,"x1":1.7}"#);
        let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(json["start_field"], 1.7);
        assert_eq!(json["end_field"], 4.2);
        assert!(json.get("spectrogram").is_none());
    }

    #[test]
    fn idle_tick_over_http() {
        let (mut state, page) = fixture();
        let reply = post(&mut state, &page, r#"{"type":"tick"}"#);
        assert_eq!(reply, Reply::json(200, r#"{"interval_disabled":true}"#.to_string()));
    }
}
