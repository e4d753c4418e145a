use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use gloo::net::http::Request;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

pub const DEFAULT_API_BASE: &str = "/api/puzzle";

// Server clips reported times to this window; clip locally so the payload
// always matches what the backend will store.
pub const SOLVE_TIME_MIN: u32 = 1;
pub const SOLVE_TIME_MAX: u32 = 3600;

#[derive(Serialize)]
struct SolvePayload<'a> {
    code: &'a str,
    time: u32,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Serialize)]
struct StarPayload<'a> {
    code: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleStats {
    pub code: String,
    pub stars: u32,
    pub solves: u32,
    pub min_time: u32,
    pub avg_time: f64,
}

pub fn clip_solve_time(seconds: u32) -> u32 {
    seconds.clamp(SOLVE_TIME_MIN, SOLVE_TIME_MAX)
}

/// Fire-and-forget reporting to the solve-tracking service. Every failure is
/// swallowed after a console warning; local solved/starred state never waits
/// on the server.
#[derive(Clone)]
pub struct ReportClient {
    base_url: String,
}

impl ReportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn report_solve(&self, code: &str, elapsed_seconds: u32, user_id: &str) {
        let payload = serde_json::to_string(&SolvePayload {
            code,
            time: clip_solve_time(elapsed_seconds),
            user_id,
        });
        self.post("solve", payload);
    }

    pub fn report_star(&self, code: &str, user_id: &str) {
        let payload = serde_json::to_string(&StarPayload { code, user_id });
        self.post("star", payload);
    }

    #[cfg(target_arch = "wasm32")]
    fn post(&self, endpoint: &str, payload: serde_json::Result<String>) {
        let Ok(body) = payload else {
            return;
        };
        let url = format!("{}/{}", self.base_url, endpoint);
        spawn_local(async move {
            let request = Request::post(&url)
                .header("Content-Type", "application/json")
                .body(body);
            let request = match request {
                Ok(request) => request,
                Err(_) => {
                    gloo::console::warn!("report: bad request", url);
                    return;
                }
            };
            match request.send().await {
                Ok(response) if response.ok() => {}
                Ok(response) => {
                    gloo::console::warn!("report rejected", url, response.status());
                }
                Err(_) => {
                    gloo::console::warn!("report failed", url);
                }
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn post(&self, endpoint: &str, payload: serde_json::Result<String>) {
        let _ = (endpoint, payload);
    }

    #[cfg(target_arch = "wasm32")]
    pub fn fetch_stats(&self, code: &str, on_stats: std::rc::Rc<dyn Fn(PuzzleStats)>) {
        let url = format!("{}/stats/{}", self.base_url, code);
        spawn_local(async move {
            let response = match Request::get(&url).send().await {
                Ok(response) if response.ok() => response,
                Ok(response) => {
                    gloo::console::warn!("stats rejected", url, response.status());
                    return;
                }
                Err(_) => {
                    gloo::console::warn!("stats failed", url);
                    return;
                }
            };
            let Ok(text) = response.text().await else {
                return;
            };
            if let Ok(stats) = serde_json::from_str::<PuzzleStats>(&text) {
                on_stats(stats);
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn fetch_stats(&self, code: &str, on_stats: std::rc::Rc<dyn Fn(PuzzleStats)>) {
        let _ = (code, on_stats);
    }
}

impl Default for ReportClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_time_is_clipped_to_server_window() {
        assert_eq!(clip_solve_time(0), 1);
        assert_eq!(clip_solve_time(90), 90);
        assert_eq!(clip_solve_time(100_000), 3600);
    }

    #[test]
    fn solve_payload_uses_wire_field_names() {
        let json = serde_json::to_string(&SolvePayload {
            code: "2109",
            time: 42,
            user_id: "user_1_abc",
        })
        .unwrap();
        assert_eq!(json, r#"{"code":"2109","time":42,"userId":"user_1_abc"}"#);
    }
}
