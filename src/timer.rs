/// Wall-clock solve timer: accumulated milliseconds plus a running origin.
/// Start and stop are idempotent; the host ticks a display off
/// `elapsed_seconds`, the timer itself never schedules anything.
pub struct SolveTimer {
    accumulated_ms: f64,
    started_at_ms: Option<f64>,
}

impl SolveTimer {
    pub fn new() -> Self {
        Self {
            accumulated_ms: 0.0,
            started_at_ms: None,
        }
    }

    pub fn start(&mut self) {
        if self.started_at_ms.is_some() {
            return;
        }
        self.started_at_ms = Some(now_ms());
    }

    pub fn stop(&mut self) {
        let Some(started_at) = self.started_at_ms.take() else {
            return;
        };
        self.accumulated_ms += (now_ms() - started_at).max(0.0);
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.started_at_ms = None;
    }

    pub fn set_elapsed(&mut self, seconds: u32) {
        let running = self.started_at_ms.is_some();
        self.accumulated_ms = seconds as f64 * 1000.0;
        self.started_at_ms = if running { Some(now_ms()) } else { None };
    }

    pub fn elapsed_seconds(&self) -> u32 {
        let running_ms = self
            .started_at_ms
            .map(|started_at| (now_ms() - started_at).max(0.0))
            .unwrap_or(0.0);
        ((self.accumulated_ms + running_ms) / 1000.0).floor() as u32
    }

    pub fn is_running(&self) -> bool {
        self.started_at_ms.is_some()
    }
}

impl Default for SolveTimer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_elapsed(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        return js_sys::Date::now();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        return std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_millis() as f64)
            .unwrap_or(0.0);
    }
}
