#![forbid(unsafe_code)]

//! The demo's single host screen: a result label under a [`StateLayout`],
//! driven by a fake request that answers after a delay.
//!
//! All state changes happen in [`MainScreen::update`], on the thread that
//! owns the screen. The request, the automatic retry tap and the retry
//! callback all come back as [`Msg`]s through the screen's [`UiLoop`], so
//! dropping the screen cancels whatever was still pending.

use statelayout::{
    Buffer, LoadingRequest, Rect, Rgb, State, StateLayout, TaskHandle, UiLoop, ViewId, Widget,
};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;
use web_time::{Duration, Instant};

pub const SUCCESS_TEXT: &str = "success! result is back";

/// Failure reported by the fake request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network connection failure on attempt {attempt}")]
pub struct ApiError {
    pub attempt: u32,
}

#[derive(Debug)]
pub enum Msg {
    /// Start a request (the submit action, or the retry button).
    Submit,
    /// The fake request answered.
    ApiFinished {
        attempt: u32,
        result: Result<String, ApiError>,
    },
    /// Simulated user tap on the retry button.
    AutoTap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// How long the fake request takes.
    pub delay: Duration,
    /// Number of leading attempts that fail.
    pub fail_attempts: u32,
    /// How long the error overlay stays up before the retry tap.
    pub retry_after: Duration,
    /// Give up after this many attempts.
    pub max_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            fail_attempts: 1,
            retry_after: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

pub struct MainScreen {
    layout: StateLayout,
    ui: UiLoop<Msg>,
    settings: Settings,
    area: Rect,
    result: String,
    attempts: u32,
    in_flight: bool,
    auto_tap: Option<TaskHandle>,
    outcome: Option<Outcome>,
}

impl MainScreen {
    pub fn new(layout: StateLayout, settings: Settings, area: Rect) -> Self {
        Self {
            layout,
            ui: UiLoop::new(),
            settings,
            area,
            result: String::new(),
            attempts: 0,
            in_flight: false,
            auto_tap: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> State {
        self.layout.current_state()
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Queue the submit action.
    pub fn submit(&mut self) {
        self.ui.post(Msg::Submit);
    }

    /// Messages due at `now`.
    pub fn drain(&mut self, now: Instant) -> Vec<Msg> {
        self.ui.drain_due(now)
    }

    /// Block until the next scheduled message is due, a retry arrives, or
    /// `idle` passes with nothing scheduled.
    pub fn wait(&mut self, now: Instant, idle: Duration) {
        let deadline = self.ui.next_deadline().unwrap_or(now + idle);
        self.ui.wait_until(deadline);
    }

    /// Cancel everything still scheduled.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.auto_tap.take() {
            self.ui.cancel(handle);
        }
        self.ui.shutdown();
    }

    pub fn update(&mut self, msg: Msg, now: Instant) {
        match msg {
            Msg::Submit => self.call_api(now),
            Msg::ApiFinished { attempt, result } => self.finish(attempt, result, now),
            Msg::AutoTap => self.tap_retry(),
        }
    }

    /// Draw the screen: the result label, then the visible overlay on top.
    pub fn frame(&self) -> Vec<String> {
        let mut buf = Buffer::new(self.area.right(), self.area.bottom());
        let text_width = u16::try_from(self.result.width()).unwrap_or(u16::MAX);
        let x = self.area.x + self.area.width.saturating_sub(text_width) / 2;
        let y = self.area.y + self.area.height / 2;
        buf.draw_text(x, y, &self.result, Rgb::BLACK, self.area.right());
        self.layout.render(self.area, &mut buf);
        buf.to_lines()
    }

    fn call_api(&mut self, now: Instant) {
        if self.in_flight || self.outcome.is_some() {
            tracing::debug!(attempts = self.attempts, "submit ignored");
            return;
        }
        self.in_flight = true;
        self.attempts += 1;
        let attempt = self.attempts;
        self.result.clear();
        self.layout.show_loading(LoadingRequest::new());

        let result = if attempt <= self.settings.fail_attempts {
            Err(ApiError { attempt })
        } else {
            Ok(SUCCESS_TEXT.to_owned())
        };
        self.ui
            .post_at(now + self.settings.delay, Msg::ApiFinished { attempt, result });
        tracing::info!(
            attempt,
            delay_ms = millis(self.settings.delay),
            "request started"
        );
    }

    fn finish(&mut self, attempt: u32, result: Result<String, ApiError>, now: Instant) {
        self.in_flight = false;
        match result {
            Ok(text) => {
                tracing::info!(attempt, "request succeeded");
                self.result = text;
                self.layout.dismiss_all();
                self.outcome = Some(Outcome::Succeeded { attempts: attempt });
            }
            Err(error) => {
                let retry = self.ui.sender();
                self.layout.show_error_for(
                    &error,
                    Some(Box::new(move || {
                        // A closed inbox means the screen is gone.
                        let _ = retry.send(Msg::Submit);
                    })),
                );
                if attempt >= self.settings.max_attempts {
                    tracing::warn!(attempt, "giving up");
                    self.outcome = Some(Outcome::Exhausted { attempts: attempt });
                    return;
                }
                let deadline = now + self.settings.retry_after;
                self.auto_tap = Some(self.ui.post_at(deadline, Msg::AutoTap));
            }
        }
    }

    fn tap_retry(&mut self) {
        self.auto_tap = None;
        let Some(button) = self.layout.retry_button_id() else {
            return;
        };
        let target = match self.locate(button) {
            Some((x, y)) => {
                tracing::debug!(x, y, "tapping retry button");
                self.layout.hit_test(self.area, x, y).unwrap_or(button)
            }
            None => {
                tracing::debug!("retry button clipped, tapping it directly");
                button
            }
        };
        if !self.layout.tap(target) {
            tracing::warn!("retry tap was not handled");
        }
    }

    /// First cell where `target` is hit.
    fn locate(&self, target: ViewId) -> Option<(u16, u16)> {
        let area = self.area;
        (area.y..area.bottom())
            .flat_map(|y| (area.x..area.right()).map(move |x| (x, y)))
            .find(|&(x, y)| self.layout.hit_test(area, x, y) == Some(target))
    }
}

/// Whole milliseconds, saturating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
