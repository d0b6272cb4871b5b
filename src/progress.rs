use std::time::{Duration, Instant};

use spinners_rs::{Spinner, Spinners};

const ESEQ_DELETE_LINE: &str = "\x1b[0J";
const ESEQ_RED: &str = "\x1b[38;5;1m";
const ESEQ_GREEN: &str = "\x1b[38;5;2m";
const ESEQ_RESET: &str = "\x1b[m";

const SPINNER_MS: u64 = 50;

/// Spinner-backed progress line for the transfer loop.
pub struct ProgressView {
    task: String,
    spinner: Spinner,
    previous_update: Instant,
}

impl ProgressView {
    pub fn start(task: &str) -> Self {
        let mut spinner = Spinner::new(Spinners::BouncingBar, task.to_string());
        spinner.set_interval(SPINNER_MS);
        spinner.start();

        Self {
            task: task.to_string(),
            spinner,
            previous_update: Instant::now(),
        }
    }

    /// Updates the line to `[done/total] task - detail`. Calls arriving
    /// faster than the spinner repaints are dropped.
    pub fn step(&mut self, done: usize, total: usize, detail: &str) {
        if self.previous_update.elapsed() <= Duration::from_millis(SPINNER_MS * 2) {
            return;
        }
        self.previous_update = Instant::now();

        self.spinner.set_message(format!(
            "{ESEQ_DELETE_LINE}[{done}/{total}] {} - {detail}",
            self.task
        ));
    }

    pub fn success(mut self, message: &str) {
        self.spinner.stop_with_message(format!(
            "{ESEQ_DELETE_LINE}{ESEQ_GREEN}\u{2713} {} - {message}{ESEQ_RESET}",
            self.task
        ));
        println!();
    }

    pub fn failure(mut self, message: &str) {
        self.spinner.stop_with_message(format!(
            "{ESEQ_DELETE_LINE}{ESEQ_RED}! {} - {message}{ESEQ_RESET}",
            self.task
        ));
        println!();
    }
}
