//! Attempt progress for waits, drawn with indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::models::poll::AttemptRecord;

const ATTEMPT_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a bar counting attempts out of `max_attempts`
pub fn create_attempt_progress_bar(max_attempts: u32) -> ProgressBar {
    let pb = ProgressBar::new(u64::from(max_attempts));
    let style = ProgressStyle::with_template(ATTEMPT_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars(PROGRESS_CHARS));
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Observer that moves `pb` to the attempt just made and shows its
/// observation
pub fn attempt_observer(pb: ProgressBar) -> impl Fn(&AttemptRecord) + Send + Sync + 'static {
    move |record| {
        pb.set_position(u64::from(record.attempt));
        pb.set_message(
            record
                .observation
                .clone()
                .unwrap_or_else(|| record.status.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::poll::AttemptStatus;
    use indicatif::ProgressDrawTarget;

    fn record(attempt: u32, observation: Option<&str>) -> AttemptRecord {
        AttemptRecord {
            attempt,
            max_attempts: 6,
            elapsed: Duration::from_secs(3 * u64::from(attempt - 1)),
            status: AttemptStatus::NotYet,
            observation: observation.map(str::to_string),
        }
    }

    #[test]
    fn test_observer_tracks_attempts() {
        let pb = create_attempt_progress_bar(6);
        pb.set_draw_target(ProgressDrawTarget::hidden());
        assert_eq!(pb.length(), Some(6));

        let observer = attempt_observer(pb.clone());
        observer(&record(1, Some("Returned wrong status code: 503")));
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "Returned wrong status code: 503");

        observer(&record(2, None));
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.message(), "not-yet");

        pb.finish_and_clear();
        assert!(pb.is_finished());
    }
}
