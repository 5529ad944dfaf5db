//! Progress reporting for the per-stage dependency loops.
//!
//! Bars are suppressed when `DEPCMAKE_NO_PROGRESS` is set (the CLI sets it
//! for `--no-progress`) or when stderr is not a terminal, so piped output
//! stays clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Environment variable that disables all progress output.
pub const NO_PROGRESS_ENV: &str = "DEPCMAKE_NO_PROGRESS";

/// Create a progress bar for a stage loop over `len` dependencies.
///
/// The length can grow while fetching, as subdependencies are discovered;
/// callers use [`ProgressBar::inc_length`] for that.
pub fn stage_bar(len: u64, unit_label: &str) -> ProgressBar {
    if std::env::var_os(NO_PROGRESS_ENV).is_some() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::with_template("[{bar:30}] {pos}/{len} {msg}")
            .expect("progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message(unit_label.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_bar_is_hidden() {
        std::env::set_var(NO_PROGRESS_ENV, "1");
        let bar = stage_bar(3, "dependency");
        assert!(bar.is_hidden());
        std::env::remove_var(NO_PROGRESS_ENV);
    }
}
