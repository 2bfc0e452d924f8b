use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Ongoing publish or clone: yellow braille spinner plus the step message.
fn working() -> ProgressStyle {
    styled("\x1b[33m{spinner}\x1b[0m {wide_msg}").tick_strings(FRAMES)
}

/// Terminal state: green check on success, red cross on failure.
fn done(ok: bool) -> ProgressStyle {
    if ok {
        styled("\x1b[32m✔\x1b[0m {wide_msg}")
    } else {
        styled("\x1b[31m✘\x1b[0m {wide_msg}")
    }
}

fn styled(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Start a ticking spinner on stderr showing `msg`.
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(working());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(msg.into());
    pb
}

/// Finish `pb` with the success or failure style.
pub fn finish(pb: &ProgressBar, ok: bool, msg: impl Into<String>) {
    pb.set_style(done(ok));
    pb.finish_with_message(msg.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_keeps_final_message() {
        let pb = ProgressBar::hidden();
        pb.set_style(working());
        pb.set_message("publishing shop…");
        finish(&pb, false, "publish shop (error: Push failed: rejected)");
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "publish shop (error: Push failed: rejected)");
    }
}
