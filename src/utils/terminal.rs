use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn info(msg: &str) {
    eprintln!("ℹ️  {}", msg);
}

pub fn success(msg: &str) {
    println!("✅ {}", msg);
}

pub fn warn(msg: &str) {
    eprintln!("⚠️  {}", msg);
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Final interactive pause before the process exits. Quietly skipped when
/// stdout is not a terminal.
pub fn pause_for_exit() {
    println!("Press any key to close...");
    let _ = Term::stdout().read_key();
}
