use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Epoch progress bar: one tick per finished epoch.
/// indicatif hides the bar on its own when stderr is not a terminal.
pub fn epoch_bar(epochs: usize, desc: &'static str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(epochs as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix}: {percent:>3}%|{wide_bar:.cyan/blue}| {pos}/{len} [{elapsed_precise}<{eta_precise}] {msg}")?
            .progress_chars("#>-"),
    );
    bar.set_prefix(desc);
    Ok(bar)
}
