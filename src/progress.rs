use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;

/// Bar over the sum layers of a pass; hidden unless `visible`.
pub(crate) fn layer_bar(layers: u64, visible: bool, what: &'static str) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(layers);
    pb.set_style(
        ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:40}] {pos}/{len} layers | {prefix} | {msg}")?
            .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃")
            .progress_chars("=> "),
    );
    pb.set_prefix(what);
    Ok(pb)
}
