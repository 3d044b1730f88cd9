//! Flavour lines for whoever opens the developer console

use glint_core::EffectRng;

const LINES: [&str; 12] = [
    "signal integrity: questionable",
    "you are reading the footnotes of the footnotes",
    "this page was rendered 3 times. only one of them was for you",
    "checksum mismatch in paragraph 4. ignoring",
    "the logo does not like to be clicked",
    "buffer underrun in sector 7. refilling with static",
    "if you can read this, the overlay is still watching",
    "retrying handshake with nobody",
    "legal text compiled with warnings",
    "frame dropped. frame found. frame dropped again",
    "all terms are final until they are not",
    "ghost in the grid reported as expected behaviour",
];

/// How many lines one call prints
pub const LINES_PER_CALL: usize = 5;

/// Log a shuffled handful of flavour lines at `info` and return them
pub fn glitch_helper(rng: &mut EffectRng) -> Vec<String> {
    let mut lines = LINES;
    rng.shuffle(&mut lines);
    let picked: Vec<String> = lines
        .iter()
        .take(LINES_PER_CALL)
        .map(|l| l.to_string())
        .collect();
    for line in &picked {
        tracing::info!(target: "glint::console", "{line}");
    }
    picked
}
