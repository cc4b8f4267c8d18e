/// Question shown before a single-line script is run.
pub const EXECUTE_PROMPT: &str = "Execute script directly? (y/n)";

/// Only a bare `y`/`Y` counts as consent; everything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
