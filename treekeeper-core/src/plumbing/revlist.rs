use crate::error::GitProcessError;

use super::process::GitRunner;

/// `RevList(from, to)` (§4.1): topological, parent-before-child order, from
/// first-after-`from` to `to`, inclusive of `to`. `from == "none"` means
/// "every ancestor of `to`".
pub fn rev_list(runner: &GitRunner, from: &str, to: &str) -> Result<Vec<String>, GitProcessError> {
    let range = if super::is_none(from) {
        to.to_string()
    } else {
        format!("{from}..{to}")
    };
    let out = runner.run_text(&["rev-list", "--topo-order", "--reverse", &range])?;
    if out.is_empty() {
        return Ok(Vec::new());
    }
    Ok(out.lines().map(str::to_string).collect())
}
