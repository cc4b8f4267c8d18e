use domain::entities::proposal::ScriptProposal;
use shared::error::{Error, Result};
use shared::json::extract_first_json;

/// Closing marker of the reasoning block some local models emit.
pub const THINK_END: &str = "</think>";

/// Decodes raw model text into a proposal.
///
/// Everything up to and including the last `</think>` is discarded, then
/// the first JSON object of the remainder is decoded. Any extraction or
/// decode failure comes back as `Error::MalformedProposal`.
pub fn parse_script(raw: &str) -> Result<ScriptProposal> {
    let raw = raw.trim();
    let answer = match raw.rfind(THINK_END) {
        Some(idx) => &raw[idx + THINK_END.len()..],
        None => raw,
    };

    let json = extract_first_json(answer).map_err(Error::malformed)?;
    serde_json::from_str(json).map_err(|e| Error::malformed(Error::ProposalDecode(e)))
}
