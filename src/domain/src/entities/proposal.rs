use serde::{Deserialize, Deserializer, Serialize};

/// Structured answer decoded from model output.
///
/// `success == false` means the model is asking for clarification or
/// refusing; `script` then carries that message instead of code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptProposal {
    #[serde(deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub multiple_lines: bool,
    pub script: String,
}

/// What the turn loop may do with a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Show `script` as a message, offer nothing to run.
    Clarification,
    /// Show `script` as file content to save; never executed.
    SaveToFile,
    /// Eligible for the confirm-then-execute path.
    Runnable,
}

impl ScriptProposal {
    pub fn disposition(&self) -> Disposition {
        match (self.success, self.multiple_lines) {
            (false, _) => Disposition::Clarification,
            (true, true) => Disposition::SaveToFile,
            (true, false) => Disposition::Runnable,
        }
    }
}

/// Accepts JSON booleans and the strings `"true"`/`"false"`, which local
/// models frequently emit when copying a quoted format example.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Text(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(value) => Ok(value),
        BoolOrString::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected boolean, found string {other:?}"
            ))),
        },
    }
}
