use crate::config::PreloadConfig;

/// Pseudo-classes whose rules only show their images after user interaction.
pub const STATE_KEYWORDS: &[&str] = &[":hover", ":active", ":focus", ":checked"];

/// Why a rule's images are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inspection {
    /// The selector contains a state keyword.
    State,
    /// The selector was added by the user.
    Selector,
    /// Only because user images were added; every source must be one of them.
    Forced,
}

impl Inspection {
    pub fn requires_added_image(self) -> bool {
        matches!(self, Inspection::Forced)
    }
}

pub fn has_state_keyword(selector_text: &str) -> bool {
    STATE_KEYWORDS
        .iter()
        .any(|keyword| selector_text.contains(keyword))
}

/// Decides whether a rule is inspected, and why. `None` skips the rule.
///
/// The ignore list beats every other reason.
pub fn inspect(selector_text: &str, config: &PreloadConfig) -> Option<Inspection> {
    if config.selectors.is_ignored(selector_text) {
        None
    } else if has_state_keyword(selector_text) {
        Some(Inspection::State)
    } else if config.selectors.is_added(selector_text) {
        Some(Inspection::Selector)
    } else if !config.images.add.is_empty() {
        Some(Inspection::Forced)
    } else {
        None
    }
}

/// True when a whole stylesheet is skipped because of its file name.
pub fn skips_sheet(sheet_file_name: Option<&str>, config: &PreloadConfig) -> bool {
    sheet_file_name.is_some_and(|name| config.files.is_ignored(name))
}
