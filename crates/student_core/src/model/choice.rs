//! Closed choice sets used by enumerated student fields.

use serde::Serialize;

/// A closed set of allowed values for one enumerated field.
///
/// `as_str()` is the stored/submitted value, `label()` the display text.
pub trait Choice: Copy + Sized + 'static {
    /// Every allowed value, in display order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn label(self) -> &'static str;

    /// Exact, case-sensitive match against stored values.
    fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|choice| choice.as_str() == value)
    }

    /// Returns `(value, label)` pairs for rendering select controls.
    fn options() -> Vec<ChoiceOption> {
        Self::ALL
            .iter()
            .map(|choice| ChoiceOption {
                value: choice.as_str(),
                label: choice.label(),
            })
            .collect()
    }
}

/// One renderable entry of a choice set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}
