/// The action selector: which single filter operation is currently armed.
///
/// The selection control shows seven labels (an idle placeholder plus one
/// per operation). Exactly one trigger button is visible at a time; the
/// idle state shows none. Any label the selector does not recognize maps
/// back to idle.

use std::fmt;

/// Placeholder label for the idle state (no trigger visible)
pub const IDLE_LABEL: &str = "Select an action";

/// All labels offered by the selection control, idle first
pub const SELECTOR_LABELS: [&str; 7] = [
    IDLE_LABEL,
    "Capture",
    "Convert to Black & White",
    "Erode",
    "Dilate",
    "HSTACK",
    "Blur",
];

/// One of the six filter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Capture,
    Grayscale,
    Erode,
    Dilate,
    Stack,
    Blur,
}

impl Action {
    /// Every action, in selector order
    pub const ALL: [Action; 6] = [
        Action::Capture,
        Action::Grayscale,
        Action::Erode,
        Action::Dilate,
        Action::Stack,
        Action::Blur,
    ];

    /// The label shown in the selection control and on the trigger button
    pub fn label(&self) -> &'static str {
        match self {
            Action::Capture => "Capture",
            Action::Grayscale => "Convert to Black & White",
            Action::Erode => "Erode",
            Action::Dilate => "Dilate",
            Action::Stack => "HSTACK",
            Action::Blur => "Blur",
        }
    }

    /// Title of the success notification for this action
    pub fn dialog_title(&self) -> &'static str {
        match self {
            Action::Capture => "Image Captured",
            Action::Grayscale => "Conversion Complete",
            Action::Erode => "Erosion Complete",
            Action::Dilate => "Dilation Complete",
            Action::Stack => "HSTACK Complete",
            Action::Blur => "Blur Complete",
        }
    }

    /// Map a selector label back to an action.
    ///
    /// Unrecognized or empty input (including the idle placeholder) is the
    /// transition to the idle state, so it returns `None` rather than an
    /// error.
    pub fn from_label(label: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|action| action.label() == label)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
