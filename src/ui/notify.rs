/// Modal notifications for operation outcomes.
///
/// Every filter invocation ends in exactly one of these dialogs; there are
/// no silent failures. The dialogs block until dismissed, which is fine for
/// operations this short.

use rfd::{MessageDialog, MessageLevel};

/// Show a success notification.
pub fn info(title: &str, body: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(body)
        .show();
}

/// Show an error notification.
pub fn error(title: &str, body: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(body)
        .show();
}
