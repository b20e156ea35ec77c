/// UI helpers
///
/// This module handles presentation concerns outside the main view:
/// - Live preview widget construction (preview.rs)
/// - Modal success/error notifications (notify.rs)

pub mod notify;
pub mod preview;
