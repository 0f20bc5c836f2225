//! One module per [`ActionKind`](crate::ActionKind) variant.

pub mod activity;
pub mod popup;
pub mod screenshot;

pub use activity::{ActivityRecord, LogActivityArgs};
pub use popup::{Severity, ShowPopupArgs};
pub use screenshot::{decode_image, encode_image};
