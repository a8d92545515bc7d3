//! Notifier implementations

mod http_mailer;
mod log_mailer;
#[cfg(test)]
mod recording;

pub use http_mailer::{HttpMailer, HttpMailerConfig};
pub use log_mailer::LogMailer;
#[cfg(test)]
pub use recording::RecordingNotifier;
