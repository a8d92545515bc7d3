//! Domain layer - Core business logic and entities

pub mod error;
pub mod media;
pub mod notification;
pub mod user;

pub use error::DomainError;
pub use media::{Asset, MediaFolder, MediaStore, UploadFile};
pub use notification::{EmailMessage, Notifier};
pub use user::{
    PasswordReset, ProfileUpdate, Registration, User, UserId, UserRecord, UserRepository,
};
