//! Multipart profile forms

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use tracing::debug;

use crate::api::types::ApiError;
use crate::domain::media::UploadFile;
use crate::domain::user::{ProfileUpdate, Registration};
use crate::infrastructure::user::ProfileFiles;

const AVATAR_FIELD: &str = "avatar";
const RESUME_FIELD: &str = "resume";
const PASSWORD_FIELD: &str = "password";

/// Text fields and files read from a multipart profile form
#[derive(Debug, Default)]
pub struct ProfileForm {
    fields: HashMap<String, String>,
    avatar: Option<UploadFile>,
    resume: Option<UploadFile>,
}

impl ProfileForm {
    /// Drain a multipart body. Blank text fields are treated as absent.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, ApiError> {
        let mut multipart =
            multipart.map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == AVATAR_FIELD || name == RESUME_FIELD {
                let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;

                let mut file = UploadFile::new(file_name, data);
                if let Some(content_type) = content_type {
                    file = file.with_content_type(content_type);
                }

                if name == AVATAR_FIELD {
                    form.avatar = Some(file);
                } else {
                    form.resume = Some(file);
                }
                continue;
            }

            let text = field.text().await.map_err(multipart_error)?;
            let value = if name == PASSWORD_FIELD {
                text
            } else {
                text.trim().to_string()
            };
            if !value.is_empty() {
                form.fields.insert(name, value);
            }
        }

        debug!(
            fields = form.fields.len(),
            avatar = form.avatar.is_some(),
            resume = form.resume.is_some(),
            "Read profile form"
        );
        Ok(form)
    }

    fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    fn files(self) -> ProfileFiles {
        ProfileFiles::new(self.avatar, self.resume)
    }

    pub fn into_registration(mut self) -> (Registration, ProfileFiles) {
        let registration = Registration {
            full_name: self.take("fullName").unwrap_or_default(),
            email: self.take("email").unwrap_or_default(),
            phone: self.take("phone").unwrap_or_default(),
            about_me: self.take("aboutMe").unwrap_or_default(),
            password: self.take(PASSWORD_FIELD).unwrap_or_default(),
            portfolio_url: self.take("portfolioURL"),
            github_url: self.take("githubURL"),
            instagram_url: self.take("instagramURL"),
            linkedin_url: self.take("linkedInURL"),
        };

        (registration, self.files())
    }

    pub fn into_profile_update(mut self) -> (ProfileUpdate, ProfileFiles) {
        let update = ProfileUpdate {
            full_name: self.take("fullName"),
            email: self.take("email"),
            phone: self.take("phone"),
            about_me: self.take("aboutMe"),
            portfolio_url: self.take("portfolioURL"),
            github_url: self.take("githubURL"),
            instagram_url: self.take("instagramURL"),
            linkedin_url: self.take("linkedInURL"),
        };

        (update, self.files())
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), err.body_text())
}
