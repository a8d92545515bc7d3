//! Profile inputs accepted from clients

use validator::Validate;

/// Everything needed to create an account, apart from the uploaded files
#[derive(Clone, Default, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "About me is required"))]
    pub about_me: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must contain between 8 and 128 characters"
    ))]
    pub password: String,

    #[validate(url(message = "Portfolio URL is not a valid URL"))]
    pub portfolio_url: Option<String>,

    #[validate(url(message = "GitHub URL is not a valid URL"))]
    pub github_url: Option<String>,

    #[validate(url(message = "Instagram URL is not a valid URL"))]
    pub instagram_url: Option<String>,

    #[validate(url(message = "LinkedIn URL is not a valid URL"))]
    pub linkedin_url: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[hidden]")
            .finish_non_exhaustive()
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "About me cannot be empty"))]
    pub about_me: Option<String>,

    #[validate(url(message = "Portfolio URL is not a valid URL"))]
    pub portfolio_url: Option<String>,

    #[validate(url(message = "GitHub URL is not a valid URL"))]
    pub github_url: Option<String>,

    #[validate(url(message = "Instagram URL is not a valid URL"))]
    pub instagram_url: Option<String>,

    #[validate(url(message = "LinkedIn URL is not a valid URL"))]
    pub linkedin_url: Option<String>,
}

impl ProfileUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
