//! Form payloads for the authentication flows. Validation happens locally
//! before any call to the remote API; the error strings end up rendered in
//! the form the user submitted.

#[derive(serde::Deserialize, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn fields_are_valid(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn fields_are_valid(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.password.is_empty()
            && !self.confirm_password.is_empty()
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn fields_are_valid(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn fields_are_valid(&self) -> bool {
        !self.token.trim().is_empty()
            && !self.password.is_empty()
            && !self.confirm_password.is_empty()
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct ResendVerificationForm {
    pub email: String,
}
