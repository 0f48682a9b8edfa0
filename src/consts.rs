pub const CSRF_TOKEN_COOKIE_NAME: &str = "csrf_token";
pub const REDIRECT_TO_COOKIE_NAME: &str = "redirect_to";

pub const MAX_AGE_COOKIES: i64 = chrono::TimeDelta::days(7).num_seconds();

/// Display format for showtime start times on the profile view
pub const DATETIME_DISPLAY_FORMAT: &str = "%A, %B %e · %H:%M";
