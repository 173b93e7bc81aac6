pub mod login;
pub use self::login::{login, logout, show_login_form};

pub mod password;
pub use self::password::{
    reset_password, send_reset_link_email, show_new_password, show_reset_request_form,
};

// common functions for the handlers
use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Minimal HTML shell shared by the auth pages. The published stylesheet is
/// referenced relative to the host's public directory.
pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} · Wink</title>\n\
         <link rel=\"stylesheet\" href=\"/vendor/wink/wink.css\">\n\
         </head>\n<body class=\"wink\">\n<div class=\"wink-card\">\n\
         <h1>{title}</h1>\n{body}\n</div>\n\
         <script src=\"/vendor/wink/wink.js\"></script>\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(valid_email("author@example.com"));
        assert!(valid_email("a.b+c@sub.example.org"));

        assert!(!valid_email("author"));
        assert!(!valid_email("author@"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("author@example"));
        assert!(!valid_email("author @example.com"));
    }

    #[test]
    fn page_shell() {
        let html = page("Sign in", "<p>body</p>");

        assert!(html.contains("<title>Sign in · Wink</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("/vendor/wink/wink.css"));
    }
}
