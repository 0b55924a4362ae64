//! HTML pages
//!
//! The sign-up form and the landing page are embedded so the service runs
//! without a www-root; a configured www-root takes over everything the
//! API routes do not claim.

use axum::extract::State;
use axum::response::Html;

use crate::state::SharedState;

/// `GET /signup` — the HTML sign-up form.
pub async fn signup_form(State(state): State<SharedState>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name} - Sign up</title></head>
<body>
  <h1>Sign up for {name}</h1>
  <form id="signup">
    <label>Username <input type="text"     name="username" minlength="{min_user}" required></label>
    <label>E-Mail   <input type="email"    name="email"    required></label>
    <label>Password <input type="password" name="password" minlength="{min_pass}" required></label>
    <button type="submit">Sign up</button>
  </form>
</body>
</html>
"#,
        name = state.config.service_name,
        min_user = state.config.min_username_length,
        min_pass = state.config.min_password_length,
    ))
}

/// Fallback landing page when no www-root is configured.
pub async fn landing(State(state): State<SharedState>) -> Html<String> {
    Html(format!(
        "<html><body><h1>{}</h1><p>Users API is running.</p></body></html>",
        state.config.service_name
    ))
}
