//! Login page rendering.
//!
//! Deliberately minimal: the gateway owns authentication, not presentation.
//! The page is a self-contained form so no static assets need serving.

use axum::response::Html;

/// Render the login page. `error` is the code from the redirect query
/// string: `1` for bad credentials or a session-save failure, `2` for a
/// throttled address.
pub fn render_login(error: Option<&str>) -> Html<String> {
    let message = match error {
        Some("1") => r#"<p class="error">Invalid username or password.</p>"#,
        Some("2") => r#"<p class="error">Too many login attempts. Try again later.</p>"#,
        _ => "",
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Terminal Login</title>
<style>
  body {{ font-family: system-ui, sans-serif; background: #1e1e1e; color: #ddd;
         display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }}
  form {{ background: #2b2b2b; padding: 2rem; border-radius: 8px; min-width: 280px; }}
  h1 {{ font-size: 1.2rem; margin-top: 0; }}
  input {{ display: block; width: 100%; box-sizing: border-box; margin: .5rem 0 1rem;
           padding: .5rem; border: 1px solid #444; border-radius: 4px; background: #1e1e1e; color: #ddd; }}
  button {{ width: 100%; padding: .6rem; border: none; border-radius: 4px;
            background: #3a7afe; color: white; cursor: pointer; }}
  .error {{ color: #ff6b6b; }}
</style>
</head>
<body>
<form method="post" action="/login">
  <h1>Terminal Login</h1>
  {message}
  <label for="username">Username</label>
  <input id="username" name="username" autocomplete="username" required>
  <label for="password">Password</label>
  <input id="password" name="password" type="password" autocomplete="current-password" required>
  <button type="submit">Sign in</button>
</form>
</body>
</html>
"#
    ))
}
