/// A small login form with a mix of stable, generated and duplicated attributes.
pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Sign in</title></head>
  <body>
    <form>
      <label for="username">Username</label>
      <input id="username" name="user" type="text">
      <input id="pw-field-99231" name="password" type="password" placeholder="Password">
      <input type="checkbox" name="remember">
      <button class="btn-8821xk">Log In</button>
      <a href="/forgot">Forgot password?</a>
    </form>
  </body>
</html>"#;

pub fn wrap_body(body: &str) -> String {
    format!("<!DOCTYPE html><html><head></head><body>{}</body></html>", body)
}
