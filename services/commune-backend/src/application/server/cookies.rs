use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

/// Name of the cookie carrying the bearer token for browser clients.
/// API clients use the Authorization header instead.
pub const JWT: &str = "jwt";

pub fn set_token_cookie(cookies: &Cookies, token: &str) {
    let mut cookie = Cookie::new(JWT, token.to_string());
    // The token must never be readable from scripts.
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");

    cookies.add(cookie);
}

/// Removal has to carry the same path as the original cookie or the
/// browser keeps the old one around.
pub fn remove_token_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::named(JWT);
    cookie.set_path("/");

    cookies.remove(cookie);
}
