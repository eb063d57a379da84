// crates/adapt/src/http/draft.rs
//
// Draft mode is a session cookie set by the preview endpoint. It only makes
// requests skip the cache; reading unpublished content additionally needs
// `?draft=true` on the request itself.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serve::resolver::Draft;

pub const COOKIE_NAME: &str = "vitrine_draft";

pub fn cookie_enabled(jar: &CookieJar) -> bool {
    jar.get(COOKIE_NAME).is_some_and(|c| c.value() == "1")
}

pub fn from_request(jar: &CookieJar, draft_param: Option<&str>) -> Draft {
    Draft {
        mode: cookie_enabled(jar),
        requested: draft_param == Some("true"),
    }
}

/// `secure` is on in production only.
pub fn enable(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_NAME, "1"))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// The removal is sent even when the request carried no cookie.
pub fn disable(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    jar.add(cookie)
}
