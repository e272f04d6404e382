/// Credential cookie binding
///
/// Puts the access/refresh pair on a response as two http-only cookies and
/// clears them again on logout.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponseBuilder;

use crate::auth::TokenPair;
use crate::configuration::{CookieSettings, SameSitePolicy};

#[derive(Clone, Debug)]
pub struct CredentialCookies {
    settings: CookieSettings,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl CredentialCookies {
    pub fn new(settings: CookieSettings, access_ttl: i64, refresh_ttl: i64) -> Self {
        Self {
            settings,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn access_name(&self) -> &str {
        &self.settings.access_token_name
    }

    pub fn refresh_name(&self) -> &str {
        &self.settings.refresh_token_name
    }

    fn same_site(&self) -> SameSite {
        match self.settings.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }

    fn build(&self, name: &str, value: &str, max_age: Duration) -> Cookie<'static> {
        Cookie::build(name.to_string(), value.to_string())
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(self.same_site())
            .path(self.settings.path.clone())
            .max_age(max_age)
            .finish()
    }

    pub fn access_cookie(&self, token: &str) -> Cookie<'static> {
        self.build(self.access_name(), token, Duration::seconds(self.access_ttl))
    }

    pub fn refresh_cookie(&self, token: &str) -> Cookie<'static> {
        self.build(self.refresh_name(), token, Duration::seconds(self.refresh_ttl))
    }

    /// Set both credential cookies
    pub fn attach(&self, response: &mut HttpResponseBuilder, tokens: &TokenPair) {
        response
            .cookie(self.access_cookie(&tokens.access_token))
            .cookie(self.refresh_cookie(&tokens.refresh_token));
    }

    /// Expire both credential cookies
    pub fn clear(&self, response: &mut HttpResponseBuilder) {
        for name in [self.access_name(), self.refresh_name()] {
            let mut cookie = self.build(name, "", Duration::ZERO);
            cookie.make_removal();
            response.cookie(cookie);
        }
    }
}
