//! Hash Router
//!
//! Maps URL fragments (`#/novel/5?tab=reviews`) to pages. Resolution is a
//! pure function of the fragment and the caller's authentication, so the
//! browser shell, the terminal client and the tests share one decision
//! procedure.
//!
//! # Resolution order
//!
//! ```text
//! fragment → parse → match (exact, then :param) → guards → route redirect → render
//!                       │                            │
//!                    NotFound                     Redirect
//! ```

use crate::models::Role;
use crate::store::AppState;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Delay before a 404 page sends the user to its fallback
pub const NOT_FOUND_REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Login,
    Register,
    NovelDetail,
    Reader,
    Admin,
    Search,
    Profile,
    Library,
    EditProfile,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Login => "Login",
            Page::Register => "Register",
            Page::NovelDetail => "Novel",
            Page::Reader => "Reader",
            Page::Admin => "Admin",
            Page::Search => "Search",
            Page::Profile => "Profile",
            Page::Library => "My Library",
            Page::EditProfile => "Edit Profile",
        }
    }
}

/// One row of the route table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub page: Page,
    pub requires_auth: bool,
    pub only_guest: bool,
    pub roles: &'static [Role],
    pub redirect: Option<&'static str>,
}

impl RouteDef {
    const fn public(pattern: &'static str, page: Page) -> Self {
        Self {
            pattern,
            page,
            requires_auth: false,
            only_guest: false,
            roles: &[],
            redirect: None,
        }
    }

    const fn guest(pattern: &'static str, page: Page) -> Self {
        Self {
            only_guest: true,
            ..Self::public(pattern, page)
        }
    }

    const fn authed(pattern: &'static str, page: Page) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(pattern, page)
        }
    }

    fn is_dynamic(&self) -> bool {
        self.pattern.contains(':')
    }
}

pub static ROUTES: &[RouteDef] = &[
    RouteDef {
        redirect: Some(HOME_PATH),
        ..RouteDef::public("/", Page::Home)
    },
    RouteDef::guest("/login", Page::Login),
    RouteDef::guest("/register", Page::Register),
    RouteDef::public("/home", Page::Home),
    RouteDef::public("/novel/:novelId", Page::NovelDetail),
    RouteDef::authed("/reader/:novelId/:chapterId", Page::Reader),
    RouteDef {
        roles: &[Role::Admin],
        ..RouteDef::authed("/admin", Page::Admin)
    },
    RouteDef::public("/search", Page::Search),
    RouteDef::authed("/profile", Page::Profile),
    RouteDef::authed("/library", Page::Library),
    RouteDef::authed("/edit-profile", Page::EditProfile),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Missing route parameter: {0}")]
    MissingParam(String),

    #[error("Invalid value for route parameter {name}: {value}")]
    InvalidParam { name: String, value: String },
}

/// Named values captured from the path or the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric id parameter such as `novelId`
    pub fn param_id(&self, name: &str) -> Result<i64, RouteError> {
        let raw = self
            .get(name)
            .ok_or_else(|| RouteError::MissingParam(name.to_string()))?;
        raw.parse().map_err(|_| RouteError::InvalidParam {
            name: name.to_string(),
            value: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Params,
}

/// Split a fragment into path and decoded query parameters
pub fn parse_hash(hash: &str) -> Location {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    let raw = if raw.is_empty() { "/" } else { raw };

    let (path, query_str) = match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    };

    let mut query = Params::default();
    for pair in query_str.unwrap_or("").split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.insert(decode_component(key), decode_component(value));
    }

    Location {
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        query,
    }
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    pub params: Params,
}

/// Exact patterns win over dynamic ones
pub fn match_route(path: &str) -> Option<RouteMatch> {
    match_in(ROUTES, path)
}

fn match_in(routes: &'static [RouteDef], path: &str) -> Option<RouteMatch> {
    if let Some(route) = routes.iter().find(|r| r.pattern == path) {
        return Some(RouteMatch {
            route,
            params: Params::default(),
        });
    }

    routes
        .iter()
        .filter(|r| r.is_dynamic())
        .find_map(|route| match_pattern(route.pattern, path).map(|params| RouteMatch { route, params }))
}

fn match_pattern(pattern: &str, path: &str) -> Option<Params> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();
    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = Params::default();
    for (expected, actual) in pattern_parts.iter().zip(&path_parts) {
        match expected.strip_prefix(':') {
            Some(name) => {
                if actual.is_empty() {
                    return None;
                }
                params.insert(name, decode_component(actual));
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// What the guards know about the current visitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl AuthContext {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(role: Role) -> Self {
        Self {
            is_authenticated: true,
            role: Some(role),
        }
    }
}

impl From<&AppState> for AuthContext {
    fn from(state: &AppState) -> Self {
        Self {
            is_authenticated: state.is_authenticated && state.jwt_token.is_some(),
            role: state.role(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Redirect(&'static str),
}

pub fn check_access(route: &RouteDef, auth: &AuthContext) -> Access {
    if route.requires_auth && !auth.is_authenticated {
        return Access::Redirect(LOGIN_PATH);
    }
    if route.only_guest && auth.is_authenticated {
        return Access::Redirect(HOME_PATH);
    }
    if !route.roles.is_empty() && !auth.role.map_or(false, |r| route.roles.contains(&r)) {
        return Access::Redirect(HOME_PATH);
    }
    Access::Allowed
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Render {
        page: Page,
        params: Params,
        query: Params,
    },
    Redirect(String),
    NotFound {
        path: String,
        fallback: &'static str,
        delay: Duration,
    },
}

pub fn resolve(hash: &str, auth: &AuthContext) -> Resolution {
    let location = parse_hash(hash);

    let Some(matched) = match_route(&location.path) else {
        tracing::warn!(path = %location.path, "No route matched");
        return Resolution::NotFound {
            path: location.path,
            fallback: if auth.is_authenticated { HOME_PATH } else { LOGIN_PATH },
            delay: NOT_FOUND_REDIRECT_DELAY,
        };
    };

    if let Access::Redirect(target) = check_access(matched.route, auth) {
        tracing::debug!(path = %location.path, redirect = target, "Route guard redirect");
        return Resolution::Redirect(target.to_string());
    }

    if let Some(target) = matched.route.redirect {
        if target != location.path {
            return Resolution::Redirect(target.to_string());
        }
    }

    Resolution::Render {
        page: matched.route.page,
        params: matched.params,
        query: location.query,
    }
}

/// `#/path` fragment for a route path
pub fn href(path: &str) -> String {
    if path.starts_with('/') {
        format!("#{}", path)
    } else {
        format!("#/{}", path)
    }
}

/// Something that can change the current location
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Path builders for the dynamic routes
pub mod paths {
    use crate::models::{ChapterId, NovelId};

    pub fn novel(novel_id: NovelId) -> String {
        format!("/novel/{}", novel_id)
    }

    pub fn reader(novel_id: NovelId, chapter_id: ChapterId) -> String {
        format!("/reader/{}/{}", novel_id, chapter_id)
    }

    pub fn search(query: &str) -> String {
        format!("/search?q={}", urlencoding::encode(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_parse_hash_defaults_to_root() {
        assert_eq!(parse_hash("").path, "/");
        assert_eq!(parse_hash("#").path, "/");
        assert_eq!(parse_hash("#?q=x").path, "/");
    }

    #[test]
    fn test_parse_hash_query_decoding() {
        let loc = parse_hash("#/search?q=the%20hobbit&page=2&&flag&a+b=c%zz");
        assert_eq!(loc.path, "/search");
        assert_eq!(loc.query.get("q"), Some("the hobbit"));
        assert_eq!(loc.query.get("page"), Some("2"));
        assert_eq!(loc.query.get("flag"), Some(""));
        // '+' stays literal, malformed escapes fall back to the raw text
        assert_eq!(loc.query.get("a+b"), Some("c%zz"));
    }

    #[test]
    fn test_parse_hash_splits_on_first_question_mark() {
        let loc = parse_hash("#/search?q=what?now");
        assert_eq!(loc.query.get("q"), Some("what?now"));
    }

    #[test]
    fn test_exact_match_before_dynamic() {
        let m = match_route("/home").unwrap();
        assert_eq!(m.route.page, Page::Home);
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_dynamic_match_extracts_params() {
        let m = match_route("/reader/12/340").unwrap();
        assert_eq!(m.route.page, Page::Reader);
        assert_eq!(m.params.param_id("novelId").unwrap(), 12);
        assert_eq!(m.params.param_id("chapterId").unwrap(), 340);
    }

    #[test]
    fn test_dynamic_match_rejects_wrong_shapes() {
        assert!(match_route("/novel").is_none());
        assert!(match_route("/novel/").is_none());
        assert!(match_route("/novel/1/extra").is_none());
        assert!(match_route("/reader/1").is_none());
        assert!(match_route("/unknown").is_none());
    }

    #[test]
    fn test_param_id_errors() {
        let m = match_route("/novel/abc").unwrap();
        assert_eq!(
            m.params.param_id("novelId").unwrap_err(),
            RouteError::InvalidParam {
                name: "novelId".into(),
                value: "abc".into()
            }
        );
        assert!(matches!(
            m.params.param_id("chapterId"),
            Err(RouteError::MissingParam(_))
        ));
    }

    #[test]
    fn test_guard_order() {
        let reader = match_route("/reader/1/2").unwrap().route;
        let login = match_route("/login").unwrap().route;
        let admin = match_route("/admin").unwrap().route;

        let guest = AuthContext::guest();
        let member = AuthContext::user(Role::User);
        let admin_user = AuthContext::user(Role::Admin);

        assert_eq!(check_access(reader, &guest), Access::Redirect(LOGIN_PATH));
        assert_eq!(check_access(reader, &member), Access::Allowed);
        assert_eq!(check_access(login, &guest), Access::Allowed);
        assert_eq!(check_access(login, &member), Access::Redirect(HOME_PATH));
        // Auth is checked before the role
        assert_eq!(check_access(admin, &guest), Access::Redirect(LOGIN_PATH));
        assert_eq!(check_access(admin, &member), Access::Redirect(HOME_PATH));
        assert_eq!(check_access(admin, &admin_user), Access::Allowed);
    }

    #[test]
    fn test_role_guard_without_role() {
        let admin = match_route("/admin").unwrap().route;
        let no_role = AuthContext {
            is_authenticated: true,
            role: None,
        };
        assert_eq!(check_access(admin, &no_role), Access::Redirect(HOME_PATH));
    }

    #[test]
    fn test_resolve_root_redirects_home() {
        assert_eq!(
            resolve("#/", &AuthContext::guest()),
            Resolution::Redirect("/home".into())
        );
        assert_eq!(
            resolve("", &AuthContext::guest()),
            Resolution::Redirect("/home".into())
        );
    }

    #[test]
    fn test_resolve_render_carries_params_and_query() {
        match resolve("#/novel/8?tab=reviews", &AuthContext::guest()) {
            Resolution::Render { page, params, query } => {
                assert_eq!(page, Page::NovelDetail);
                assert_eq!(params.get("novelId"), Some("8"));
                assert_eq!(query.get("tab"), Some("reviews"));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_not_found_fallback() {
        match resolve("#/nowhere", &AuthContext::guest()) {
            Resolution::NotFound { fallback, delay, path } => {
                assert_eq!(fallback, LOGIN_PATH);
                assert_eq!(delay, Duration::from_secs(2));
                assert_eq!(path, "/nowhere");
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
        assert!(matches!(
            resolve("#/nowhere", &AuthContext::user(Role::User)),
            Resolution::NotFound { fallback: HOME_PATH, .. }
        ));
    }

    #[test]
    fn test_resolve_guarded_route_redirects() {
        assert_eq!(
            resolve("#/library", &AuthContext::guest()),
            Resolution::Redirect("/login".into())
        );
        assert_eq!(
            resolve("#/register", &AuthContext::user(Role::Creator)),
            Resolution::Redirect("/home".into())
        );
    }

    #[test]
    fn test_auth_context_from_state_requires_token() {
        let mut state = AppState {
            is_authenticated: true,
            ..Default::default()
        };
        assert!(!AuthContext::from(&state).is_authenticated);
        state.jwt_token = Some("tok".into());
        assert!(AuthContext::from(&state).is_authenticated);
    }

    #[test]
    fn test_href_and_paths() {
        assert_eq!(href("/home"), "#/home");
        assert_eq!(href("library"), "#/library");
        assert_eq!(paths::reader(3, 4), "/reader/3/4");
        assert_eq!(paths::search("war & peace"), "/search?q=war%20%26%20peace");

        let loc = parse_hash(&href(&paths::search("war & peace")));
        assert_eq!(loc.query.get("q"), Some("war & peace"));
    }

    struct Recorder(RefCell<Vec<String>>);

    impl Navigator for Recorder {
        fn navigate(&self, path: &str) {
            self.0.borrow_mut().push(href(path));
        }
    }

    #[test]
    fn test_navigator_follows_redirects() {
        let nav = Recorder(RefCell::new(Vec::new()));
        let auth = AuthContext::guest();
        let mut hash = "#/profile".to_string();
        for _ in 0..3 {
            match resolve(&hash, &auth) {
                Resolution::Redirect(target) => {
                    nav.navigate(&target);
                    hash = href(&target);
                }
                _ => break,
            }
        }
        assert_eq!(*nav.0.borrow(), vec!["#/login".to_string()]);
    }
}
