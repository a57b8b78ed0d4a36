//! Route tables: which paths are public, shared, or owned by a role

use reach_auth::Role;

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/auth/login",
    "/auth/signup",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/about",
    "/static",
    "/favicon.ico",
    "/health",
];

const COMMON_PATHS: &[&str] = &[
    "/profile",
    "/settings",
    "/notifications",
    "/help",
    VERIFY_EMAIL_PATH,
];

pub const LOGIN_PATH: &str = "/auth/login";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";

/// Segment-aware prefix match.
///
/// `/agency` matches `/agency` and `/agency/...` but not `/agencyx`.
/// The root prefix `/` only matches the root itself.
pub fn path_matches(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Served without looking at the session at all
    pub public: Vec<String>,
    /// Open to every signed-in role
    pub common: Vec<String>,
    /// Prefixes owned by each role; a path owned by any role is closed to the others
    pub role_paths: Vec<(Role, Vec<String>)>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public: owned(PUBLIC_PATHS),
            common: owned(COMMON_PATHS),
            role_paths: vec![
                (
                    Role::Creator,
                    owned(&["/dashboard", "/campaigns", "/applications", "/rewards", "/earnings"]),
                ),
                (Role::Agency, owned(&["/agency"])),
                (Role::Brand, owned(&["/brand"])),
                (Role::Admin, owned(&["/admin"])),
            ],
        }
    }
}

impl RoutePolicy {
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| path_matches(path, p))
    }

    pub fn is_common(&self, path: &str) -> bool {
        self.common.iter().any(|p| path_matches(path, p))
    }

    fn owned_by(&self, role: Role, path: &str) -> bool {
        self.role_paths
            .iter()
            .filter(|(owner, _)| *owner == role)
            .flat_map(|(_, prefixes)| prefixes.iter())
            .any(|p| path_matches(path, p))
    }

    /// Whether `role` may open `path`. Admins may open anything; paths no
    /// role owns are open to all.
    pub fn allows(&self, role: Role, path: &str) -> bool {
        if role.is_admin() || self.is_common(path) {
            return true;
        }

        let owners: Vec<Role> = self
            .role_paths
            .iter()
            .map(|(owner, _)| *owner)
            .filter(|owner| self.owned_by(*owner, path))
            .collect();

        owners.is_empty() || owners.contains(&role)
    }

    /// Landing page for a role
    pub fn home_for(role: Role) -> &'static str {
        match role {
            Role::Creator => "/dashboard",
            Role::Agency => "/agency/dashboard",
            Role::Brand => "/brand/dashboard",
            Role::Admin => "/admin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_aware_matching() {
        assert!(path_matches("/agency", "/agency"));
        assert!(path_matches("/agency/dashboard", "/agency"));
        assert!(!path_matches("/agencyx", "/agency"));
        assert!(!path_matches("/ag", "/agency"));
    }

    #[test]
    fn test_root_matches_only_itself() {
        assert!(path_matches("/", "/"));
        assert!(!path_matches("/dashboard", "/"));
    }

    #[test]
    fn test_public_paths() {
        let policy = RoutePolicy::default();
        assert!(policy.is_public("/"));
        assert!(policy.is_public("/auth/login"));
        assert!(policy.is_public("/static/css/app.css"));
        assert!(!policy.is_public("/dashboard"));
        assert!(!policy.is_public("/auth/verify-email"));
    }

    #[test]
    fn test_creator_cannot_open_agency_paths() {
        let policy = RoutePolicy::default();
        assert!(!policy.allows(Role::Creator, "/agency/dashboard"));
        assert!(policy.allows(Role::Agency, "/agency/dashboard"));
        assert!(!policy.allows(Role::Brand, "/campaigns/c1"));
        assert!(policy.allows(Role::Creator, "/campaigns/c1"));
    }

    #[test]
    fn test_admin_opens_everything() {
        let policy = RoutePolicy::default();
        for path in ["/agency/dashboard", "/brand/dashboard", "/dashboard", "/admin/users"] {
            assert!(policy.allows(Role::Admin, path), "{}", path);
        }
    }

    #[test]
    fn test_admin_area_closed_to_other_roles() {
        let policy = RoutePolicy::default();
        assert!(!policy.allows(Role::Brand, "/admin"));
    }

    #[test]
    fn test_common_and_unlisted_paths_open_to_all() {
        let policy = RoutePolicy::default();
        for role in Role::ALL {
            assert!(policy.allows(role, "/settings/billing"));
            assert!(policy.allows(role, "/marketplace"));
        }
    }

    #[test]
    fn test_every_home_is_allowed_for_its_role() {
        let policy = RoutePolicy::default();
        for role in Role::ALL {
            assert!(policy.allows(role, RoutePolicy::home_for(role)));
        }
    }
}
