//! Route table

use counsel_core::{Role, RouteName};

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in users holding one of these roles
    Roles(&'static [Role]),
}

impl Access {
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Access::Public)
    }

    /// Whether a user with `role` passes the role restriction.
    /// Authentication itself is checked separately.
    pub fn allows(&self, role: Option<Role>) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::Roles(roles) => role.is_some_and(|role| roles.contains(&role)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub name: RouteName,
    /// Path pattern; `:name` segments capture parameters, `*` matches anything
    pub path: &'static str,
    pub title: &'static str,
    pub access: Access,
}

impl RouteMeta {
    pub fn requires_auth(&self) -> bool {
        self.access.requires_auth()
    }
}

/// Path that redirects to the user dashboard
pub const ROOT_PATH: &str = "/";

/// Path pattern of the catch-all route
pub const WILDCARD: &str = "*";

/// Every route, in match order. The wildcard must stay last.
pub static ROUTES: &[RouteMeta] = &[
    RouteMeta {
        name: RouteName::Login,
        path: "/login",
        title: "登录 - 法律助手",
        access: Access::Public,
    },
    RouteMeta {
        name: RouteName::Dashboard,
        path: "/dashboard",
        title: "我的案件 - 法律助手",
        access: Access::Roles(&[Role::User]),
    },
    RouteMeta {
        name: RouteName::ProfessionalDashboard,
        path: "/professional",
        title: "专业人员面板 - 法律助手",
        access: Access::Roles(&[Role::Professional]),
    },
    RouteMeta {
        name: RouteName::AdminDashboard,
        path: "/Admin",
        title: "管理员面板 - 法律助手",
        access: Access::Roles(&[Role::Admin]),
    },
    RouteMeta {
        name: RouteName::Profile,
        path: "/profile",
        title: "个人资料 - 法律助手",
        access: Access::Authenticated,
    },
    RouteMeta {
        name: RouteName::CaseDetail,
        path: "/case/:id",
        title: "案件详情 - 法律助手",
        access: Access::Authenticated,
    },
    RouteMeta {
        name: RouteName::CasePool,
        path: "/case-pool",
        title: "案件池 - 法律助手",
        access: Access::Roles(&[Role::Professional]),
    },
    RouteMeta {
        name: RouteName::Questionnaire,
        path: "/questionnaire/:sessionId",
        title: "问卷填写 - 法律助手",
        access: Access::Roles(&[Role::User]),
    },
    RouteMeta {
        name: RouteName::Unauthorized,
        path: "/unauthorized",
        title: "无权访问 - 法律助手",
        access: Access::Public,
    },
    RouteMeta {
        name: RouteName::NotFound,
        path: WILDCARD,
        title: "页面未找到 - 法律助手",
        access: Access::Public,
    },
];

/// Metadata for a named route
pub fn route(name: RouteName) -> &'static RouteMeta {
    ROUTES
        .iter()
        .find(|meta| meta.name == name)
        .unwrap_or(&ROUTES[ROUTES.len() - 1])
}

/// Landing page for a role
pub fn dashboard_for(role: Option<Role>) -> RouteName {
    match role {
        Some(Role::Admin) => RouteName::AdminDashboard,
        Some(Role::Professional) => RouteName::ProfessionalDashboard,
        _ => RouteName::Dashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_name_has_an_entry() {
        for name in [
            RouteName::Login,
            RouteName::Dashboard,
            RouteName::ProfessionalDashboard,
            RouteName::AdminDashboard,
            RouteName::Profile,
            RouteName::CaseDetail,
            RouteName::CasePool,
            RouteName::Questionnaire,
            RouteName::Unauthorized,
            RouteName::NotFound,
        ] {
            assert_eq!(route(name).name, name);
        }
        assert_eq!(ROUTES.last().map(|meta| meta.path), Some(WILDCARD));
    }

    #[test]
    fn test_requires_auth_follows_access() {
        assert!(!route(RouteName::Login).requires_auth());
        assert!(!route(RouteName::NotFound).requires_auth());
        assert!(route(RouteName::Profile).requires_auth());
        assert!(route(RouteName::CasePool).requires_auth());
    }

    #[test]
    fn test_role_restrictions() {
        let pool = route(RouteName::CasePool).access;
        assert!(pool.allows(Some(Role::Professional)));
        assert!(!pool.allows(Some(Role::User)));
        assert!(!pool.allows(Some(Role::Admin)));
        assert!(!pool.allows(None));

        assert!(Access::Authenticated.allows(Some(Role::User)));
    }

    #[test]
    fn test_dashboard_for_role() {
        assert_eq!(dashboard_for(Some(Role::Admin)), RouteName::AdminDashboard);
        assert_eq!(
            dashboard_for(Some(Role::Professional)),
            RouteName::ProfessionalDashboard
        );
        assert_eq!(dashboard_for(Some(Role::User)), RouteName::Dashboard);
        assert_eq!(dashboard_for(None), RouteName::Dashboard);
    }

    #[test]
    fn test_every_role_may_enter_its_dashboard() {
        for role in Role::ALL {
            let dashboard = route(dashboard_for(Some(role)));
            assert!(dashboard.access.allows(Some(role)), "{role} locked out");

            let others = Role::ALL.into_iter().filter(|other| *other != role);
            for other in others {
                assert!(!dashboard.access.allows(Some(other)), "{other} let into {role}");
            }
        }
    }
}
