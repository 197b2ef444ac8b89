// guard/routes.rs - Client route table

use crate::auth::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Services,
    Contact,
    Login,
    Register,
    Dashboard,
    Cases,
    NewCase,
    Documents,
    Calendar,
    Profile,
    Admin,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Home,
        Route::About,
        Route::Services,
        Route::Contact,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Cases,
        Route::NewCase,
        Route::Documents,
        Route::Calendar,
        Route::Profile,
        Route::Admin,
        Route::NotFound,
    ];

    /// Match a path, ignoring any query string and trailing slash
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/about" => Route::About,
            "/services" => Route::Services,
            "/contact" => Route::Contact,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/cases" => Route::Cases,
            "/cases/new" => Route::NewCase,
            "/documents" => Route::Documents,
            "/calendar" => Route::Calendar,
            "/profile" => Route::Profile,
            "/admin" => Route::Admin,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Services => "/services",
            Route::Contact => "/contact",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Cases => "/cases",
            Route::NewCase => "/cases/new",
            Route::Documents => "/documents",
            Route::Calendar => "/calendar",
            Route::Profile => "/profile",
            Route::Admin => "/admin",
            Route::NotFound => "*",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::About => "About",
            Route::Services => "Services",
            Route::Contact => "Contact",
            Route::Login => "Sign in",
            Route::Register => "Register",
            Route::Dashboard => "Dashboard",
            Route::Cases => "Cases",
            Route::NewCase => "New case",
            Route::Documents => "Documents",
            Route::Calendar => "Calendar",
            Route::Profile => "Profile",
            Route::Admin => "Administration",
            Route::NotFound => "Page not found",
        }
    }

    /// Rendered without consulting the guard
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Home
                | Route::About
                | Route::Services
                | Route::Contact
                | Route::Login
                | Route::Register
                | Route::NotFound
        )
    }

    /// Capability needed beyond being signed in
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Route::Admin => Some(Capability::ManageUsers),
            Route::NewCase => Some(Capability::CreateCases),
            Route::Documents => Some(Capability::UploadDocuments),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
