use clap::ValueEnum;

/// Read-only admin-data collections exposed by the backend.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminResource {
    Users,
    Statistics,
    Analyses,
    Specialists,
    Diagnostics,
    Recommendations,
    #[value(name = "doctor-applications")]
    DoctorApplications,
    #[value(name = "doctor-application-stats")]
    DoctorApplicationStats,
}

impl AdminResource {
    pub fn path(self) -> &'static str {
        match self {
            AdminResource::Users => "/admin-data/dashboard/users",
            AdminResource::Statistics => "/admin-data/dashboard/statistics",
            AdminResource::Analyses => "/admin-data/analyses",
            AdminResource::Specialists => "/admin-data/specialists",
            AdminResource::Diagnostics => "/admin-data/diagnostics",
            AdminResource::Recommendations => "/admin-data/recommendations",
            AdminResource::DoctorApplications => "/admin-data/doctor-applications",
            AdminResource::DoctorApplicationStats => "/admin-data/doctor-applications/stats",
        }
    }

    /// Listing endpoints that take `page`/`limit`.
    pub fn is_paged(self) -> bool {
        matches!(
            self,
            AdminResource::Users | AdminResource::DoctorApplications
        )
    }

    /// Whether `/{path}/{id}` exists.
    pub fn has_items(self) -> bool {
        !matches!(
            self,
            AdminResource::Statistics | AdminResource::DoctorApplicationStats
        )
    }
}

/// Listing filters for paged resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminQuery {
    pub page: u32,
    pub limit: u32,
    /// `email` for users, `status` for doctor applications.
    pub filter: Option<String>,
}

impl Default for AdminQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            filter: None,
        }
    }
}
