use crate::config::Config;

/// Readiness signal surfaced by the dashboard's health route: the client
/// can serve data only once a provider credential is configured.
pub struct Health {
    pub ready: bool,
}

impl Health {
    pub fn readiness(config: Option<&Config>) -> Self {
        Self {
            ready: config.is_some(),
        }
    }
}
