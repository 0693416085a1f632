use crate::dto::HealthRes;

/// Simple health service for the REST server.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports liveness. The policy engine has no external dependencies to probe.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "CareNav is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_healthy() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "CareNav is alive");
    }
}
