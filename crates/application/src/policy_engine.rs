use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tierup_core::{AppError, AppResult};
use tierup_domain::PolicyModel;

/// Process-wide decision point over the in-memory policy model.
///
/// Clones share one model. Reads run concurrently; writes go through
/// [`crate::PolicyStore`], which holds the write lock only while applying a
/// delta that has already been persisted.
#[derive(Clone, Default)]
pub struct PolicyEngine {
    model: Arc<RwLock<PolicyModel>>,
}

impl PolicyEngine {
    /// Creates an engine with an empty model (deny everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine seeded with a model.
    #[must_use]
    pub fn with_model(model: PolicyModel) -> Self {
        Self {
            model: Arc::new(RwLock::new(model)),
        }
    }

    /// Decides whether `subject` may perform `action` on `resource`.
    ///
    /// Returns `Ok(false)` for an implicit deny. An error means no decision
    /// could be made; callers deny the request and report it as an internal
    /// error rather than a 403.
    pub fn enforce(&self, subject: &str, resource: &str, action: &str) -> AppResult<bool> {
        let model = self.read()?;
        Ok(model.enforce(subject, resource, action))
    }

    pub(crate) fn inspect<T>(&self, view: impl FnOnce(&PolicyModel) -> T) -> AppResult<T> {
        let model = self.read()?;
        Ok(view(&model))
    }

    pub(crate) fn apply<T>(&self, change: impl FnOnce(&mut PolicyModel) -> T) -> AppResult<T> {
        let mut model = self.write()?;
        Ok(change(&mut model))
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, PolicyModel>> {
        self.model
            .read()
            .map_err(|_| AppError::Internal("policy model lock is poisoned".to_owned()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, PolicyModel>> {
        self.model
            .write()
            .map_err(|_| AppError::Internal("policy model lock is poisoned".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tierup_core::AppError;
    use tierup_domain::{GroupingRule, PolicyModel, PolicyRule};

    use super::PolicyEngine;

    fn seeded_engine() -> PolicyEngine {
        let policies = PolicyRule::new("admin", "/api/v1/role", "POST").into_iter();
        let groupings = GroupingRule::new("42", "admin").into_iter();
        PolicyEngine::with_model(PolicyModel::from_rules(policies, groupings))
    }

    #[test]
    fn empty_engine_denies() {
        let engine = PolicyEngine::new();
        assert!(matches!(engine.enforce("42", "/api/v1/role", "POST"), Ok(false)));
    }

    #[test]
    fn grant_through_role_is_allowed() {
        let engine = seeded_engine();
        assert!(matches!(engine.enforce("42", "/api/v1/role", "POST"), Ok(true)));
        assert!(matches!(engine.enforce("42", "/api/v1/role", "GET"), Ok(false)));
        assert!(matches!(engine.enforce("43", "/api/v1/role", "POST"), Ok(false)));
    }

    #[test]
    fn poisoned_model_is_an_error_not_a_deny() {
        let engine = seeded_engine();
        let shared = Arc::clone(&engine.model);
        let _ = std::thread::spawn(move || {
            let _guard = shared.write();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            engine.enforce("42", "/api/v1/role", "POST"),
            Err(AppError::Internal(_))
        ));
    }
}
