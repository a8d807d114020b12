use model::instance;
use thiserror::Error;

/// Licensed features the sync runner gates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    SchemaDrift,
}

#[derive(Error, Debug)]
#[error("feature {feature:?} is not available for instance {instance}")]
pub struct FeatureNotAvailable {
    pub feature: Feature,
    pub instance: String,
}

/// Feature gate consulted per instance. The real implementation lives with
/// the licensing service; tests script it.
pub trait LicenseService: Send + Sync {
    fn is_feature_enabled_for_instance(
        &self,
        feature: Feature,
        instance: &instance::Model,
    ) -> Result<(), FeatureNotAvailable>;
}
