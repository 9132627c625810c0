//! Rule Template Service (spec §4.4).
//!
//! A template is the stable identity a rule's versions hang off of. It
//! carries no conditions itself — those live on [`crate::rules::version::RuleVersion`].

use crate::error::{ComplianceError, Result};
use crate::repository::traits::{RuleTemplateRepository, RuleVersionRepository};
use crate::types::{OrganizationId, RuleTemplateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stable identity of a rule across its version history (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub id: RuleTemplateId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once a template is retired; a deactivated template can no
    /// longer have new versions created against it.
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl RuleTemplate {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

pub struct RuleTemplateService<'a> {
    templates: &'a dyn RuleTemplateRepository,
    versions: &'a dyn RuleVersionRepository,
}

impl<'a> RuleTemplateService<'a> {
    pub fn new(templates: &'a dyn RuleTemplateRepository, versions: &'a dyn RuleVersionRepository) -> Self {
        Self { templates, versions }
    }

    /// Create a new template. Creating a template does not activate any
    /// version — that only happens through [`crate::rules::version::RuleVersionService::activate`].
    pub async fn create(
        &self,
        org: OrganizationId,
        name: String,
        description: Option<String>,
        category: Option<String>,
    ) -> Result<RuleTemplate> {
        if name.trim().is_empty() {
            return Err(ComplianceError::ValidationError(vec!["name must be non-empty".into()]));
        }
        let now = Utc::now();
        let template = RuleTemplate {
            id: RuleTemplateId::new(),
            organization_id: org,
            name,
            description,
            category,
            created_at: now,
            updated_at: now,
            deactivated_at: None,
        };
        self.templates.insert(template).await
    }

    pub async fn get(&self, org: OrganizationId, id: RuleTemplateId) -> Result<RuleTemplate> {
        self.templates
            .get(org, id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("rule_template", id.to_string()))
    }

    pub async fn list(&self, org: OrganizationId) -> Result<Vec<RuleTemplate>> {
        self.templates.list_by_org(org).await
    }

    /// Deactivate a template. Spec §4.4 invariant: deactivating a template
    /// implicitly deactivates whichever of its versions is currently
    /// active, so the evaluation engine never runs a rule whose template
    /// has been retired.
    pub async fn deactivate(&self, org: OrganizationId, id: RuleTemplateId) -> Result<RuleTemplate> {
        let mut template = self.get(org, id).await?;
        if template.deactivated_at.is_some() {
            return Ok(template);
        }
        let now = Utc::now();
        template.deactivated_at = Some(now);
        template.updated_at = now;
        let template = self.templates.update(template).await?;

        let versions = self.versions.list_by_template(org, id).await?;
        for mut version in versions.into_iter().filter(|v| v.is_active()) {
            version.deactivated_at = Some(now);
            self.versions.update(version).await?;
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_active_until_deactivated() {
        let now = Utc::now();
        let t = RuleTemplate {
            id: RuleTemplateId::new(),
            organization_id: OrganizationId::new(),
            name: "velocity".into(),
            description: None,
            category: None,
            created_at: now,
            updated_at: now,
            deactivated_at: None,
        };
        assert!(t.is_active());
    }
}
