//! Rule Version Service (spec §4.5).
//!
//! A version is immutable once created: its `conditions`, `actions`,
//! `priority`, `window` and `parent_version_id` never change after
//! [`RuleVersionService::create`] returns. Only its activation lifecycle
//! (`active_at` / `deactivated_at`) mutates afterwards.

use crate::condition::ConditionNode;
use crate::error::{ComplianceError, Result};
use crate::model::ActionDefinition;
use crate::repository::traits::RuleVersionRepository;
use crate::types::{OrganizationId, RuleTemplateId, RuleVersionId};
use crate::validator;
use crate::window::WindowSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Maximum depth of a version's inheritance chain (spec §4.5 invariant).
pub const MAX_INHERITANCE_DEPTH: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleVersion {
    pub id: RuleVersionId,
    pub template_id: RuleTemplateId,
    pub organization_id: OrganizationId,
    /// Monotonically increasing within a template, starting at 1.
    pub version: i32,
    pub parent_version_id: Option<RuleVersionId>,
    /// The conditions authored on this version, unmerged.
    pub conditions: Json,
    /// `conditions` merged with the full parent chain's effective
    /// conditions (spec §4.5): `{"all": [conditions, parent.effective_conditions]}`
    /// when a parent exists, else equal to `conditions`.
    pub effective_conditions: Json,
    pub actions: Vec<ActionDefinition>,
    pub priority: i32,
    pub window: Option<WindowSpec>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    /// Set when this version becomes the template's active version.
    pub active_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl RuleVersion {
    /// A version is "active" for evaluation purposes when it has been
    /// activated and not since deactivated. Per spec §9 open question 2,
    /// [`crate::rules::selector::RuleVersionSelector`] consults only this —
    /// `enabled` is authoring-time metadata, not an evaluation gate.
    pub fn is_active(&self) -> bool {
        self.active_at.is_some() && self.deactivated_at.is_none()
    }
}

pub struct RuleVersionService<'a> {
    versions: &'a dyn RuleVersionRepository,
}

impl<'a> RuleVersionService<'a> {
    pub fn new(versions: &'a dyn RuleVersionRepository) -> Self {
        Self { versions }
    }

    /// Create a new immutable version. `parent_version_id`, if given, must
    /// resolve to a version in the same org whose chain (including the new
    /// version) does not exceed [`MAX_INHERITANCE_DEPTH`] and does not cycle
    /// back to itself.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        org: OrganizationId,
        template_id: RuleTemplateId,
        conditions: Json,
        actions: Vec<ActionDefinition>,
        priority: i32,
        window: Option<WindowSpec>,
        parent_version_id: Option<RuleVersionId>,
        created_by: Option<String>,
    ) -> Result<RuleVersion> {
        let outcome = validator::validate(&conditions);
        if !outcome.valid {
            return Err(ComplianceError::ValidationError(outcome.errors));
        }

        let effective_conditions = match parent_version_id {
            Some(parent_id) => {
                let parent = self.load_validated_parent(org, parent_id).await?;
                json_merge_all(&conditions, &parent.effective_conditions)
            }
            None => conditions.clone(),
        };
        let merged_outcome = validator::validate(&effective_conditions);
        if !merged_outcome.valid {
            return Err(ComplianceError::ValidationError(merged_outcome.errors));
        }

        let existing = self.versions.list_by_template(org, template_id).await?;
        let next_version = existing.iter().map(|v| v.version).max().unwrap_or(0) + 1;

        let version = RuleVersion {
            id: RuleVersionId::new(),
            template_id,
            organization_id: org,
            version: next_version,
            parent_version_id,
            conditions,
            effective_conditions,
            actions,
            priority,
            window,
            enabled: true,
            created_at: Utc::now(),
            created_by,
            active_at: None,
            deactivated_at: None,
        };
        self.versions.insert(version).await
    }

    /// Load `parent_id` and confirm walking its ancestor chain neither
    /// cycles nor exceeds [`MAX_INHERITANCE_DEPTH`], before a new version
    /// is allowed to attach to it as a child.
    async fn load_validated_parent(&self, org: OrganizationId, parent_id: RuleVersionId) -> Result<RuleVersion> {
        let parent = self
            .versions
            .get(org, parent_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("rule_version", parent_id.to_string()))?;

        let mut seen = std::collections::HashSet::new();
        seen.insert(parent_id);
        let mut current = parent.parent_version_id;
        let mut depth = 1usize;
        while let Some(ancestor_id) = current {
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                return Err(ComplianceError::business_rule(
                    "INHERITANCE_TOO_DEEP",
                    format!("inheritance chain exceeds {MAX_INHERITANCE_DEPTH} levels"),
                ));
            }
            if !seen.insert(ancestor_id) {
                return Err(ComplianceError::business_rule(
                    "INHERITANCE_CYCLE",
                    format!("cycle detected in inheritance chain at {ancestor_id}"),
                ));
            }
            let ancestor = self
                .versions
                .get(org, ancestor_id)
                .await?
                .ok_or_else(|| ComplianceError::not_found("rule_version", ancestor_id.to_string()))?;
            current = ancestor.parent_version_id;
        }
        Ok(parent)
    }

    /// Activate `version_id`, deactivating whatever other version of the
    /// same template is currently active (spec §4.5 invariant: at most one
    /// active version per template).
    pub async fn activate(&self, org: OrganizationId, version_id: RuleVersionId) -> Result<RuleVersion> {
        let mut target = self
            .versions
            .get(org, version_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("rule_version", version_id.to_string()))?;

        let siblings = self.versions.list_by_template(org, target.template_id).await?;
        let now = Utc::now();
        for mut sibling in siblings.into_iter().filter(|v| v.is_active() && v.id != version_id) {
            sibling.deactivated_at = Some(now);
            self.versions.update(sibling).await?;
        }

        target.active_at = Some(now);
        target.deactivated_at = None;
        self.versions.update(target).await
    }

    pub async fn deactivate(&self, org: OrganizationId, version_id: RuleVersionId) -> Result<RuleVersion> {
        let mut version = self
            .versions
            .get(org, version_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("rule_version", version_id.to_string()))?;
        version.deactivated_at = Some(Utc::now());
        self.versions.update(version).await
    }

    pub async fn find_active_versions(&self, org: OrganizationId) -> Result<Vec<RuleVersion>> {
        self.versions.find_active_versions(org).await
    }
}

/// Merge a version's own conditions with its parent's effective
/// conditions into `{"all": [own, parent]}` (spec §4.5). Degenerates to
/// `own` unchanged when there is no parent.
fn json_merge_all(own: &Json, parent_effective: &Json) -> Json {
    serde_json::json!({ "all": [own, parent_effective] })
}

/// Deserialize `effective_conditions` into the typed tree the engine
/// evaluates against.
pub fn parse_effective_conditions(version: &RuleVersion) -> Result<ConditionNode> {
    serde_json::from_value(version.effective_conditions.clone()).map_err(ComplianceError::from)
}
