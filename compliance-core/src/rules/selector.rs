//! Rule Version Selector (spec §4.5) — pure filtering/sorting of the
//! active-version set the evaluation engine consumes, plus a conflict
//! check run at authoring time.

use crate::rules::version::RuleVersion;

/// Keep only versions that are active for evaluation purposes, sorted by
/// `priority` ascending then `id` for a stable tie-break. Per spec §9 open
/// question 2, this looks only at [`RuleVersion::is_active`] (which is
/// `active_at.is_some() && deactivated_at.is_none()`) — `enabled` is
/// authoring metadata, not consulted here.
pub fn select_for_evaluation(versions: &[RuleVersion]) -> Vec<&RuleVersion> {
    let mut selected: Vec<&RuleVersion> = versions.iter().filter(|v| v.is_active()).collect();
    selected.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
    selected
}

/// Two versions of the *same template* must never both be active at once
/// (enforced transactionally by [`crate::rules::version::RuleVersionService::activate`]);
/// this is a defense-in-depth check for callers that assemble a version
/// set from outside that service (e.g. a bulk import).
pub fn validate_no_conflicts(versions: &[RuleVersion]) -> Result<(), Vec<String>> {
    let mut by_template: std::collections::HashMap<_, Vec<&RuleVersion>> = std::collections::HashMap::new();
    for v in versions.iter().filter(|v| v.is_active()) {
        by_template.entry(v.template_id).or_default().push(v);
    }
    let errors: Vec<String> = by_template
        .into_iter()
        .filter(|(_, vs)| vs.len() > 1)
        .map(|(template_id, vs)| {
            format!(
                "template {template_id} has {} concurrently active versions: {:?}",
                vs.len(),
                vs.iter().map(|v| v.id.to_string()).collect::<Vec<_>>()
            )
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrganizationId, RuleTemplateId, RuleVersionId};
    use chrono::Utc;
    use serde_json::json;

    fn version(template: RuleTemplateId, priority: i32, active: bool) -> RuleVersion {
        let now = Utc::now();
        RuleVersion {
            id: RuleVersionId::new(),
            template_id: template,
            organization_id: OrganizationId::new(),
            version: 1,
            parent_version_id: None,
            conditions: json!({"fact": "a", "operator": "exists"}),
            effective_conditions: json!({"fact": "a", "operator": "exists"}),
            actions: vec![],
            priority,
            window: None,
            enabled: true,
            created_at: now,
            created_by: None,
            active_at: active.then_some(now),
            deactivated_at: None,
        }
    }

    #[test]
    fn select_drops_inactive_and_sorts_by_priority() {
        let t = RuleTemplateId::new();
        let v1 = version(t, 10, true);
        let v2 = version(t, 5, true);
        let v3 = version(t, 1, false);
        let selected = select_for_evaluation(&[v1.clone(), v2.clone(), v3]);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, v2.id);
        assert_eq!(selected[1].id, v1.id);
    }

    #[test]
    fn validate_no_conflicts_flags_two_active_versions_of_same_template() {
        let t = RuleTemplateId::new();
        let v1 = version(t, 1, true);
        let v2 = version(t, 2, true);
        assert!(validate_no_conflicts(&[v1, v2]).is_err());
    }

    #[test]
    fn validate_no_conflicts_ignores_inactive_versions() {
        let t = RuleTemplateId::new();
        let v1 = version(t, 1, true);
        let v2 = version(t, 2, false);
        assert!(validate_no_conflicts(&[v1, v2]).is_ok());
    }
}
