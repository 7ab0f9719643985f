//! Built-in plan modifiers

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};

/// Marks an attribute as requiring replacement when its value changes
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this value forces a new resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let state = &request.state_value.value;
        let plan = &request.plan_value.value;
        // unknown plans are resolved at apply time; null state means create
        let requires_replace = !state.is_null() && !plan.is_unknown() && state != plan;

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Copies the prior state value into the plan when the plan would be unknown
///
/// Suited to computed attributes the appliance never changes after creation,
/// such as identifiers.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value is carried over from state".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let keep_state = request.plan_value.is_unknown() && !request.state_value.is_null();
        let plan_value = if keep_state {
            request.state_value
        } else {
            request.plan_value
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, Dynamic, DynamicValue};

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: DynamicValue::new(plan.clone()),
            state_value: DynamicValue::new(state),
            plan_value: DynamicValue::new(plan),
            path: AttributePath::new("attr"),
        }
    }

    #[test]
    fn requires_replace_only_on_known_change() {
        let changed = request(
            Dynamic::String("/ifs/a".into()),
            Dynamic::String("/ifs/b".into()),
        );
        assert!(RequiresReplace.modify(changed).requires_replace);

        let same = request(
            Dynamic::String("/ifs/a".into()),
            Dynamic::String("/ifs/a".into()),
        );
        assert!(!RequiresReplace.modify(same).requires_replace);

        let unknown = request(Dynamic::String("/ifs/a".into()), Dynamic::Unknown);
        assert!(!RequiresReplace.modify(unknown).requires_replace);

        let create = request(Dynamic::Null, Dynamic::String("/ifs/a".into()));
        assert!(!RequiresReplace.modify(create).requires_replace);
    }

    #[test]
    fn use_state_for_unknown_keeps_prior_value() {
        let response = UseStateForUnknown.modify(request(Dynamic::Number(7.0), Dynamic::Unknown));
        assert_eq!(response.plan_value.value, Dynamic::Number(7.0));

        let response = UseStateForUnknown.modify(request(Dynamic::Null, Dynamic::Unknown));
        assert!(response.plan_value.is_unknown());
    }
}
