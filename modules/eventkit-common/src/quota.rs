use crate::types::OrgPlan;

pub const PRO_EVENT_QUOTA: usize = 100;
pub const BASE_EVENT_QUOTA: usize = 10;

/// Maximum number of event definitions a project may hold on `plan`.
pub fn event_quota(plan: &OrgPlan) -> usize {
    match plan {
        OrgPlan::Pro => PRO_EVENT_QUOTA,
        _ => BASE_EVENT_QUOTA,
    }
}

pub fn can_add_event(plan: &OrgPlan, current_count: usize) -> bool {
    current_count < event_quota(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pro_plan_gets_the_larger_quota() {
        assert_eq!(event_quota(&OrgPlan::Pro), 100);
        assert_eq!(event_quota(&OrgPlan::Hobby), 10);
        assert_eq!(event_quota(&OrgPlan::parse("enterprise-trial")), 10);
    }

    #[test]
    fn quota_is_exclusive_upper_bound() {
        assert!(can_add_event(&OrgPlan::Hobby, 9));
        assert!(!can_add_event(&OrgPlan::Hobby, 10));
        assert!(can_add_event(&OrgPlan::parse("PRO"), 99));
    }
}
