use crate::k8s::{ConditionStatus, ConditionType, Time, VerticalPodAutoscalerCondition};
use chrono::{offset::Utc, DateTime};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// The conditions of a single autoscaler, keyed by type.
///
/// Callers never stamp transition times themselves: [`Conditions::set`]
/// moves `last_transition_time` only when a condition's status changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conditions(BTreeMap<ConditionType, Condition>);

// === impl Conditions ===

impl Conditions {
    pub fn get(&self, type_: ConditionType) -> Option<&Condition> {
        self.0.get(&type_)
    }

    pub fn set(
        &mut self,
        type_: ConditionType,
        status: impl Into<ConditionStatus>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.set_at(type_, status, reason, message, Utc::now())
    }

    /// Like [`Conditions::set`], with an explicit clock.
    pub fn set_at(
        &mut self,
        type_: ConditionType,
        status: impl Into<ConditionStatus>,
        reason: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let status = status.into();
        let last_transition_time = match self.0.get(&type_) {
            Some(prior) if prior.status == status => prior.last_transition_time.or(Some(now)),
            _ => Some(now),
        };
        self.0.insert(
            type_,
            Condition {
                status,
                reason: reason.into(),
                message: message.into(),
                last_transition_time,
            },
        );
    }

    pub fn remove(&mut self, type_: ConditionType) -> Option<Condition> {
        self.0.remove(&type_)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConditionType, &Condition)> + '_ {
        self.0.iter().map(|(t, c)| (*t, c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares condition types, statuses, reasons and messages, ignoring
    /// transition times.
    pub fn same_as(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().all(|(type_, c)| {
                other.0.get(type_).map_or(false, |o| {
                    c.status == o.status && c.reason == o.reason && c.message == o.message
                })
            })
    }

    /// Renders the conditions as they are persisted, ordered by type.
    pub fn to_list(&self) -> Vec<VerticalPodAutoscalerCondition> {
        self.0
            .iter()
            .map(|(type_, c)| VerticalPodAutoscalerCondition {
                type_: *type_,
                status: c.status,
                last_transition_time: c.last_transition_time.map(Time),
                reason: Some(c.reason.clone()).filter(|r| !r.is_empty()),
                message: Some(c.message.clone()).filter(|m| !m.is_empty()),
            })
            .collect()
    }
}

/// Duplicate types in a persisted list collapse to the last entry.
impl<'c> FromIterator<&'c VerticalPodAutoscalerCondition> for Conditions {
    fn from_iter<T: IntoIterator<Item = &'c VerticalPodAutoscalerCondition>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|c| {
                    let condition = Condition {
                        status: c.status,
                        reason: c.reason.clone().unwrap_or_default(),
                        message: c.message.clone().unwrap_or_default(),
                        last_transition_time: c.last_transition_time.as_ref().map(|Time(t)| *t),
                    };
                    (c.type_, condition)
                })
                .collect(),
        )
    }
}
