use crate::{k8s, matcher::pod_matches_vpa, vpa::VpaWithSelector};
use std::cmp::Ordering;

/// Selects the autoscaler that governs a pod.
///
/// When several autoscalers match, the oldest one wins, so that creating an
/// overlapping autoscaler never takes a pod away from the one already
/// governing it. Autoscalers without a creation timestamp sort after those
/// with one. Ties are broken by name; all candidates that match a pod share
/// its namespace.
pub fn controlling_vpa_for_pod<'v>(
    pod: &k8s::Pod,
    vpas: impl IntoIterator<Item = &'v VpaWithSelector>,
) -> Option<&'v VpaWithSelector> {
    vpas.into_iter()
        .filter(|vpa| pod_matches_vpa(pod, vpa))
        .min_by(|a, b| oldest_then_name(a, b))
}

fn oldest_then_name(a: &VpaWithSelector, b: &VpaWithSelector) -> Ordering {
    let (a, b) = (&a.vpa.metadata, &b.vpa.metadata);
    let by_ts = match (&a.creation_timestamp, &b.creation_timestamp) {
        (Some(k8s::Time(a_ts)), Some(k8s::Time(b_ts))) => a_ts.cmp(b_ts),
        (None, None) => Ordering::Equal,
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
    };
    by_ts.then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{mk_pod, mk_vpa, selector};

    fn name(vpa: Option<&VpaWithSelector>) -> Option<&str> {
        vpa.and_then(|v| v.vpa.metadata.name.as_deref())
    }

    #[test]
    fn oldest_matching_vpa_wins_regardless_of_order() {
        let pod = mk_pod("test", "test-pod", vec![("app", "testingApp")]);
        let a = VpaWithSelector::new(mk_vpa("test", "a", 5), selector("app", "testingApp"));
        let b = VpaWithSelector::new(mk_vpa("test", "b", 10), selector("app", "testingApp"));
        let non_matching = VpaWithSelector::new(mk_vpa("test", "n", 2), selector("app", "other"));

        for candidates in [
            vec![&b, &a, &non_matching],
            vec![&a, &b, &non_matching],
            vec![&non_matching, &b, &a],
        ] {
            let chosen = controlling_vpa_for_pod(&pod, candidates);
            assert_eq!(name(chosen), Some("a"));
        }
    }

    #[test]
    fn no_match_is_none() {
        let pod = mk_pod("test", "test-pod", vec![("app", "testingApp")]);
        let other_ns = VpaWithSelector::new(mk_vpa("other", "a", 1), selector("app", "testingApp"));
        let other_app = VpaWithSelector::new(mk_vpa("test", "b", 1), selector("app", "other"));
        assert!(controlling_vpa_for_pod(&pod, [&other_ns, &other_app]).is_none());
        assert!(controlling_vpa_for_pod(&pod, std::iter::empty()).is_none());
    }

    #[test]
    fn equal_timestamps_break_ties_by_name() {
        let pod = mk_pod("test", "test-pod", vec![("app", "testingApp")]);
        let alpha = VpaWithSelector::new(mk_vpa("test", "alpha", 7), selector("app", "testingApp"));
        let beta = VpaWithSelector::new(mk_vpa("test", "beta", 7), selector("app", "testingApp"));

        assert_eq!(name(controlling_vpa_for_pod(&pod, [&beta, &alpha])), Some("alpha"));
        assert_eq!(name(controlling_vpa_for_pod(&pod, [&alpha, &beta])), Some("alpha"));
    }

    #[test]
    fn timestamped_vpa_preferred_over_untimestamped() {
        let pod = mk_pod("test", "test-pod", vec![("app", "testingApp")]);
        let mut unstamped = mk_vpa("test", "aaa", 0);
        unstamped.metadata.creation_timestamp = None;
        let unstamped = VpaWithSelector::new(unstamped, selector("app", "testingApp"));
        let stamped = VpaWithSelector::new(mk_vpa("test", "zzz", 100), selector("app", "testingApp"));

        assert_eq!(name(controlling_vpa_for_pod(&pod, [&unstamped, &stamped])), Some("zzz"));
    }
}
