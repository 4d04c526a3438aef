use crate::{k8s, vpa::VpaWithSelector};

/// Returns true if the pod lives in the autoscaler's namespace and its labels
/// satisfy the autoscaler's selector.
pub fn pod_matches_vpa(pod: &k8s::Pod, vpa: &VpaWithSelector) -> bool {
    if pod.metadata.namespace != vpa.vpa.metadata.namespace {
        return false;
    }

    match pod.metadata.labels.as_ref() {
        Some(labels) => vpa.selector.matches(labels),
        None => vpa.selector.matches(&Default::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{mk_pod, mk_vpa, selector};
    use rstest::rstest;

    #[rstest]
    #[case::matching_selector("test", "app", "testingApp", true)]
    #[case::other_namespace("other", "app", "testingApp", false)]
    #[case::other_label_value("test", "app", "other", false)]
    #[case::missing_label_key("test", "tier", "testingApp", false)]
    fn matches_namespace_and_labels(
        #[case] vpa_namespace: &str,
        #[case] key: &'static str,
        #[case] value: &'static str,
        #[case] expected: bool,
    ) {
        let pod = mk_pod("test", "test-pod", vec![("app", "testingApp")]);
        let vpa = VpaWithSelector::new(mk_vpa(vpa_namespace, "vpa", 0), selector(key, value));
        assert_eq!(pod_matches_vpa(&pod, &vpa), expected);
    }

    #[test]
    fn empty_selector_matches_every_pod_in_namespace() {
        let vpa = VpaWithSelector::new(mk_vpa("test", "vpa", 0), Default::default());
        assert!(pod_matches_vpa(&mk_pod("test", "labeled", vec![("app", "a")]), &vpa));
        assert!(pod_matches_vpa(&mk_pod("test", "unlabeled", vec![]), &vpa));
        assert!(!pod_matches_vpa(&mk_pod("other", "unlabeled", vec![]), &vpa));
    }
}
