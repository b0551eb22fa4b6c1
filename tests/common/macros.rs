/// Asserts that a concept neuron with the given label lives in the given region.
#[macro_export]
macro_rules! assert_in_region {
    ($brain:expr, $label:expr, $region:expr) => {
        let id = $brain
            .store()
            .find_by_label($label)
            .expect("Concept not found in store");
        let neuron = $brain.store().get(id).expect("Indexed neuron missing");
        assert_eq!(
            neuron.region.as_str(),
            $region,
            "Concept {} is in {} instead of {}",
            $label,
            neuron.region,
            $region
        );
    };
}

/// Asserts a synapse between two labelled neurons and evaluates to its weight.
#[macro_export]
macro_rules! assert_synapse {
    ($brain:expr, $from:expr, $to:expr) => {{
        let store = $brain.store();
        let from = store.find_by_label($from).expect("Source concept missing");
        let to = store.find_by_label($to).expect("Target concept missing");
        store
            .get(from)
            .and_then(|n| n.synapses.iter().find(|s| s.target == to))
            .map(|s| s.weight)
            .unwrap_or_else(|| panic!("No synapse {} -> {}", $from, $to))
    }};
}

/// Asserts that no synapse connects two labelled neurons.
#[macro_export]
macro_rules! assert_no_synapse {
    ($brain:expr, $from:expr, $to:expr) => {
        let store = $brain.store();
        let from = store.find_by_label($from).expect("Source concept missing");
        let to = store.find_by_label($to).expect("Target concept missing");
        let exists = store
            .get(from)
            .is_some_and(|n| n.synapses.iter().any(|s| s.target == to));
        assert!(!exists, "Synapse {} -> {} should not exist", $from, $to);
    };
}

/// Asserts that at least one drained notification matches the pattern.
#[macro_export]
macro_rules! assert_notified {
    ($events:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $events.iter().any(|n| matches!(n, $pattern $(if $guard)?)),
            "Expected notification {} in {:?}",
            stringify!($pattern),
            $events
        );
    };
}
