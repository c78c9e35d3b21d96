//! Property-based tests for Tab Store operations.
//!
//! For any sequence of adds, closes, activations, updates and reorders the
//! store keeps its structural guarantees: at least one tab, unique ids, and an
//! active pointer that always names a present tab.

use std::collections::HashSet;

use proptest::prelude::*;
use ytdesktop::managers::tab_store::{TabStore, TabStoreTrait};
use ytdesktop::types::navigation::NavigationAction;
use ytdesktop::types::tab::TabPatch;

#[derive(Debug, Clone)]
enum TabOp {
    Add { active: bool },
    Close(usize),
    Activate(usize),
    Retitle(usize),
    Rotate(usize),
    Navigate,
}

fn arb_ops() -> impl Strategy<Value = Vec<TabOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<bool>().prop_map(|active| TabOp::Add { active }),
            3 => (0..20usize).prop_map(TabOp::Close),
            2 => (0..20usize).prop_map(TabOp::Activate),
            1 => (0..20usize).prop_map(TabOp::Retitle),
            1 => (0..20usize).prop_map(TabOp::Rotate),
            1 => Just(TabOp::Navigate),
        ],
        1..80,
    )
}

fn pick(store: &TabStore, idx: usize) -> String {
    let tabs = store.tabs();
    tabs[idx % tabs.len()].id.clone()
}

fn check_invariants(store: &TabStore) -> Result<(), TestCaseError> {
    prop_assert!(store.tab_count() >= 1);
    let ids: HashSet<&str> = store.tabs().iter().map(|t| t.id.as_str()).collect();
    prop_assert_eq!(ids.len(), store.tab_count());
    let active = store.active_tab_id();
    prop_assert!(active.is_some_and(|id| ids.contains(id)));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn store_invariants_hold(ops in arb_ops()) {
        let mut store = TabStore::new();
        let mut seen_ids: HashSet<String> = store.tabs().iter().map(|t| t.id.clone()).collect();

        for op in &ops {
            match op {
                TabOp::Add { active } => {
                    let id = store.add_tab(None, *active, None, None);
                    prop_assert!(seen_ids.insert(id.clone()), "id reused: {}", id);
                    if *active {
                        prop_assert_eq!(store.active_tab_id(), Some(id.as_str()));
                    }
                }
                TabOp::Close(idx) => {
                    let id = pick(&store, *idx);
                    let was_active = store.active_tab_id() == Some(id.as_str());
                    let count = store.tab_count();
                    store.close_tab(&id);
                    prop_assert!(store.get_tab(&id).is_none());
                    if count == 1 {
                        prop_assert_eq!(store.tab_count(), 1);
                        seen_ids.insert(store.tabs()[0].id.clone());
                    } else {
                        prop_assert_eq!(store.tab_count(), count - 1);
                        if was_active {
                            let last = store.tabs().last().map(|t| t.id.as_str());
                            prop_assert_eq!(store.active_tab_id(), last);
                        }
                    }
                }
                TabOp::Activate(idx) => {
                    let id = pick(&store, *idx);
                    store.set_active_tab(&id);
                    prop_assert_eq!(store.active_tab_id(), Some(id.as_str()));
                }
                TabOp::Retitle(idx) => {
                    let id = pick(&store, *idx);
                    store.update_tab(&id, TabPatch { title: Some(format!("t-{}", idx)), ..TabPatch::default() });
                    prop_assert_eq!(store.get_tab(&id).map(|t| t.title.clone()), Some(format!("t-{}", idx)));
                }
                TabOp::Rotate(by) => {
                    let mut order = store.tabs().to_vec();
                    let len = order.len();
                    order.rotate_left(by % len);
                    let active_before = store.active_tab_id().map(str::to_string);
                    prop_assert!(store.reorder_tabs(&order));
                    prop_assert_eq!(store.tabs(), order.as_slice());
                    prop_assert_eq!(store.active_tab_id().map(str::to_string), active_before);
                }
                TabOp::Navigate => {
                    let previous = store.navigation_signal().id.clone();
                    let signal = store.trigger_navigation(Some(NavigationAction::Reload));
                    prop_assert_ne!(signal.id, previous);
                }
            }
            check_invariants(&store)?;
        }
    }
}
