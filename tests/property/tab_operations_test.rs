//! Property-based tests for the tab collection.
//!
//! For any sequence of opens, closes and activations the collection is never
//! empty, ids stay unique and the active id names an existing tab.

use std::collections::HashSet;

use proptest::prelude::*;
use zentabs::managers::tab_store::{TabStore, TabStoreTrait};
use zentabs::types::tab::BLANK_URL;

#[derive(Debug, Clone)]
enum TabOp {
    Add,
    Close(usize), // index into the current order
    Activate(usize),
    CloseUnknown,
}

fn arb_tab_ops() -> impl Strategy<Value = Vec<TabOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(TabOp::Add),
            3 => (0..20usize).prop_map(TabOp::Close),
            2 => (0..20usize).prop_map(TabOp::Activate),
            1 => Just(TabOp::CloseUnknown),
        ],
        1..80,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn active_tab_always_exists(ops in arb_tab_ops()) {
        let mut store = TabStore::new();

        for op in &ops {
            let order = store.get_tab_order();
            match op {
                TabOp::Add => {
                    let id = store.add_tab(BLANK_URL, "New Tab");
                    prop_assert_eq!(store.active_tab_id(), id.as_str());
                }
                TabOp::Close(i) => {
                    let id = order[i % order.len()].clone();
                    let was_last = order.len() == 1;
                    store.remove_tab(&id).unwrap();
                    prop_assert!(store.get_tab(&id).is_none());
                    if was_last {
                        let active = store.get_active_tab();
                        prop_assert_eq!(active.url.as_str(), BLANK_URL);
                    } else {
                        prop_assert_eq!(store.tab_count(), order.len() - 1);
                    }
                }
                TabOp::Activate(i) => {
                    let id = order[i % order.len()].clone();
                    store.set_active_tab(&id).unwrap();
                    prop_assert_eq!(store.active_tab_id(), id.as_str());
                }
                TabOp::CloseUnknown => {
                    store.remove_tab("not-a-tab").unwrap();
                    prop_assert_eq!(store.tab_count(), order.len());
                }
            }

            prop_assert!(store.tab_count() >= 1);
            prop_assert!(store.get_tab(store.active_tab_id()).is_some());
            let ids: HashSet<String> = store.get_tab_order().into_iter().collect();
            prop_assert_eq!(ids.len(), store.tab_count());
        }
    }
}
