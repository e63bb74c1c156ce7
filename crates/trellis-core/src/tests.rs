#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, HashSet};
    use std::rc::Rc;

    use crate::prelude::*;
    use crate::stats;

    fn counter() -> (Rc<Cell<usize>>, impl Fn() + Clone) {
        let runs = Rc::new(Cell::new(0));
        let bump = {
            let runs = runs.clone();
            move || runs.set(runs.get() + 1)
        };
        (runs, bump)
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
    }

    #[test]
    fn test_effect_reruns_once_per_change() {
        let count = signal(0);
        let (runs, bump) = counter();
        let _e = effect({
            let count = count.clone();
            move || {
                count.get();
                bump();
            }
        });
        assert_eq!(runs.get(), 1);

        count.set(1);
        count.set(2);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_identical_write_is_silent() {
        let count = signal(7);
        let (runs, bump) = counter();
        let _e = effect({
            let count = count.clone();
            move || {
                count.get();
                bump();
            }
        });
        count.set(7);
        assert_eq!(runs.get(), 1);
        assert_eq!(count.try_set(7), Ok(false));
    }

    #[test]
    fn test_dependencies_follow_the_last_run() {
        let flag = signal(true);
        let a = signal(1);
        let b = signal(2);
        let (runs, bump) = counter();
        let e = effect({
            let (flag, a, b) = (flag.clone(), a.clone(), b.clone());
            move || {
                if flag.get() {
                    a.get();
                } else {
                    b.get();
                }
                bump();
            }
        });
        assert_eq!(e.dependency_count(), 2);

        flag.set(false);
        assert_eq!(runs.get(), 2);
        assert_eq!(a.subscriber_count(), 0);

        a.set(10);
        assert_eq!(runs.get(), 2);
        b.set(20);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_untracked_reads_are_not_dependencies() {
        let a = signal(1);
        let (runs, bump) = counter();
        let _e = effect({
            let a = a.clone();
            move || {
                untracked(|| a.get());
                a.get_untracked();
                bump();
            }
        });
        a.set(2);
        assert_eq!(runs.get(), 1);
        assert_eq!(a.subscriber_count(), 0);
    }

    #[test]
    fn test_dispose_stops_effect() {
        let a = signal(0);
        let (runs, bump) = counter();
        let e = effect({
            let a = a.clone();
            move || {
                a.get();
                bump();
            }
        });
        e.dispose();
        e.dispose();
        assert!(e.is_disposed());
        a.set(1);
        assert_eq!(runs.get(), 1);
        assert_eq!(a.subscriber_count(), 0);
    }

    #[test]
    fn test_nested_effect_is_recreated_with_parent() {
        let outer = signal(0);
        let inner = signal(0);
        let (inner_runs, bump) = counter();
        let _e = effect({
            let (outer, inner) = (outer.clone(), inner.clone());
            move || {
                outer.get();
                let inner = inner.clone();
                let bump = bump.clone();
                effect(move || {
                    inner.get();
                    bump();
                });
            }
        });
        assert_eq!(inner.subscriber_count(), 1);

        outer.set(1);
        outer.set(2);
        // The previous child is torn down before each re-run.
        assert_eq!(inner.subscriber_count(), 1);

        inner_runs.set(0);
        inner.set(1);
        assert_eq!(inner_runs.get(), 1);
    }

    #[test]
    fn test_effect_writing_its_own_source_does_not_recurse() {
        let a = signal(0);
        let (runs, bump) = counter();
        let _e = effect({
            let a = a.clone();
            move || {
                let v = a.get();
                bump();
                if v < 5 {
                    a.set(v + 1);
                }
            }
        });
        assert_eq!(runs.get(), 1);
        assert_eq!(a.get_untracked(), 1);
    }

    #[test]
    fn test_mutual_writes_settle() {
        let a = signal(0);
        let b = signal(0);
        let _ea = effect({
            let (a, b) = (a.clone(), b.clone());
            move || b.set(a.get() + 1)
        });
        let _eb = effect({
            let (a, b) = (a.clone(), b.clone());
            move || a.set(b.get() + 1)
        });
        // The second effect's write re-runs the first, whose write back is
        // dropped because the second is still running.
        assert_eq!((a.get(), b.get()), (2, 3));
    }

    #[test]
    #[should_panic(expected = "change propagation nested deeper")]
    fn test_deep_propagation_chain_hits_depth_limit() {
        let _ = env_logger::builder().is_test(true).try_init();
        configure(ReactiveConfig {
            max_propagation_depth: 8,
        });
        let cells: Vec<Signal<u32>> = (0..12).map(|_| signal(0)).collect();
        let _effects: Vec<Effect> = cells
            .windows(2)
            .map(|pair| {
                let (from, to) = (pair[0].clone(), pair[1].clone());
                effect(move || to.set(from.get()))
            })
            .collect();
        cells[0].set(1);
    }

    #[test]
    fn test_disposed_signal_rejects_writes() {
        let a = signal(1);
        a.dispose();
        assert!(a.is_disposed());
        assert_eq!(a.try_set(2), Err(ReactiveError::Disposed(a.id())));
        assert_eq!(a.get(), 1);
    }

    #[test]
    fn test_trigger() {
        let trigger = Trigger::new();
        let (runs, bump) = counter();
        let _e = effect({
            let trigger = trigger.clone();
            move || {
                trigger.track();
                bump();
            }
        });
        trigger.notify();
        trigger.notify();
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_derived_is_lazy_and_cached() {
        let first = signal("Jane".to_string());
        let last = signal("Doe".to_string());
        let (computes, bump) = counter();
        let full = derived({
            let (first, last) = (first.clone(), last.clone());
            move || {
                bump();
                format!("{} {}", first.get(), last.get())
            }
        });
        assert_eq!(computes.get(), 0);
        assert_eq!(full.get(), "Jane Doe");
        assert_eq!(full.get(), "Jane Doe");
        assert_eq!(computes.get(), 1);

        last.set("Roe".to_string());
        assert!(full.is_dirty());
        assert_eq!(computes.get(), 1);
        assert_eq!(full.get(), "Jane Roe");
        assert_eq!(computes.get(), 2);
    }

    #[test]
    fn test_diamond_effect_runs_once_per_write() {
        let s = signal(1);
        let d = derived({
            let s = s.clone();
            move || s.get() * 2
        });
        let (runs, bump) = counter();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (s, d, seen) = (s.clone(), d.clone(), seen.clone());
            move || {
                seen.borrow_mut().push((d.get(), s.get()));
                bump();
            }
        });
        assert_eq!(runs.get(), 1);

        s.set(5);
        assert_eq!(runs.get(), 2);
        assert_eq!(*seen.borrow(), [(2, 1), (10, 5)]);
    }

    #[test]
    fn test_diamond_reading_source_first_sees_fresh_derived() {
        let s = signal(1);
        let d = derived({
            let s = s.clone();
            move || s.get() + 100
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (s, d, seen) = (s.clone(), d.clone(), seen.clone());
            move || {
                let direct = s.get();
                seen.borrow_mut().push((direct, d.get()));
            }
        });

        s.set(2);
        s.set(3);
        assert_eq!(*seen.borrow(), [(1, 101), (2, 102), (3, 103)]);
    }

    #[test]
    fn test_chained_derived_reaches_effect_once() {
        let s = signal(1);
        let doubled = derived({
            let s = s.clone();
            move || s.get() * 2
        });
        let summed = derived({
            let (s, doubled) = (s.clone(), doubled.clone());
            move || s.get() + doubled.get()
        });
        let (runs, bump) = counter();
        let _e = effect({
            let (s, doubled, summed) = (s.clone(), doubled.clone(), summed.clone());
            move || {
                s.get();
                doubled.get();
                summed.get();
                bump();
            }
        });

        s.set(2);
        assert_eq!(runs.get(), 2);
        assert_eq!(summed.get(), 6);
    }

    #[test]
    fn test_derived_with_may_write_its_inputs() {
        let s = signal(5);
        let d = derived({
            let s = s.clone();
            move || s.get() * 2
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (d, seen) = (d.clone(), seen.clone());
            move || seen.borrow_mut().push(d.get())
        });

        d.with(|v| s.set(*v + 1));
        assert_eq!(s.get(), 11);
        assert_eq!(*seen.borrow(), [10, 22]);
        assert_eq!(d.get(), 22);
    }

    #[test]
    fn test_signal_with_may_write_itself() {
        let s = signal(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (s, seen) = (s.clone(), seen.clone());
            move || s.with(|v| seen.borrow_mut().push(*v))
        });

        s.with(|v| s.set(v + 1));
        s.with_untracked(|v| s.update(|n| *n += v));
        assert_eq!(s.get(), 4);
        assert_eq!(*seen.borrow(), [1, 2, 4]);
    }

    #[test]
    fn test_effect_over_derived() {
        let n = signal(2);
        let doubled = derived({
            let n = n.clone();
            move || n.get() * 2
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (doubled, seen) = (doubled.clone(), seen.clone());
            move || seen.borrow_mut().push(doubled.get())
        });
        n.set(5);
        assert_eq!(*seen.borrow(), [4, 10]);
    }

    #[test]
    fn test_writable_derived() {
        let celsius = signal(100.0_f64);
        let fahrenheit = Derived::writable(
            {
                let c = celsius.clone();
                move || c.get() * 9.0 / 5.0 + 32.0
            },
            {
                let c = celsius.clone();
                move |f: f64| c.set((f - 32.0) * 5.0 / 9.0)
            },
        );
        assert_eq!(fahrenheit.get(), 212.0);
        fahrenheit.set(32.0);
        assert_eq!(celsius.get(), 0.0);
        assert_eq!(fahrenheit.get(), 32.0);
    }

    #[test]
    fn test_watch_reports_previous_value() {
        let n = signal(1);
        let log = Rc::new(RefCell::new(Vec::new()));
        let _w = watch(
            {
                let n = n.clone();
                move || n.get() / 10
            },
            {
                let log = log.clone();
                move |next: &i32, prev: Option<&i32>| log.borrow_mut().push((*next, prev.copied()))
            },
        );
        n.set(5);
        n.set(12);
        assert_eq!(*log.borrow(), [(0, None), (1, Some(0))]);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let cleaned_up = Rc::new(Cell::new(0));

        let scope = Scope::new();
        let cleaned_up_clone = cleaned_up.clone();
        scope.add_disposer(move || cleaned_up_clone.set(cleaned_up_clone.get() + 1));

        assert_eq!(cleaned_up.get(), 0);
        scope.dispose();
        scope.dispose();
        assert_eq!(cleaned_up.get(), 1);
        assert!(scope.is_disposed());
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned_up = Rc::new(Cell::new(false));
        {
            let scope = Scope::new();
            let flag = cleaned_up.clone();
            scope.add_disposer(move || flag.set(true));
        }
        assert!(cleaned_up.get());
    }

    #[test]
    fn test_scope_teardown_in_insertion_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let push = |label: &'static str| {
            let order = order.clone();
            move || order.borrow_mut().push(label)
        };
        let parent = Scope::new();
        parent.add_disposer(push("parent-1"));
        let child = parent.child();
        child.add_disposer(push("child-1"));
        parent.add_disposer(push("parent-2"));
        child.add_disposer(push("child-2"));
        assert_eq!(parent.len(), 3);

        parent.dispose();
        assert_eq!(*order.borrow(), ["parent-1", "child-1", "child-2", "parent-2"]);
        assert!(child.is_disposed());
    }

    #[test]
    fn test_scope_drop_tears_down_in_insertion_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let parent = Scope::new();
            let first = order.clone();
            parent.add_disposer(move || first.borrow_mut().push("own"));
            let child = parent.child();
            let second = order.clone();
            child.add_disposer(move || second.borrow_mut().push("child"));
        }
        assert_eq!(*order.borrow(), ["own", "child"]);
    }

    #[test]
    fn test_disposed_child_leaves_parent() {
        let parent = Scope::new();
        let child = parent.child();
        assert_eq!(parent.len(), 1);
        child.dispose();
        assert!(parent.is_empty());
    }

    #[test]
    fn test_late_disposer_runs_immediately() {
        let scope = Scope::new();
        scope.dispose();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        scope.add_disposer(move || flag.set(true));
        assert!(ran.get());
    }

    #[test]
    fn test_scope_owns_effects_and_cleanups() {
        let a = signal(0);
        let cleaned = Rc::new(Cell::new(false));
        let scope = Scope::new();
        scope.run(|| {
            let a = a.clone();
            effect(move || {
                a.get();
            });
            let cleaned = cleaned.clone();
            assert!(on_cleanup(move || cleaned.set(true)));
        });
        assert_eq!(a.subscriber_count(), 1);
        scope.dispose();
        assert_eq!(a.subscriber_count(), 0);
        assert!(cleaned.get());
        assert!(current_scope().is_none());
    }

    #[test]
    fn test_scope_restored_after_panic() {
        let scope = Scope::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scope.run(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(current_scope().is_none());
    }

    #[test]
    fn test_scoped_effect_cleanup() {
        let cleaned = Rc::new(Cell::new(0));
        let scope = Scope::new();
        scope.run(|| {
            let cleaned = cleaned.clone();
            scoped_effect(move || Dispose::new(move || cleaned.set(cleaned.get() + 1)));
        });
        scope.dispose();
        assert_eq!(cleaned.get(), 1);
    }

    #[test]
    fn test_store_field_projection() {
        #[derive(Clone, Debug, PartialEq)]
        struct User {
            name: String,
            age: u32,
        }
        let user = reactive(User {
            name: "Ada".into(),
            age: 36,
        });
        let age = user.project(|u| &u.age, |u| &mut u.age);
        let (runs, bump) = counter();
        let _e = effect({
            let age = age.clone();
            move || {
                age.get();
                bump();
            }
        });
        age.set(37);
        assert_eq!(runs.get(), 2);
        assert_eq!(user.get().map(|u| u.age), Some(37));
    }

    #[test]
    fn test_store_vec_mutators_notify() {
        let list = reactive(vec![3, 1, 2]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (list, seen) = (list.clone(), seen.clone());
            move || seen.borrow_mut().push(list.get().unwrap_or_default())
        });

        list.push(4);
        list.sort();
        assert_eq!(list.pop(), Some(4));
        assert_eq!(list.remove_first(), Some(1));
        list.prepend(0);
        list.reverse();
        assert_eq!(list.splice(1..10, [9]), vec![2, 0]);
        list.clear();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 9);
        assert_eq!(seen[1], [3, 1, 2, 4]);
        assert_eq!(seen[2], [1, 2, 3, 4]);
        assert_eq!(seen[7], [3, 9]);
        assert!(seen[8].is_empty());
    }

    #[test]
    fn test_store_mutators_that_change_nothing_do_not_notify() {
        let list: Store<Vec<u32>> = reactive(Vec::new());
        let scores: Store<BTreeMap<String, u32>> = reactive(BTreeMap::new());
        let tags: Store<HashSet<&'static str>> = reactive(HashSet::from(["x"]));
        let (runs, bump) = counter();
        let _e = effect({
            let (list, scores, tags) = (list.clone(), scores.clone(), tags.clone());
            move || {
                list.len();
                scores.len();
                tags.len();
                bump();
            }
        });

        assert_eq!(list.pop(), None);
        assert_eq!(list.remove_first(), None);
        list.clear();
        assert!(list.set(Vec::new()));
        assert!(list.splice(0..3, []).is_empty());
        list.sort();
        list.reverse();
        assert_eq!(scores.remove(&"ada".to_string()), None);
        scores.clear();
        assert!(!tags.insert("x"));
        assert!(!tags.remove(&"y"));
        assert_eq!(runs.get(), 1);

        list.push(2);
        list.push(1);
        list.sort();
        list.sort();
        assert!(list.set(vec![1, 2]));
        tags.clear();
        tags.clear();
        assert_eq!(runs.get(), 5);
    }

    #[test]
    fn test_store_item_out_of_range() {
        let list = reactive(vec!["a".to_string()]);
        let second = list.item(1);
        assert_eq!(second.get(), None);
        assert!(!second.set("b".to_string()));
        list.push("b".to_string());
        assert_eq!(second.get().as_deref(), Some("b"));
    }

    #[test]
    fn test_store_map_and_set() {
        let scores: Store<BTreeMap<String, u32>> = reactive(BTreeMap::new());
        let tags: Store<HashSet<&'static str>> = reactive(HashSet::new());
        let (runs, bump) = counter();
        let _e = effect({
            let (scores, tags) = (scores.clone(), tags.clone());
            move || {
                scores.len();
                tags.contains(&"x");
                bump();
            }
        });

        scores.insert("ada".into(), 3);
        let ada = scores.entry("ada".to_string());
        ada.update(|v| *v += 1);
        assert_eq!(scores.value(&"ada".to_string()), Some(4));
        assert!(tags.insert("x"));
        assert!(tags.remove(&"x"));
        assert_eq!(scores.remove(&"ada".to_string()), Some(4));
        assert_eq!(ada.get(), None);
        assert_eq!(runs.get(), 6);
    }

    #[test]
    fn test_shallow_members_are_inert() {
        let rows = shallow_reactive(vec![vec![1], vec![2]]);
        let (runs, bump) = counter();
        let _e = effect({
            let rows = rows.clone();
            let bump = bump.clone();
            move || {
                rows.item(0).get();
                bump();
            }
        });
        // Reading a member registered nothing, and writing it notifies nobody.
        assert_eq!(rows.subscriber_count(), 0);
        rows.item(0).update(|r| r.push(10));
        assert_eq!(runs.get(), 1);
        assert_eq!(rows.item(0).with_untracked(Vec::clone), Some(vec![1, 10]));

        let _top = effect({
            let rows = rows.clone();
            move || {
                rows.len();
                bump();
            }
        });
        rows.push(vec![3]);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_disposal_leaves_no_graph_edges() {
        let before = stats();
        {
            let a = signal(1);
            let d = derived({
                let a = a.clone();
                move || a.get() + 1
            });
            let scope = Scope::new();
            scope.run(|| {
                effect(move || {
                    d.get();
                });
            });
            a.set(2);
            scope.dispose();
        }
        assert_eq!(stats(), before);
    }
}
