//! The ordered rewrite rules.
//!
//! Rules run in a fixed total order; later rules may depend on earlier rules'
//! output, never the reverse. No rule aborts the pipeline: anything a rule
//! cannot handle cleanly degrades to a Partial or Advisory note. Fatal errors
//! belong to the parser and normalizer only.

use log::debug;
use rehook_diagnostics::{ChangeCategory, ChangeLog, ChangeRecord};
use rehook_hir::{LifecycleKind, NormalizedComponent};

use crate::target::{Effect, EffectDeps, FnComponent, HookState, LocalFn};

/// Apply every rule to a normalized component.
///
/// Infallible by design: the output is always a complete [`FnComponent`] plus
/// the change records in detection order.
pub fn apply_rules(component: NormalizedComponent) -> (FnComponent, ChangeLog) {
    let mut notes = ChangeLog::new();
    let mut target = FnComponent {
        name: component.name.clone(),
        export: component.export,
        takes_props: component.uses_props,
        hook_states: Vec::new(),
        prelude: Vec::new(),
        functions: Vec::new(),
        effects: Vec::new(),
        preserved: Vec::new(),
        render_body: component.render_body.clone(),
        hook_imports: Vec::new(),
    };

    rule_structure(&component, &mut target, &mut notes);
    rule_state(&component, &mut target, &mut notes);
    rule_lifecycle(&component, &mut target, &mut notes);
    rule_handlers(&component, &mut target, &mut notes);
    rule_imports(&mut target, &mut notes);

    debug!(
        "applied rules to `{}`: {} hook states, {} effects, {} notes",
        target.name,
        target.hook_states.len(),
        target.effects.len(),
        notes.len()
    );
    (target, notes)
}

/// Rule 1: class wrapper becomes a function-component wrapper.
fn rule_structure(
    component: &NormalizedComponent,
    target: &mut FnComponent,
    notes: &mut ChangeLog,
) {
    notes.push(ChangeRecord::definite(
        ChangeCategory::StructuralConversion,
        format!(
            "converted class `{}` to a function component",
            component.name
        ),
    ));

    if !component.constructor_extra.is_empty() {
        target.prelude = component.constructor_extra.clone();
        notes.push(ChangeRecord::advisory(
            ChangeCategory::StructuralConversion,
            format!(
                "preserved {} constructor statement(s) verbatim at the top of the component; \
                 consider moving them into refs or effects",
                component.constructor_extra.len()
            ),
        ));
    }
}

/// Rule 2: each state-init site becomes one hook-state binding. The dialect
/// has a single flat object literal, so its fields stay grouped in one
/// `useState` call; partial `setState` updates keep their shape that way.
fn rule_state(component: &NormalizedComponent, target: &mut FnComponent, notes: &mut ChangeLog) {
    if !component.has_state() {
        return;
    }
    let keys: Vec<&str> = component.state_fields.iter().map(|f| f.key.as_str()).collect();
    target.hook_states.push(HookState {
        fields: component.state_fields.clone(),
    });
    notes.push(ChangeRecord::definite(
        ChangeCategory::StateConversion,
        format!(
            "moved the state object into a useState hook ({} field{}: {})",
            keys.len(),
            if keys.len() == 1 { "" } else { "s" },
            keys.join(", ")
        ),
    ));
}

/// Rule 3: lifecycle methods become effect bindings. Recognized kinds are
/// handled in a fixed order (mount, update, unmount), then unrecognized names
/// are preserved with an advisory note.
fn rule_lifecycle(
    component: &NormalizedComponent,
    target: &mut FnComponent,
    notes: &mut ChangeLog,
) {
    let mount = component.lifecycle_of(LifecycleKind::Mount);
    let update = component.lifecycle_of(LifecycleKind::Update);
    let unmount = component.lifecycle_of(LifecycleKind::Unmount);

    if let Some(mount) = mount {
        let cleanup = unmount.map(|u| u.body.clone());
        target.effects.push(Effect {
            body: mount.body.clone(),
            cleanup,
            deps: EffectDeps::RunOnce,
        });
        notes.push(ChangeRecord::definite(
            ChangeCategory::LifecycleConversion,
            "replaced componentDidMount with an effect that has an empty dependency list",
        ));
        if unmount.is_some() {
            notes.push(ChangeRecord::definite(
                ChangeCategory::LifecycleConversion,
                "moved componentWillUnmount into the cleanup function returned by the mount effect",
            ));
        }
    }

    if let Some(update) = update {
        let param_names = param_idents(&update.params);
        let uses_params = param_names.iter().any(|p| contains_word(&update.body, p));
        let computed_state = update.body.contains("state[");

        if uses_params || computed_state {
            target.effects.push(Effect {
                body: update.body.clone(),
                cleanup: None,
                deps: EffectDeps::WholeState,
            });
            notes.push(ChangeRecord::partial(
                ChangeCategory::LifecycleConversion,
                "could not determine the dependencies of componentDidUpdate (it reads its \
                 previous-value parameters or uses computed state access); the effect depends \
                 on the whole state object and re-runs on any state change",
            ));
        } else {
            let deps = referenced_state_tokens(&update.body, component);
            if deps.is_empty() {
                target.effects.push(Effect {
                    body: update.body.clone(),
                    cleanup: None,
                    deps: EffectDeps::EveryRender,
                });
                notes.push(ChangeRecord::partial(
                    ChangeCategory::LifecycleConversion,
                    "componentDidUpdate references no state fields; the effect runs after \
                     every render, including the initial one",
                ));
            } else {
                let listed = deps.join(", ");
                target.effects.push(Effect {
                    body: update.body.clone(),
                    cleanup: None,
                    deps: EffectDeps::Fields(deps),
                });
                notes.push(ChangeRecord::definite(
                    ChangeCategory::LifecycleConversion,
                    format!(
                        "replaced componentDidUpdate with an effect depending on [{listed}]"
                    ),
                ));
            }
        }
    }

    if let (Some(unmount), None) = (unmount, mount) {
        // No mount effect to attach the cleanup to; give it its own effect.
        target.effects.push(Effect {
            body: String::new(),
            cleanup: Some(unmount.body.clone()),
            deps: EffectDeps::RunOnce,
        });
        notes.push(ChangeRecord::partial(
            ChangeCategory::LifecycleConversion,
            "componentWillUnmount became the cleanup of its own effect; unmount-only logic \
             now runs once per mount instead of once per component lifetime",
        ));
    }

    for preserved in component.unknown_lifecycles() {
        target.preserved.push(LocalFn {
            name: preserved.name.clone(),
            params: preserved.params.clone(),
            body: preserved.body.clone(),
        });
        notes.push(ChangeRecord::advisory(
            ChangeCategory::LifecycleConversion,
            format!(
                "lifecycle `{}` has no direct hook equivalent; preserved as a local function \
                 for manual migration",
                preserved.name
            ),
        ));
    }
}

/// Rule 4: former methods become local functions; constructor bindings are
/// dropped and reported per handler.
fn rule_handlers(
    component: &NormalizedComponent,
    target: &mut FnComponent,
    notes: &mut ChangeLog,
) {
    for handler in &component.handlers {
        target.functions.push(LocalFn {
            name: handler.name.clone(),
            params: handler.params.clone(),
            body: handler.body.clone(),
        });
        if handler.was_bound {
            notes.push(ChangeRecord::definite(
                ChangeCategory::HandlerSimplification,
                format!(
                    "removed the constructor binding for `{}`; it is now a plain function",
                    handler.name
                ),
            ));
        }
    }
}

/// Rule 5: one combined, deduplicated hook import line for every hook the
/// earlier rules actually introduced.
fn rule_imports(target: &mut FnComponent, notes: &mut ChangeLog) {
    if !target.hook_states.is_empty() {
        target.hook_imports.push("useState".to_string());
    }
    if !target.effects.is_empty() {
        target.hook_imports.push("useEffect".to_string());
    }
    if target.hook_imports.is_empty() {
        return;
    }
    notes.push(ChangeRecord::definite(
        ChangeCategory::ImportAdjustment,
        format!(
            "added a combined React import for {}",
            target.hook_imports.join(", ")
        ),
    ));
}

/// Canonical `state.<key>` tokens referenced in `body`, in state-field order.
fn referenced_state_tokens(body: &str, component: &NormalizedComponent) -> Vec<String> {
    component
        .state_fields
        .iter()
        .filter(|field| contains_word(body, &format!("state.{}", field.key)))
        .map(|field| format!("state.{}", field.key))
        .collect()
}

/// Whole-token containment check: `needle` bounded by non-identifier chars.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    let mut from = 0;
    while let Some(idx) = haystack[from..].find(needle) {
        let start = from + idx;
        let end = start + needle.len();
        let ok_before = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .map(|c| is_ident(c) || c == '.')
                .unwrap_or(false);
        let ok_after = !haystack[end..].chars().next().map(is_ident).unwrap_or(false);
        if ok_before && ok_after {
            return true;
        }
        from = end;
    }
    false
}

/// Parameter identifiers from a raw parameter-list string.
fn param_idents(params: &str) -> Vec<String> {
    params
        .split(',')
        .filter_map(|p| {
            let p = p.trim();
            let end = p
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(p.len());
            if end == 0 {
                None
            } else {
                Some(p[..end].to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehook_diagnostics::Certainty;
    use rehook_hir::normalize;
    use rehook_parser::{parse, ParseOptions};

    fn run(source: &str) -> (FnComponent, ChangeLog) {
        apply_rules(normalize(parse(source, &ParseOptions::default()).unwrap()).unwrap())
    }

    #[test]
    fn counter_scenario_produces_the_expected_records() {
        let (target, notes) = run(
            "class C extends React.Component { constructor(p){super(p); this.state={n:0}; this.inc=this.inc.bind(this);} inc(){this.setState(s=>({n:s.n+1}))} componentDidMount(){console.log('x')} render(){return <p>{this.state.n}</p>} }",
        );
        assert_eq!(target.hook_states.len(), 1);
        assert_eq!(target.effects.len(), 1);
        assert_eq!(target.effects[0].deps, EffectDeps::RunOnce);
        assert_eq!(target.hook_imports, vec!["useState", "useEffect"]);

        let categories: Vec<_> = notes.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                ChangeCategory::StructuralConversion,
                ChangeCategory::StateConversion,
                ChangeCategory::LifecycleConversion,
                ChangeCategory::HandlerSimplification,
                ChangeCategory::ImportAdjustment,
            ]
        );
        assert!(notes.iter().all(|r| r.certainty == Certainty::Definite));
    }

    #[test]
    fn state_binding_count_matches_init_sites() {
        let (target, _) = run(
            "class C extends React.Component { constructor(p){super(p); this.state={a:1, b:2, c:3};} render(){return <p>{this.state.a}</p>} }",
        );
        // Three fields, one init site, one hook-state binding.
        assert_eq!(target.hook_states.len(), 1);
        assert_eq!(target.hook_states[0].fields.len(), 3);
    }

    #[test]
    fn unmount_without_mount_gets_its_own_effect() {
        let (target, notes) = run(
            "class C extends React.Component { componentWillUnmount(){clear();} render(){return null;} }",
        );
        assert_eq!(target.effects.len(), 1);
        assert!(target.effects[0].body.is_empty());
        assert!(target.effects[0].cleanup.is_some());
        let lifecycle: Vec<_> = notes
            .iter()
            .filter(|r| r.category == ChangeCategory::LifecycleConversion)
            .collect();
        assert_eq!(lifecycle.len(), 1);
        assert_eq!(lifecycle[0].certainty, Certainty::Partial);
    }

    #[test]
    fn unmount_with_mount_is_merged_as_cleanup() {
        let (target, _) = run(
            "class C extends React.Component { componentDidMount(){sub();} componentWillUnmount(){unsub();} render(){return null;} }",
        );
        assert_eq!(target.effects.len(), 1);
        assert!(target.effects[0].body.contains("sub()"));
        assert!(target.effects[0].cleanup.as_deref().unwrap().contains("unsub()"));
    }

    #[test]
    fn update_dependencies_are_scanned_in_field_order() {
        let (target, notes) = run(
            "class C extends React.Component { constructor(p){super(p); this.state={a:1, b:2};} componentDidUpdate(){log(this.state.b, this.state.a);} render(){return null;} }",
        );
        assert_eq!(
            target.effects[0].deps,
            EffectDeps::Fields(vec!["state.a".to_string(), "state.b".to_string()])
        );
        assert!(notes
            .iter()
            .any(|r| r.certainty == Certainty::Definite
                && r.description.contains("[state.a, state.b]")));
    }

    #[test]
    fn update_with_prev_params_degrades_softly() {
        let (target, notes) = run(
            "class C extends React.Component { constructor(p){super(p); this.state={a:1};} componentDidUpdate(prevProps, prevState){ if (prevState.a !== this.state.a) log(); } render(){return null;} }",
        );
        assert_eq!(target.effects[0].deps, EffectDeps::WholeState);
        assert!(notes.iter().any(|r| r.certainty == Certainty::Partial));
    }

    #[test]
    fn unrecognized_lifecycle_is_preserved_with_an_advisory() {
        let (target, notes) = run(
            "class C extends React.Component { componentWillReceiveProps(next){sync(next);} render(){return null;} }",
        );
        assert_eq!(target.preserved.len(), 1);
        assert_eq!(target.preserved[0].name, "componentWillReceiveProps");
        let advisory: Vec<_> = notes
            .iter()
            .filter(|r| r.certainty == Certainty::Advisory)
            .collect();
        assert_eq!(advisory.len(), 1);
        assert_eq!(advisory[0].category, ChangeCategory::LifecycleConversion);
    }

    #[test]
    fn stateless_component_needs_no_imports() {
        let (target, notes) = run(
            "class C extends React.Component { render(){return <p>hi</p>;} }",
        );
        assert!(target.hook_imports.is_empty());
        assert!(!notes
            .iter()
            .any(|r| r.category == ChangeCategory::ImportAdjustment));
    }

    #[test]
    fn word_containment_respects_boundaries() {
        assert!(contains_word("log(state.a);", "state.a"));
        assert!(!contains_word("log(prevState.a);", "state.a"));
        assert!(!contains_word("log(state.ab);", "state.a"));
    }
}
