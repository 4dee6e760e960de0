//! End-to-end pipeline tests: source text in, source text and notes out.

use rehook::{
    Certainty, ChangeCategory, ConvertError, Converter, FallbackRewriter, RewriteError, Rewriter,
    RuleRewriter, TransformResult, EXAMPLE_COMPONENT,
};

fn convert(source: &str) -> TransformResult {
    Converter::default().convert(source).unwrap()
}

#[test]
fn example_component_converts_to_the_expected_output() {
    let result = convert(EXAMPLE_COMPONENT);
    let expected = "\
import React, { useState, useEffect } from 'react';

const MyComponent = () => {
  const [state, setState] = useState({
    count: 0,
    name: 'John'
  });

  const handleClick = () => {
    setState(prevState => ({
      count: prevState.count + 1
    }));
  };

  useEffect(() => {
    console.log('Component mounted');
  }, []);

  return (
    <div>
      <h1>Hello, {state.name}!</h1>
      <p>Count: {state.count}</p>
      <button onClick={handleClick}>Increment</button>
    </div>
  );
};
";
    assert_eq!(result.emitted_source, expected);
}

#[test]
fn example_component_records_are_ordered_and_definite() {
    let result = convert(EXAMPLE_COMPONENT);
    let categories: Vec<_> = result.changes.iter().map(|r| r.category).collect();
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
    assert_eq!(result.changes.count_of(Certainty::Definite), 5);
    assert_eq!(result.changes.count_of(Certainty::Partial), 0);
}

#[test]
fn conversion_is_deterministic() {
    let a = convert(EXAMPLE_COMPONENT);
    let b = convert(EXAMPLE_COMPONENT);
    assert_eq!(a.emitted_source, b.emitted_source);
    assert_eq!(a.changes.len(), b.changes.len());
    for (x, y) in a.changes.iter().zip(b.changes.iter()) {
        assert_eq!(x, y);
    }
}

#[test]
fn converted_output_passes_through_unchanged() {
    let first = convert(EXAMPLE_COMPONENT);
    let second = convert(&first.emitted_source);
    assert_eq!(second.emitted_source, first.emitted_source);
    assert!(second.changes.is_empty());
}

#[test]
fn hook_free_output_also_passes_through_unchanged() {
    let source = "class Badge extends React.Component {\n\
                  \x20 render() { return <span>hi</span>; }\n\
                  }";
    let first = convert(source);
    assert!(!first.emitted_source.contains("useState"));
    let second = convert(&first.emitted_source);
    assert_eq!(second.emitted_source, first.emitted_source);
    assert!(second.changes.is_empty());
}

#[test]
fn one_state_init_site_yields_one_hook_binding() {
    let source = "class Form extends React.Component {\n\
                  \x20 constructor(props) {\n\
                  \x20   super(props);\n\
                  \x20   this.state = { user: '', email: '', dirty: false };\n\
                  \x20 }\n\
                  \x20 render() {\n\
                  \x20   return <form>{this.state.user}</form>;\n\
                  \x20 }\n\
                  }";
    let result = convert(source);
    let bindings = result.emitted_source.matches("= useState(").count();
    assert_eq!(bindings, 1);
    assert!(result
        .emitted_source
        .contains("const [state, setState] = useState({"));
    assert_eq!(result.changes.count_in(ChangeCategory::StateConversion), 1);
}

#[test]
fn multiple_components_in_one_file_are_rejected() {
    let source = "class A extends React.Component { render() { return null; } }\n\
                  class B extends React.Component { render() { return null; } }";
    let err = Converter::default().convert(source).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedInput { .. }));
    assert_eq!(err.code(), "R001");
}

#[test]
fn plain_script_without_a_component_is_rejected() {
    let err = Converter::default()
        .convert("function add(a, b) { return a + b; }")
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedInput { .. }));
}

#[test]
fn mixed_state_reference_styles_are_rejected() {
    let source = "class C extends React.Component {\n\
                  \x20 constructor(p) { super(p); this.state = { n: 0 }; }\n\
                  \x20 render() {\n\
                  \x20   const { n } = this.state;\n\
                  \x20   return <p>{n} {this.state.n}</p>;\n\
                  \x20 }\n\
                  }";
    let err = Converter::default().convert(source).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedInput { .. }));
}

#[test]
fn unmount_without_mount_reports_a_partial_change() {
    let source = "class Ticker extends React.Component {\n\
                  \x20 componentWillUnmount() { clearInterval(this.timer); }\n\
                  \x20 render() { return null; }\n\
                  }";
    let result = convert(source);
    assert!(result.emitted_source.contains("return () => {"));
    assert_eq!(result.changes.count_of(Certainty::Partial), 1);
}

#[test]
fn unknown_lifecycle_is_preserved_and_advised() {
    let source = "class Sync extends React.Component {\n\
                  \x20 componentWillReceiveProps(next) { this.sync(next); }\n\
                  \x20 sync(next) { apply(next); }\n\
                  \x20 render() { return null; }\n\
                  }";
    let result = convert(source);
    assert!(result
        .emitted_source
        .contains("const componentWillReceiveProps = (next) => {"));
    assert_eq!(result.changes.count_of(Certainty::Advisory), 1);
}

#[test]
fn default_export_is_mirrored() {
    let source = "export default class Badge extends React.Component {\n\
                  \x20 render() { return <span>hi</span>; }\n\
                  }";
    let result = convert(source);
    assert!(result.emitted_source.starts_with("const Badge = () => {"));
    assert!(result.emitted_source.ends_with("export default Badge;\n"));
}

#[test]
fn named_export_is_mirrored() {
    let source = "export class Badge extends React.Component {\n\
                  \x20 render() { return <span>hi</span>; }\n\
                  }";
    let result = convert(source);
    assert!(result
        .emitted_source
        .starts_with("export const Badge = () => {"));
    assert!(!result.emitted_source.contains("export default"));
}

#[test]
fn props_usage_widens_the_signature() {
    let source = "class Greeting extends React.Component {\n\
                  \x20 render() { return <p>Hello, {this.props.name}</p>; }\n\
                  }";
    let result = convert(source);
    assert!(result
        .emitted_source
        .contains("const Greeting = (props) => {"));
    assert!(result.emitted_source.contains("{props.name}"));
}

#[test]
fn transform_result_serializes_with_camel_case_keys() {
    let result = convert(EXAMPLE_COMPONENT);
    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("emittedSource").is_some());
    let changes = value.get("changes").unwrap().as_array().unwrap();
    assert_eq!(changes.len(), 5);
    assert_eq!(changes[0]["category"], "StructuralConversion");
    assert_eq!(changes[0]["certainty"], "Definite");
}

#[test]
fn fallback_rewriter_recovers_from_provider_outages() {
    struct Down;
    impl Rewriter for Down {
        fn rewrite(&self, _: &str) -> Result<TransformResult, RewriteError> {
            Err(RewriteError::Provider("timeout".to_string()))
        }
    }
    let rewriter = FallbackRewriter::new(Down, RuleRewriter::default());
    let via_fallback = rewriter.rewrite(EXAMPLE_COMPONENT).unwrap();
    let direct = convert(EXAMPLE_COMPONENT);
    assert_eq!(via_fallback.emitted_source, direct.emitted_source);
}
