//! rehook - deterministic React class-to-hooks converter.
//!
//! The library facade composes the four pipeline stages (parse, normalize,
//! apply rules, emit) behind [`Converter::convert`], and exposes the
//! [`Rewriter`] capability seam so an external rewrite provider (for example
//! a hosted model) can be A/B-swapped against the deterministic engine
//! without the two ever interleaving within one conversion.
//!
//! The pipeline is pure and synchronous: conversions share no mutable state
//! and may run fully in parallel on separate threads.

use log::debug;
use thiserror::Error;

pub use rehook_codegen::{EmitOptions, OutputFile, TransformResult};
pub use rehook_diagnostics::{
    Certainty, ChangeCategory, ChangeLog, ChangeRecord, ConvertError, FileId, JsonEmitter,
    ReportEmitter, SimpleEmitter, SourceCache, Span, TerminalEmitter,
};
pub use rehook_parser::ParseOptions;

/// Options for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub emit: EmitOptions,
}

type Observer = Box<dyn Fn(&TransformResult) + Send + Sync>;

/// The deterministic conversion pipeline.
pub struct Converter {
    options: ConvertOptions,
    observer: Option<Observer>,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            observer: None,
        }
    }

    /// Install a callback invoked once per successful conversion. The core
    /// never persists usage counters itself; a host that wants telemetry
    /// injects it here.
    pub fn with_observer(mut self, observer: impl Fn(&TransformResult) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Convert one source text.
    ///
    /// Input that is already in the functional dialect (no class component,
    /// hook bindings present) passes through unchanged with an empty change
    /// log, so re-running the converter on its own output reports nothing
    /// further. All other failures are fatal and produce no output.
    pub fn convert(&self, source: &str) -> Result<TransformResult, ConvertError> {
        let descriptor = match rehook_parser::parse(source, &self.options.parse) {
            Ok(descriptor) => descriptor,
            Err(err @ ConvertError::UnsupportedInput { .. })
                if rehook_parser::looks_already_modern(source, &self.options.parse) =>
            {
                debug!("input already modern, passing through: {err}");
                let result = TransformResult {
                    emitted_source: source.to_string(),
                    changes: ChangeLog::new(),
                };
                if let Some(observer) = &self.observer {
                    observer(&result);
                }
                return Ok(result);
            }
            Err(err) => return Err(err),
        };

        let normalized = rehook_hir::normalize(descriptor)?;
        let (target, changes) = rehook_transform::apply_rules(normalized);
        let result = rehook_codegen::emit(&target, changes, &self.options.emit);

        if let Some(observer) = &self.observer {
            observer(&result);
        }
        Ok(result)
    }

    /// Parse and normalize only: dialect validation without emitting.
    pub fn check(&self, source: &str) -> Result<(), ConvertError> {
        let descriptor = rehook_parser::parse(source, &self.options.parse)?;
        rehook_hir::normalize(descriptor)?;
        Ok(())
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

/// Failure of a [`Rewriter`].
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The input is outside the supported dialect.
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// An external provider failed (transport, quota, malformed response).
    #[error("external rewrite provider failed: {0}")]
    Provider(String),
}

/// Capability seam for anything that can rewrite a component.
///
/// The deterministic engine and any external provider implement the same
/// contract, so callers can swap or compare them. A conversion uses exactly
/// one rewriter; providers and the rule engine are never interleaved.
pub trait Rewriter {
    fn rewrite(&self, source: &str) -> Result<TransformResult, RewriteError>;
}

/// The deterministic rule engine behind the [`Rewriter`] contract.
#[derive(Default)]
pub struct RuleRewriter {
    converter: Converter,
}

impl RuleRewriter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            converter: Converter::new(options),
        }
    }
}

impl Rewriter for RuleRewriter {
    fn rewrite(&self, source: &str) -> Result<TransformResult, RewriteError> {
        Ok(self.converter.convert(source)?)
    }
}

/// Try an external provider first, fall back to the deterministic engine on
/// provider failure. Dialect errors from the fallback still surface: they
/// mean the input itself is unsupported, not that the provider hiccuped.
pub struct FallbackRewriter<P: Rewriter> {
    primary: P,
    fallback: RuleRewriter,
}

impl<P: Rewriter> FallbackRewriter<P> {
    pub fn new(primary: P, fallback: RuleRewriter) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Rewriter> Rewriter for FallbackRewriter<P> {
    fn rewrite(&self, source: &str) -> Result<TransformResult, RewriteError> {
        match self.primary.rewrite(source) {
            Ok(result) => Ok(result),
            Err(RewriteError::Provider(reason)) => {
                debug!("rewrite provider failed ({reason}), using the rule engine");
                self.fallback.rewrite(source)
            }
            Err(err) => Err(err),
        }
    }
}

/// The bundled legacy example component, handy for demos and tests.
pub const EXAMPLE_COMPONENT: &str = r#"class MyComponent extends React.Component {
  constructor(props) {
    super(props);
    this.state = {
      count: 0,
      name: 'John'
    };
    this.handleClick = this.handleClick.bind(this);
  }

  handleClick() {
    this.setState(prevState => ({
      count: prevState.count + 1
    }));
  }

  componentDidMount() {
    console.log('Component mounted');
  }

  render() {
    return (
      <div>
        <h1>Hello, {this.state.name}!</h1>
        <p>Count: {this.state.count}</p>
        <button onClick={this.handleClick}>Increment</button>
      </div>
    );
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn observer_fires_once_per_conversion() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let converter = Converter::default()
            .with_observer(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        converter.convert(EXAMPLE_COMPONENT).unwrap();
        converter.convert(EXAMPLE_COMPONENT).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallback_engages_on_provider_failure() {
        struct Flaky;
        impl Rewriter for Flaky {
            fn rewrite(&self, _: &str) -> Result<TransformResult, RewriteError> {
                Err(RewriteError::Provider("quota exceeded".to_string()))
            }
        }
        let rewriter = FallbackRewriter::new(Flaky, RuleRewriter::default());
        let result = rewriter.rewrite(EXAMPLE_COMPONENT).unwrap();
        assert!(result.emitted_source.contains("useState"));
    }

    #[test]
    fn dialect_errors_are_not_papered_over_by_fallback() {
        struct Flaky;
        impl Rewriter for Flaky {
            fn rewrite(&self, _: &str) -> Result<TransformResult, RewriteError> {
                Err(RewriteError::Provider("down".to_string()))
            }
        }
        let rewriter = FallbackRewriter::new(Flaky, RuleRewriter::default());
        let err = rewriter.rewrite("let x = 1;").unwrap_err();
        assert!(matches!(err, RewriteError::Convert(_)));
    }
}
