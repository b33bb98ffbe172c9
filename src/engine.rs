use crate::cache::AstCache;
use crate::config::ExecutionLimits;
use crate::context::AutomationContext;
use crate::error::Error;
use crate::parse::ast::Program;
use crate::roll::Roller;
use crate::sandbox::{self, Evaluation};
use std::sync::Arc;

/// Everything a host sets up once per bot configuration: the automation
/// context, the parsed-program cache and the default limits. Cheap to
/// clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct Engine {
    context: Arc<AutomationContext>,
    cache: Arc<AstCache>,
    limits: ExecutionLimits,
}

impl Engine {
    pub fn new(context: AutomationContext) -> Self {
        Self {
            context: Arc::new(context),
            cache: Arc::new(AstCache::new()),
            limits: ExecutionLimits::default(),
        }
    }

    /// Use `cache` instead of a private one.
    pub fn with_cache(mut self, cache: Arc<AstCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn context(&self) -> &AutomationContext {
        &self.context
    }

    pub fn cache(&self) -> &AstCache {
        &self.cache
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    pub fn parse(&self, source: &str) -> Result<Arc<Program>, Error> {
        Ok(self.cache.get_or_parse(source)?)
    }

    /// Evaluate `source` with the thread-local generator and the default
    /// limits.
    pub fn evaluate(&self, source: &str) -> Result<Evaluation, Error> {
        let mut rng = crate::DefaultRng::default();
        self.evaluate_with(source, &mut rng, &self.limits)
    }

    pub fn evaluate_with(
        &self,
        source: &str,
        roller: &mut dyn Roller,
        limits: &ExecutionLimits,
    ) -> Result<Evaluation, Error> {
        let program = self.parse(source)?;
        self.run(&program, roller, limits)
    }

    /// Run an already parsed program.
    pub fn run(
        &self,
        program: &Arc<Program>,
        roller: &mut dyn Roller,
        limits: &ExecutionLimits,
    ) -> Result<Evaluation, Error> {
        sandbox::run(program, &self.context, roller, limits)
    }
}

impl Default for Engine {
    /// An engine with the standard library and nothing else.
    fn default() -> Self {
        Self::new(AutomationContext::standard())
    }
}
