//! Semantic-action registry.
//!
//! Each production id may be bound to a callback invoked at reduction time
//! with the ordered synthesized values of the popped children. An optional
//! initializer callback runs once per parse, before any reduction, to seed
//! whatever state the action closures share.

use std::collections::BTreeMap;

/// Error raised by a semantic-action callback.
///
/// A failing action aborts the enclosing parse attempt; it is never retried.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SemanticError(String);

impl SemanticError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type ShiftFn<TTok, V> = Box<dyn Fn(&TTok) -> V>;
type InitFn = Box<dyn FnMut()>;
type ReduceFn<V> = Box<dyn FnMut(Vec<V>) -> Result<V, SemanticError>>;

/// The set of callbacks driving value synthesis during a parse.
pub struct SemanticActions<TTok, V> {
    shift: ShiftFn<TTok, V>,
    init: Option<InitFn>,
    reduces: BTreeMap<usize, ReduceFn<V>>,
}

impl<TTok, V> SemanticActions<TTok, V> {
    /// Create a registry. `shift` synthesizes the value pushed for every
    /// consumed terminal, typically its own text.
    pub fn new(shift: impl Fn(&TTok) -> V + 'static) -> Self {
        Self {
            shift: Box::new(shift),
            init: None,
            reduces: BTreeMap::new(),
        }
    }

    /// Register the initializer, run once per parse attempt.
    pub fn on_init(mut self, f: impl FnMut() + 'static) -> Self {
        self.init = Some(Box::new(f));
        self
    }

    /// Bind a reduction callback to a production id. Re-binding the same id
    /// replaces the previous callback.
    pub fn on_reduce(
        mut self,
        production: usize,
        f: impl FnMut(Vec<V>) -> Result<V, SemanticError> + 'static,
    ) -> Self {
        self.reduces.insert(production, Box::new(f));
        self
    }

    pub(crate) fn start_parse(&mut self) {
        if let Some(init) = &mut self.init {
            init();
        }
    }

    pub(crate) fn synthesize_shift(&self, token: &TTok) -> V {
        (self.shift)(token)
    }

    pub(crate) fn synthesize_reduce(
        &mut self,
        production: usize,
        children: Vec<V>,
    ) -> Result<V, SemanticError>
    where
        V: Default,
    {
        match self.reduces.get_mut(&production) {
            Some(f) => f(children),
            // Unbound productions synthesize the default value.
            None => Ok(V::default()),
        }
    }
}

impl<TTok, V> std::fmt::Debug for SemanticActions<TTok, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticActions")
            .field("has_init", &self.init.is_some())
            .field("bound_productions", &self.reduces.len())
            .finish_non_exhaustive()
    }
}
