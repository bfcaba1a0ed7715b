//! Guard predicates and transition actions.
//!
//! Both come in two arities. A *free* callable only sees the context and is
//! what instant transitions use. A *message* callable also receives the
//! message that triggered the transition.

/// Free predicate, evaluated without a message.
pub type FreePredicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;
/// Predicate over the context and the triggering message.
pub type MessagePredicate<C, M> = Box<dyn Fn(&C, &M) -> bool + Send + Sync>;
/// Free side effect; the return value reports consumption.
pub type FreeEffect<C> = Box<dyn Fn(&mut C) -> bool + Send + Sync>;
/// Side effect over the context and the triggering message.
pub type MessageEffect<C, M> = Box<dyn Fn(&mut C, &M) -> bool + Send + Sync>;

enum Predicate<C, M> {
    Free(FreePredicate<C>),
    Message(MessagePredicate<C, M>),
}

/// Predicate that determines if a transition may fire.
///
/// # Example
///
/// ```rust
/// use tickmind::core::Guard;
///
/// struct Walker {
///     path: Vec<(f32, f32)>,
/// }
///
/// let has_path: Guard<Walker, ()> = Guard::new(|w: &Walker| !w.path.is_empty());
///
/// assert!(!has_path.check(&Walker { path: vec![] }, None));
/// assert!(has_path.check(&Walker { path: vec![(1.0, 2.0)] }, None));
/// ```
pub struct Guard<C, M> {
    predicate: Predicate<C, M>,
}

impl<C, M> Guard<C, M> {
    /// Create a guard that only looks at the context.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Predicate::Free(Box::new(predicate)),
        }
    }

    /// Create a guard that also inspects the triggering message.
    ///
    /// Such a guard can only sit on a message transition; it never passes
    /// when evaluated without a message.
    pub fn on_message<F>(predicate: F) -> Self
    where
        F: Fn(&C, &M) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Predicate::Message(Box::new(predicate)),
        }
    }

    /// Whether this guard needs a message to be evaluated.
    pub fn needs_message(&self) -> bool {
        matches!(self.predicate, Predicate::Message(_))
    }

    /// Evaluate the guard.
    pub fn check(&self, context: &C, message: Option<&M>) -> bool {
        match (&self.predicate, message) {
            (Predicate::Free(predicate), _) => predicate(context),
            (Predicate::Message(predicate), Some(message)) => predicate(context, message),
            (Predicate::Message(_), None) => false,
        }
    }
}

enum Effect<C, M> {
    Free(FreeEffect<C>),
    Message(MessageEffect<C, M>),
}

/// Side effect run when a transition fires.
///
/// Returns whether the triggering message was consumed. Instant transitions
/// have no message, so their result only shows up in traces.
///
/// # Example
///
/// ```rust
/// use tickmind::core::Action;
///
/// #[derive(Default)]
/// struct Counter {
///     seen: u32,
/// }
///
/// let count: Action<Counter, u32> = Action::on_message(|c: &mut Counter, n: &u32| {
///     c.seen += n;
///     true
/// });
///
/// let mut counter = Counter::default();
/// assert!(count.run(&mut counter, Some(&4)));
/// assert_eq!(counter.seen, 4);
/// ```
pub struct Action<C, M> {
    effect: Effect<C, M>,
}

impl<C, M> Action<C, M> {
    /// Create an action that only touches the context.
    pub fn new<F>(effect: F) -> Self
    where
        F: Fn(&mut C) -> bool + Send + Sync + 'static,
    {
        Action {
            effect: Effect::Free(Box::new(effect)),
        }
    }

    /// Create an action that also reads the triggering message.
    pub fn on_message<F>(effect: F) -> Self
    where
        F: Fn(&mut C, &M) -> bool + Send + Sync + 'static,
    {
        Action {
            effect: Effect::Message(Box::new(effect)),
        }
    }

    /// Whether this action needs a message to run.
    pub fn needs_message(&self) -> bool {
        matches!(self.effect, Effect::Message(_))
    }

    /// Run the action, returning whether the message was consumed.
    pub fn run(&self, context: &mut C, message: Option<&M>) -> bool {
        match (&self.effect, message) {
            (Effect::Free(effect), _) => effect(context),
            (Effect::Message(effect), Some(message)) => effect(context, message),
            // Builders reject this pairing; nothing to consume anyway.
            (Effect::Message(_), None) => false,
        }
    }
}
