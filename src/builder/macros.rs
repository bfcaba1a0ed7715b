//! Macros for ergonomic behaviour construction.

/// Generate a state enum together with its `State` implementation.
///
/// The enum gets the derives every state needs, so it can key transition
/// tables and travel inside resolve traces.
///
/// # Example
///
/// ```
/// use tickmind::state_enum;
/// use tickmind::core::State;
///
/// state_enum! {
///     pub enum Grazing {
///         Wander,
///         Eat,
///         Flee,
///     }
/// }
///
/// assert_eq!(Grazing::Flee.name(), "Flee");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
