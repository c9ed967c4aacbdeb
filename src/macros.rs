/// Build a predicate from block syntax.
///
/// Each statement of the block contributes a step: expression statements push
/// a predicate, `if`/`else if`/`else` (including `if let`) contribute the
/// taken branch, `for` loops contribute every iteration, bare `{ ... }` blocks
/// splice their members, and `And { ... }`, `Or { ... }`, `Not { ... }` group
/// their members under one operator. The finished block is joined with AND.
///
/// ```
/// use predicate_builder::{predicate, Field, FieldDescriptor, Schema};
///
/// struct Spaceship;
///
/// impl Spaceship {
///     const NAME: Field<Spaceship, String> = Field::new("name");
///     const COST: Field<Spaceship, i32> = Field::new("cost");
///     const IS_REAL: Field<Spaceship, bool> = Field::new("isReal");
/// }
///
/// impl Schema for Spaceship {
///     const ENTITY: &'static str = "Spaceship";
///
///     fn fields() -> Vec<FieldDescriptor> {
///         vec![
///             Self::NAME.descriptor(),
///             Self::COST.descriptor(),
///             Self::IS_REAL.descriptor(),
///         ]
///     }
/// }
///
/// let budget = Some(100);
/// let banned = ["Death Star", "Executor"];
///
/// let query = predicate!(<Spaceship> {
///     Spaceship::IS_REAL;
///     if let Some(max) = budget {
///         Spaceship::COST.lte(max);
///     }
///     for name in banned {
///         Spaceship::NAME.neq(name);
///     }
///     Or {
///         Spaceship::COST.lt(10);
///         Spaceship::NAME.begins_with("X");
///     }
/// });
///
/// assert_eq!(
///     query.format(),
///     "isReal == 1 AND cost <= 100 AND name != \"Death Star\" AND \
///      name != \"Executor\" AND (cost < 10 OR name BEGINSWITH \"X\")"
/// );
/// ```
///
/// The schema must be named:
///
/// ```compile_fail
/// use predicate_builder::predicate;
///
/// let query = predicate!({ 1 });
/// ```
#[macro_export]
macro_rules! predicate {
    (<$schema:ty> { $($body:tt)* }) => {{
        #[allow(unused_mut)]
        let mut __block = $crate::Block::<$schema>::new();
        $crate::__predicate_steps!(__block; $($body)*);
        __block.finish()
    }};
    ($($other:tt)*) => {
        ::core::compile_error!(
            "predicate! must be specialized with a schema type, e.g. `predicate!(<Spaceship> { ... })`"
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __predicate_steps {
    ($b:ident;) => {};
    ($b:ident; ; $($rest:tt)*) => {
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; if $($rest:tt)*) => {
        $crate::__predicate_if!($b; [] @cond [] $($rest)*);
    };
    ($b:ident; for $pat:pat in $($rest:tt)*) => {
        $crate::__predicate_for!($b; ($pat) [] $($rest)*);
    };
    ($b:ident; And { $($inner:tt)* } $($rest:tt)*) => {
        $crate::__predicate_group!($b; And; $($inner)*);
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; Or { $($inner:tt)* } $($rest:tt)*) => {
        $crate::__predicate_group!($b; Or; $($inner)*);
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; Not { $($inner:tt)* } $($rest:tt)*) => {
        $crate::__predicate_group!($b; Not; $($inner)*);
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; { $($inner:tt)* } $($rest:tt)*) => {
        $crate::__predicate_steps!($b; $($inner)*);
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; $step:expr; $($rest:tt)*) => {
        $b.push($step);
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; $step:expr) => {
        $b.push($step);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __predicate_group {
    ($b:ident; $op:ident; $($inner:tt)*) => {{
        #[allow(unused_mut)]
        let mut __group = $b.sub_block();
        $crate::__predicate_steps!(__group; $($inner)*);
        $b.push($crate::$op::new(__group));
    }};
}

/// Munches an `if` chain. `[..]` before `@cond` holds the native chain built
/// so far; the bracket after it collects the current condition up to its
/// block.
#[doc(hidden)]
#[macro_export]
macro_rules! __predicate_if {
    ($b:ident; [$($chain:tt)*] @cond [$($cond:tt)*] { $($then:tt)* } $($rest:tt)*) => {
        $crate::__predicate_if!(
            $b; [$($chain)* if $($cond)* { $crate::__predicate_steps!($b; $($then)*); }] @after $($rest)*
        );
    };
    ($b:ident; [$($chain:tt)*] @cond [$($cond:tt)*] $next:tt $($rest:tt)*) => {
        $crate::__predicate_if!($b; [$($chain)*] @cond [$($cond)* $next] $($rest)*);
    };
    ($b:ident; [$($chain:tt)*] @after else if $($rest:tt)*) => {
        $crate::__predicate_if!($b; [$($chain)* else] @cond [] $($rest)*);
    };
    ($b:ident; [$($chain:tt)*] @after else { $($otherwise:tt)* } $($rest:tt)*) => {
        $($chain)* else { $crate::__predicate_steps!($b; $($otherwise)*); }
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; [$($chain:tt)*] @after $($rest:tt)*) => {
        $($chain)*
        $crate::__predicate_steps!($b; $($rest)*);
    };
}

/// Munches a `for` head up to its body block.
#[doc(hidden)]
#[macro_export]
macro_rules! __predicate_for {
    ($b:ident; ($pat:pat) [$($iter:tt)*] { $($body:tt)* } $($rest:tt)*) => {
        $b.each($($iter)*, |__item_block, $pat| {
            $crate::__predicate_steps!(__item_block; $($body)*);
        });
        $crate::__predicate_steps!($b; $($rest)*);
    };
    ($b:ident; ($pat:pat) [$($iter:tt)*] $next:tt $($rest:tt)*) => {
        $crate::__predicate_for!($b; ($pat) [$($iter)* $next] $($rest)*);
    };
}
