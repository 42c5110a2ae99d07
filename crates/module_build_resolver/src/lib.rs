// A wrapper around the `oxc_resolver` crate with the options the build exposes.

mod resolver;

pub use crate::resolver::{ResolveReturn, Resolver, ResolverOptions};

pub use oxc_resolver::ResolveError;
