//! Test support shared by the service tests.

mod context;

pub(crate) use context::TestContext;
