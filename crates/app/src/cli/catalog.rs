use std::io;

use sands_app::{context::AppContext, reports};

pub(crate) fn run(context: &AppContext, out: impl io::Write) -> Result<(), String> {
    reports::write_catalog(out, &context.catalog).map_err(|error| super::write_failed(&error))
}
