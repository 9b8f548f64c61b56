//! Line Timer binary entry point.
//!
//! All setup lives in the library crate; a startup failure is returned from
//! `main` so the process exits with a nonzero status.

fn main() -> anyhow::Result<()> {
    line_timer_lib::run()
}
