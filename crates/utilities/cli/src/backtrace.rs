//! Backtrace configuration.

use std::{backtrace::Backtrace, panic, sync::Once};

static INIT: Once = Once::new();

/// Prints a backtrace on panic unless `RUST_BACKTRACE` already configures them.
///
/// Wraps the current panic hook rather than mutating the process environment.
pub fn enable() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_BACKTRACE").is_some() {
            return;
        }
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            default_hook(info);
            eprintln!("{}", Backtrace::force_capture());
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_keeps_panics_recoverable() {
        enable();
        enable();
        assert!(panic::catch_unwind(|| panic!("boom")).is_err());
    }
}
