//! Fatal error reporting for the binary

use crate::error::FormError;
use tracing::error;

/// Print a fatal error and exit
///
/// Form errors show their user message; `-v` adds the full cause chain.
/// Configuration problems exit with 2, everything else with 1.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    let form_error = error.chain().find_map(|e| e.downcast_ref::<FormError>());
    let exit_code = match form_error {
        Some(form_error) => {
            eprintln!("{}", form_error.user_message());
            if matches!(form_error, FormError::Configuration { .. }) {
                2
            } else {
                1
            }
        }
        None => {
            eprintln!("Error: {error}");
            1
        }
    };

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code)
}
