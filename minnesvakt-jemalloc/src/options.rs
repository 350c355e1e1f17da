//! Construction options for the dump-excluding allocator.
//!
//! Kept deliberately small: the allocator has no file or CLI surface, so
//! these options arrive from whichever configuration layer embeds them.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use minnesvakt_core::AllocatorError;

/// Granularity enforced on jemalloc size knobs.
const PAGE_SIZE: usize = 4096;

/// Options accepted by the nodump allocator factory.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct NodumpAllocatorOptions {
    /// Upper bound, in bytes, on how far jemalloc may grow the arena's
    /// retained virtual memory in one step (`arena.<i>.retain_grow_limit`).
    /// Zero keeps jemalloc's default. Must be a multiple of 4 KiB.
    #[serde(default = "default_retain_grow_limit")]
    #[validate(custom(function = validate_page_multiple))]
    pub retain_grow_limit: usize,
}

fn default_retain_grow_limit() -> usize {
    0
}

impl Default for NodumpAllocatorOptions {
    fn default() -> Self {
        Self {
            retain_grow_limit: default_retain_grow_limit(),
        }
    }
}

impl NodumpAllocatorOptions {
    /// Checks the options against their documented constraints, mapping
    /// validation failures into [`AllocatorError::InvalidArgument`]. Runs
    /// before any allocator state is touched.
    pub fn check(&self) -> Result<(), AllocatorError> {
        self.validate()
            .map_err(|errors| AllocatorError::InvalidArgument(format_validation_errors(&errors)))
    }
}

/// Validate that a size knob is zero or a whole number of pages.
fn validate_page_multiple(value: usize) -> Result<(), ValidationError> {
    if value % PAGE_SIZE == 0 {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_page_multiple"))
    }
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, errors) in errors.field_errors() {
        let _ = writeln!(output, "Field '{}':", field);
        for error in errors {
            let message = match &error.message {
                Some(msg) => msg.to_string(),
                None => error.code.to_string(),
            };
            let _ = writeln!(output, "  - {}", message);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_pass_validation() {
        NodumpAllocatorOptions::default()
            .check()
            .expect("default options should validate");
    }

    #[test]
    fn page_multiple_limit_passes_validation() {
        let options = NodumpAllocatorOptions {
            retain_grow_limit: 1 << 20,
        };
        assert!(options.check().is_ok());
    }

    #[test]
    fn unaligned_limit_is_rejected_as_invalid_argument() {
        let options = NodumpAllocatorOptions {
            retain_grow_limit: 12345,
        };
        match options.check() {
            Err(AllocatorError::InvalidArgument(message)) => {
                assert!(message.contains("retain_grow_limit"));
                assert!(message.contains("must_be_page_multiple"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }
}
