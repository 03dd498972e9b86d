//! Error handling foundation for dialogue-agent.
//!
//! Only the `Result` alias lives here. Each crate defines its own error
//! enums in its own `error` module; a rootcause report wraps one of those
//! enums where an operation crosses an I/O boundary (reading flow files,
//! process startup). Per-turn APIs return the plain enums.

use rootcause::Report;

/// Result whose error is a rootcause report carrying context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct FlowMissing;

    impl fmt::Display for FlowMissing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("flow file missing")
        }
    }

    impl std::error::Error for FlowMissing {}

    fn open_flow(present: bool) -> Result<&'static str, FlowMissing> {
        if !present {
            Err(FlowMissing)?;
        }
        Ok("conversation_tree: []")
    }

    #[test]
    fn domain_errors_become_reports() {
        assert_eq!(open_flow(true).expect("present"), "conversation_tree: []");
        let report = open_flow(false).unwrap_err();
        assert!(report.to_string().contains("flow file missing"));
    }
}
