//! Analysis configuration

/// Knobs for one [`Analysis`](super::Analysis) run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Declarations without a type specifier default to `int`
    pub implicit_int: bool,
    /// Report labels that are jumped to but never defined
    pub check_labels: bool,
    /// Keep reported errors for later inspection instead of only logging
    pub record_diagnostics: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            implicit_int: true,
            check_labels: true,
            record_diagnostics: true,
        }
    }
}
