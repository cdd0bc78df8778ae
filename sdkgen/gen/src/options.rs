//! Typed generation options.

use std::path::PathBuf;

use crate::errors::GeneratorError;

/// Version requirement used when the runtime is taken from the registry.
pub const DEFAULT_RUNTIME_VERSION: &str = "0.1";

/// Package name used when none is given.
pub const DEFAULT_CRATE_NAME: &str = "sdk-client";

/// What a generation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Source files only.
    #[default]
    Source,
    /// Source files plus a compiled library.
    Artifact,
}

/// Where the generated crate gets `sdkgen-runtime` from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeDependency {
    /// A registry version requirement, e.g. `"0.1"`.
    Version(String),
    /// A local checkout of the runtime crate.
    Path(PathBuf),
}

impl Default for RuntimeDependency {
    fn default() -> Self {
        Self::Version(DEFAULT_RUNTIME_VERSION.to_string())
    }
}

/// Options for [`crate::output::emit`].
///
/// ## Examples
///
/// ```
/// use sdkgen_gen::options::EmitOptions;
///
/// let options = EmitOptions {
///     force: true,
///     ..EmitOptions::default()
/// };
/// assert!(options.include_unsupported_as_errors);
/// assert!(!options.strict_compile_check);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Place a `compile_error!` marker for every unrepresentable schema
    /// feature and fail the run if any exist. When off, such features are
    /// left out of the source and only listed in the report.
    ///
    /// Default: `true`.
    pub include_unsupported_as_errors: bool,
    /// Parse every emitted file and report each syntax error and each
    /// `compile_error!` as a diagnostic; when none are found, type-check the
    /// client with `cargo check` before declaring success.
    ///
    /// Default: `false`.
    pub strict_compile_check: bool,
    /// Also build the generated crate into a loadable library.
    ///
    /// Default: `false`.
    pub emit_binary_artifact: bool,
    /// Emit even when unsupported-feature markers are present.
    ///
    /// Default: `false`.
    pub force: bool,
    /// Write the schema description as read next to the output.
    ///
    /// Default: `false`.
    pub debug: bool,
    /// Mark the crate as compatible with the downstream UI toolkit. Only
    /// recorded in the manifest metadata.
    ///
    /// Default: `false`.
    pub ui_compat: bool,
    /// Package name of the generated crate.
    ///
    /// Default: `"sdk-client"`.
    pub crate_name: String,
    /// Default: registry version `"0.1"`.
    pub runtime: RuntimeDependency,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            include_unsupported_as_errors: true,
            strict_compile_check: false,
            emit_binary_artifact: false,
            force: false,
            debug: false,
            ui_compat: false,
            crate_name: DEFAULT_CRATE_NAME.to_string(),
            runtime: RuntimeDependency::default(),
        }
    }
}

impl EmitOptions {
    /// Applies an output mode selector.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.emit_binary_artifact = mode == OutputMode::Artifact;
        self
    }

    /// The crate name as a Rust identifier (`sdk-client` → `sdk_client`).
    pub fn lib_name(&self) -> String {
        self.crate_name.replace('-', "_")
    }

    /// Checks option values that cannot be expressed in the types.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Config`] for an unusable crate name or
    /// runtime version.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        let mut chars = self.crate_name.chars();
        let legal = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !legal {
            return Err(GeneratorError::Config(format!(
                "'{}' is not a valid package name",
                self.crate_name
            )));
        }

        if let RuntimeDependency::Version(version) = &self.runtime
            && (version.trim().is_empty() || version.contains('"'))
        {
            return Err(GeneratorError::Config(format!(
                "'{version}' is not a valid runtime version requirement"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let options = EmitOptions::default();
        assert!(options.include_unsupported_as_errors);
        assert!(!options.strict_compile_check);
        assert!(!options.emit_binary_artifact);
        assert!(!options.force);
        assert!(!options.debug);
        assert!(!options.ui_compat);
        assert_eq!(options.crate_name, "sdk-client");
        assert_eq!(options.runtime, RuntimeDependency::Version("0.1".into()));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn artifact_mode_enables_binary_build() {
        let options = EmitOptions::default().with_mode(OutputMode::Artifact);
        assert!(options.emit_binary_artifact);
        assert_eq!(options.lib_name(), "sdk_client");
    }

    #[test]
    fn bad_names_are_rejected() {
        for name in ["", "1client", "my client", "café"] {
            let options = EmitOptions {
                crate_name: name.to_string(),
                ..EmitOptions::default()
            };
            assert!(matches!(options.validate(), Err(GeneratorError::Config(_))), "{name}");
        }
    }
}
