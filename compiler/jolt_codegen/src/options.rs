//! Code generation options.

use jolt_llvm::DataLayout;
use jolt_types::ClassTable;

/// How much debug information to record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugLevel {
    #[default]
    None,
    /// Scopes and parameter variables.
    Full,
}

/// Options for one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Name of the emitted module.
    pub module_name: String,
    /// Procedure name that marks a program entry point.
    pub entry_name: String,
    /// Fully qualified name of the platform string class.
    pub string_class: String,
    /// Runtime allocation function, `i8* (i64)`.
    pub allocator: String,
    pub data_layout: DataLayout,
    pub debug: DebugLevel,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            module_name: "jolt".to_owned(),
            entry_name: "main".to_owned(),
            string_class: ClassTable::STRING_NAME.to_owned(),
            allocator: "jolt_alloc".to_owned(),
            data_layout: DataLayout::default(),
            debug: DebugLevel::None,
        }
    }
}

impl CodegenOptions {
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    #[must_use]
    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    #[must_use]
    pub fn with_string_class(mut self, fqn: impl Into<String>) -> Self {
        self.string_class = fqn.into();
        self
    }

    #[must_use]
    pub fn with_allocator(mut self, name: impl Into<String>) -> Self {
        self.allocator = name.into();
        self
    }

    #[must_use]
    pub fn with_data_layout(mut self, layout: DataLayout) -> Self {
        self.data_layout = layout;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, level: DebugLevel) -> Self {
        self.debug = level;
        self
    }
}
