//! Program entry points found while emitting procedures.

use jolt_llvm::FunctionId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    pub function: FunctionId,
    /// Fully qualified name of the declaring class.
    pub class: String,
}

/// Entry points in discovery order, each function at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryPoints {
    entries: Vec<EntryPoint>,
}

impl EntryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry point. Returns `false` if `function` is already
    /// registered.
    pub fn register(&mut self, function: FunctionId, class: &str) -> bool {
        if self.entries.iter().any(|e| e.function == function) {
            return false;
        }
        self.entries.push(EntryPoint {
            function,
            class: class.to_owned(),
        });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_ignored() {
        let mut entries = EntryPoints::new();
        assert!(entries.register(FunctionId::new(3), "app.Main"));
        assert!(!entries.register(FunctionId::new(3), "app.Main"));
        assert!(entries.register(FunctionId::new(4), "app.Tool"));
        let classes: Vec<&str> = entries.iter().map(|e| e.class.as_str()).collect();
        assert_eq!(classes, ["app.Main", "app.Tool"]);
    }
}
