/// Stub providers: PHP source describing symbols that are built into PHP
/// or its extensions and therefore have no user source file.
mod aggregate;
mod in_memory;
mod phpstorm;

use std::path::PathBuf;

pub use aggregate::AggregateSourceStubber;
pub use in_memory::InMemorySourceStubber;
pub use phpstorm::PhpStormStubsSourceStubber;

/// Stub source for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubData {
    stub: String,
    extension: Option<String>,
    file_name: Option<PathBuf>,
}

impl StubData {
    pub fn new(stub: impl Into<String>, extension: Option<String>) -> Self {
        StubData {
            stub: stub.into(),
            extension,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn stub(&self) -> &str {
        &self.stub
    }

    /// The extension the symbol belongs to. Stubs without one do not
    /// describe an internal symbol.
    pub fn extension_name(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn file_name(&self) -> Option<&std::path::Path> {
        self.file_name.as_deref()
    }
}

/// Whether a stubber knows a symbol to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// The stubber has no information about the symbol.
    Unknown,
}

impl Presence {
    pub fn is_known(self) -> bool {
        self != Presence::Unknown
    }
}

/// Produces stub source by symbol name. Lookups are case-insensitive for
/// every kind; the AST locator applies the kind's real case rules to the
/// parsed stub.
pub trait SourceStubber: Send + Sync {
    fn generate_class_stub(&self, class_name: &str) -> Option<StubData>;

    fn generate_function_stub(&self, function_name: &str) -> Option<StubData>;

    fn generate_constant_stub(&self, constant_name: &str) -> Option<StubData>;

    fn is_present_class(&self, class_name: &str) -> Presence;

    fn is_present_function(&self, function_name: &str) -> Presence;
}
