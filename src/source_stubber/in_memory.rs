use std::collections::HashMap;

use super::{Presence, SourceStubber, StubData};

/// A fixed name → stub table.
///
/// Names are matched case-insensitively and without a leading `\`. A name
/// in the table is [`Presence::Present`]; anything else is unknown.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceStubber {
    classes: HashMap<String, StubData>,
    functions: HashMap<String, StubData>,
    constants: HashMap<String, StubData>,
}

fn key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

impl InMemorySourceStubber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, name: &str, stub: StubData) -> Self {
        self.classes.insert(key(name), stub);
        self
    }

    pub fn with_function(mut self, name: &str, stub: StubData) -> Self {
        self.functions.insert(key(name), stub);
        self
    }

    pub fn with_constant(mut self, name: &str, stub: StubData) -> Self {
        self.constants.insert(key(name), stub);
        self
    }

    fn presence(table: &HashMap<String, StubData>, name: &str) -> Presence {
        if table.contains_key(&key(name)) {
            Presence::Present
        } else {
            Presence::Unknown
        }
    }
}

impl SourceStubber for InMemorySourceStubber {
    fn generate_class_stub(&self, class_name: &str) -> Option<StubData> {
        self.classes.get(&key(class_name)).cloned()
    }

    fn generate_function_stub(&self, function_name: &str) -> Option<StubData> {
        self.functions.get(&key(function_name)).cloned()
    }

    fn generate_constant_stub(&self, constant_name: &str) -> Option<StubData> {
        self.constants.get(&key(constant_name)).cloned()
    }

    fn is_present_class(&self, class_name: &str) -> Presence {
        Self::presence(&self.classes, class_name)
    }

    fn is_present_function(&self, function_name: &str) -> Presence {
        Self::presence(&self.functions, function_name)
    }
}
