use std::sync::Arc;

use super::{Presence, SourceStubber, StubData};

/// Asks each stubber in turn; the first answer wins.
#[derive(Default)]
pub struct AggregateSourceStubber {
    stubbers: Vec<Arc<dyn SourceStubber>>,
}

impl AggregateSourceStubber {
    pub fn new(stubbers: Vec<Arc<dyn SourceStubber>>) -> Self {
        AggregateSourceStubber { stubbers }
    }

    fn first_stub(&self, generate: impl Fn(&dyn SourceStubber) -> Option<StubData>) -> Option<StubData> {
        self.stubbers
            .iter()
            .find_map(|stubber| generate(stubber.as_ref()))
    }

    fn first_presence(&self, check: impl Fn(&dyn SourceStubber) -> Presence) -> Presence {
        self.stubbers
            .iter()
            .map(|stubber| check(stubber.as_ref()))
            .find(|presence| presence.is_known())
            .unwrap_or(Presence::Unknown)
    }
}

impl SourceStubber for AggregateSourceStubber {
    fn generate_class_stub(&self, class_name: &str) -> Option<StubData> {
        self.first_stub(|stubber| stubber.generate_class_stub(class_name))
    }

    fn generate_function_stub(&self, function_name: &str) -> Option<StubData> {
        self.first_stub(|stubber| stubber.generate_function_stub(function_name))
    }

    fn generate_constant_stub(&self, constant_name: &str) -> Option<StubData> {
        self.first_stub(|stubber| stubber.generate_constant_stub(constant_name))
    }

    fn is_present_class(&self, class_name: &str) -> Presence {
        self.first_presence(|stubber| stubber.is_present_class(class_name))
    }

    fn is_present_function(&self, function_name: &str) -> Presence {
        self.first_presence(|stubber| stubber.is_present_function(function_name))
    }
}
