/// Namespace and `use` import tracking.
///
/// Each namespace block gets one [`NamespaceContext`] holding the imports
/// declared in it, so declarations can be qualified and docblock types
/// resolved the way PHP would resolve them.
use std::collections::HashMap;

use mago_syntax::ast::*;

use crate::util::{qualify, short_name};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    name: Option<String>,
    /// Lowercased alias → fully-qualified class name.
    class_uses: HashMap<String, String>,
    function_uses: HashMap<String, String>,
    /// Constant aliases are case-sensitive.
    const_uses: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportKind {
    Class,
    Function,
    Const,
}

macro_rules! import_kind {
    ($use_type:expr) => {
        if $use_type.is_function() {
            ImportKind::Function
        } else if $use_type.is_const() {
            ImportKind::Const
        } else {
            ImportKind::Class
        }
    };
}

impl NamespaceContext {
    pub fn new(name: Option<String>) -> Self {
        NamespaceContext {
            name: name.filter(|n| !n.is_empty()),
            ..Default::default()
        }
    }

    /// Build a context for a namespace body, collecting its `use` imports.
    pub(crate) fn from_statements<'a>(
        name: Option<String>,
        statements: impl Iterator<Item = &'a Statement<'a>>,
    ) -> Self {
        let mut context = NamespaceContext::new(name);
        for statement in statements {
            if let Statement::Use(use_stmt) = statement {
                context.add_use_items(&use_stmt.items);
            }
        }
        context
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn add_class_use(&mut self, alias: &str, target: &str) {
        self.class_uses.insert(
            alias.to_ascii_lowercase(),
            target.trim_start_matches('\\').to_string(),
        );
    }

    fn add_use_items(&mut self, items: &UseItems) {
        match items {
            UseItems::Sequence(seq) => {
                for item in seq.items.iter() {
                    self.register(item, None, ImportKind::Class);
                }
            }
            UseItems::TypedSequence(seq) => {
                let kind = import_kind!(seq.r#type);
                for item in seq.items.iter() {
                    self.register(item, None, kind);
                }
            }
            UseItems::TypedList(list) => {
                let kind = import_kind!(list.r#type);
                let prefix = list.namespace.value();
                for item in list.items.iter() {
                    self.register(item, Some(prefix), kind);
                }
            }
            UseItems::MixedList(list) => {
                let prefix = list.namespace.value();
                for maybe_typed in list.items.iter() {
                    let kind = match &maybe_typed.r#type {
                        Some(use_type) => import_kind!(use_type),
                        None => ImportKind::Class,
                    };
                    self.register(&maybe_typed.item, Some(prefix), kind);
                }
            }
        }
    }

    fn register(&mut self, item: &UseItem, group_prefix: Option<&str>, kind: ImportKind) {
        let item_name = item.name.value();
        let fqn = match group_prefix {
            Some(prefix) => format!("{}\\{}", prefix.trim_end_matches('\\'), item_name),
            None => item_name.to_string(),
        };
        let fqn = fqn.trim_start_matches('\\').to_string();
        let alias = match &item.alias {
            Some(alias) => alias.identifier.value.to_string(),
            None => short_name(&fqn).to_string(),
        };

        match kind {
            ImportKind::Class => {
                self.class_uses.insert(alias.to_ascii_lowercase(), fqn);
            }
            ImportKind::Function => {
                self.function_uses.insert(alias.to_ascii_lowercase(), fqn);
            }
            ImportKind::Const => {
                self.const_uses.insert(alias, fqn);
            }
        }
    }

    /// Resolve a class reference as written in this namespace to its
    /// fully-qualified form (without a leading `\`).
    pub fn resolve_class_name(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }
        if let Some(relative) = strip_namespace_keyword(name) {
            return qualify(self.name(), relative);
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.class_uses.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{}\\{}", target, rest),
                None => target.clone(),
            };
        }

        qualify(self.name(), name)
    }

    /// Resolve a function call name. Unqualified names that are not
    /// imported resolve to the namespaced candidate; PHP's global fallback
    /// is the caller's concern.
    pub fn resolve_function_name(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }
        if !name.contains('\\')
            && let Some(target) = self.function_uses.get(&name.to_ascii_lowercase())
        {
            return target.clone();
        }
        if name.contains('\\') {
            return self.resolve_class_name(name);
        }
        qualify(self.name(), name)
    }

    pub fn resolve_constant_name(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }
        if !name.contains('\\')
            && let Some(target) = self.const_uses.get(name)
        {
            return target.clone();
        }
        if name.contains('\\') {
            return self.resolve_class_name(name);
        }
        qualify(self.name(), name)
    }
}

fn strip_namespace_keyword(name: &str) -> Option<&str> {
    let (head, rest) = name.split_once('\\')?;
    head.eq_ignore_ascii_case("namespace").then_some(rest)
}
