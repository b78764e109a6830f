/// `Display` output in the layout of PHP's `Reflection*::__toString()`.
use std::fmt::{self, Write as _};

use super::{
    ClassKind, ReflectionClass, ReflectionConstant, ReflectionFunction, ReflectionParameter,
};
use crate::located_source::LocatedSource;

fn source_tag(located_source: &LocatedSource) -> String {
    match located_source.extension_name() {
        Some(extension) if located_source.is_internal() => format!("internal:{}", extension),
        _ => "user".to_string(),
    }
}

/// `  @@ file start - end` for user code with a file; empty otherwise.
fn file_and_lines(located_source: &LocatedSource, start: usize, end: usize) -> Option<String> {
    if located_source.is_internal() {
        return None;
    }
    let file = located_source.file_name()?;
    Some(format!("  @@ {} {} - {}\n", file, start, end))
}

fn parameter_line(parameter: &ReflectionParameter) -> String {
    let mut line = format!(
        "Parameter #{} [ <{}> ",
        parameter.position(),
        if parameter.is_optional() { "optional" } else { "required" }
    );
    if let Some(hint) = parameter.type_hint() {
        let _ = write!(line, "{} ", hint);
    }
    if parameter.is_passed_by_reference() {
        line.push('&');
    }
    if parameter.is_variadic() {
        line.push_str("...");
    }
    let _ = write!(line, "${}", parameter.name());
    if let Some(default) = parameter.default_value_text() {
        let _ = write!(line, " = {}", default);
    }
    line.push_str(" ]");
    line
}

fn write_parameters(
    f: &mut fmt::Formatter<'_>,
    parameters: &[ReflectionParameter],
    indent: &str,
) -> fmt::Result {
    if parameters.is_empty() {
        return Ok(());
    }
    write!(f, "\n{indent}- Parameters [{}] {{\n", parameters.len())?;
    for parameter in parameters {
        writeln!(f, "{indent}  {}", parameter_line(parameter))?;
    }
    writeln!(f, "{indent}}}")
}

impl fmt::Display for ReflectionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [ <{}> function {} ] {{",
            if self.is_closure() { "Closure" } else { "Function" },
            source_tag(self.located_source()),
            self.name()
        )?;
        if let Some(location) =
            file_and_lines(self.located_source(), self.start_line(), self.end_line())
        {
            f.write_str(&location)?;
        }
        write_parameters(f, self.parameters(), "  ")?;
        if let Some(return_type) = self.return_type() {
            write!(f, "  - Return [ {} ]\n", return_type)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for ReflectionConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (type_name, value) = match self.value() {
            Some(value) => (value.php_type_name().to_ascii_lowercase(), value.to_php_string()),
            None => ("unknown type".to_string(), self.value_text().to_string()),
        };
        write!(
            f,
            "Constant [ <{}> {} {} ] {{",
            source_tag(self.located_source()),
            type_name,
            self.name()
        )?;
        if let Some(location) =
            file_and_lines(self.located_source(), self.start_line(), self.end_line())
        {
            write!(f, "\n{}", location)?;
        }
        write!(f, " {} }}", value)
    }
}

impl fmt::Display for ReflectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind() {
            ClassKind::Interface => "Interface",
            ClassKind::Trait => "Trait",
            ClassKind::Enum => "Enum",
            ClassKind::Class => "Class",
        };
        let mut header = String::new();
        if self.is_abstract() {
            header.push_str("abstract ");
        }
        if self.is_final() && self.kind() == ClassKind::Class {
            header.push_str("final ");
        }
        let _ = write!(header, "{} {}", self.kind().as_str(), self.name());
        if let Some(parent) = self.parent_class_name() {
            let _ = write!(header, " extends {}", parent);
        }
        if !self.interface_names().is_empty() {
            let keyword = if self.is_interface() { "extends" } else { "implements" };
            let _ = write!(header, " {} {}", keyword, self.interface_names().join(", "));
        }

        writeln!(f, "{} [ <{}> {} ] {{", label, source_tag(self.located_source()), header)?;
        if let Some(location) =
            file_and_lines(self.located_source(), self.start_line(), self.end_line())
        {
            f.write_str(&location)?;
        }

        write!(f, "\n  - Constants [{}] {{\n", self.constants().len())?;
        for constant in self.constants() {
            writeln!(
                f,
                "    Constant [ {} {} {} ] {{ {} }}",
                constant.visibility().as_str(),
                constant.value().php_type_name().to_ascii_lowercase(),
                constant.name(),
                constant.value().to_php_string()
            )?;
        }
        f.write_str("  }\n")?;

        write!(f, "\n  - Properties [{}] {{\n", self.properties().len())?;
        for property in self.properties() {
            write!(f, "    Property [ {} ", property.visibility().as_str())?;
            if property.is_static() {
                f.write_str("static ")?;
            }
            if property.is_readonly() {
                f.write_str("readonly ")?;
            }
            if let Some(hint) = property.type_hint() {
                write!(f, "{} ", hint)?;
            }
            writeln!(f, "${} ]", property.name())?;
        }
        f.write_str("  }\n")?;

        write!(f, "\n  - Methods [{}] {{\n", self.methods().len())?;
        for method in self.methods() {
            let mut modifiers = String::new();
            if method.is_abstract() {
                modifiers.push_str("abstract ");
            }
            if method.is_final() {
                modifiers.push_str("final ");
            }
            if method.is_static() {
                modifiers.push_str("static ");
            }
            writeln!(
                f,
                "    Method [ <{}> {}{} method {} ] {{",
                source_tag(self.located_source()),
                modifiers,
                method.visibility().as_str(),
                method.name()
            )?;
            if let Some(location) =
                file_and_lines(self.located_source(), method.start_line(), method.end_line())
            {
                write!(f, "  {}", location)?;
            }
            write_parameters(f, method.parameters(), "      ")?;
            if let Some(return_type) = method.return_type() {
                write!(f, "      - Return [ {} ]\n", return_type)?;
            }
            f.write_str("    }\n")?;
        }
        f.write_str("  }\n}")
    }
}
