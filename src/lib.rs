/// Static reflection for PHP source code.
///
/// Classes, functions and constants are located in source files, Composer
/// autoload data, runtime closures or phpstorm-stubs, parsed with
/// `mago-syntax`, and turned into owned reflection values. No PHP code is
/// loaded or executed.
///
/// Most hosts start from [`BetterReflection`]; the individual locators and
/// reflectors can also be composed by hand.
pub mod ast;
pub mod better_reflection;
pub mod composer;
pub mod config;
pub mod docblock;
pub mod error;
pub mod identifier;
pub mod located_source;
pub mod node_compiler;
pub mod parser;
pub mod reflection;
pub mod reflector;
pub mod source_locator;
pub mod source_stubber;
pub mod util;

pub use better_reflection::BetterReflection;
pub use config::{PhpVersion, ReflectionConfig};
pub use error::{Error, Result};
pub use identifier::{Identifier, IdentifierType, NameRules};
pub use located_source::LocatedSource;
pub use reflection::{
    Reflection, ReflectionClass, ReflectionConstant, ReflectionFunction, ReflectionMethod,
    ReflectionParameter, ReflectionProperty,
};
pub use reflector::{ClassReflector, ConstantReflector, FunctionReflector, Reflector, ReflectorId};
