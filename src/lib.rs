mod compiler;
mod condition;
mod config;
mod engine;
mod error;
mod interface;
mod interpolate;
mod node;
mod parser;
mod path;
mod swap;
mod template;

// Public exports.
pub use compiler::{AttributeBinding, ElementRenderer, RendererNode, compile_tree};
pub use condition::{Condition, Operand, Operator};
pub use config::{Config, Directives, Missing};
pub use engine::JtmlEngine;
pub use error::{ConditionError, JtmlError, JtmlResult, ParseError, ParseErrorKind};
pub use interface::{JtmlInterface, PathUsage};
pub use interpolate::{CompiledText, Interpolated, Token, stringify};
pub use node::{Element, Fragment, Node, to_html};
pub use path::{IDENTITY, Path, resolve};
pub use swap::{Swap, UnknownSwap};
pub use template::Template;
