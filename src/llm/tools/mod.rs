pub mod storefront;
mod tool;

pub use tool::{parameters_schema, FunctionDescriptor, LlmTool, ToolDescriptor};
