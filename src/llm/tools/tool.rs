use crate::error::Result;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

/// Descriptor for tool function parameters
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Describe a function tool whose parameters are the JSON schema of `T`
    pub fn function<T: JsonSchema>(name: &str, description: &str) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                parameters: parameters_schema::<T>(),
            },
        }
    }
}

/// JSON schema for a parameter type with every subschema inlined
///
/// Gateways read `parameters` as a single self-contained object, so no
/// `$ref`/`definitions` indirection is emitted.
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// Trait for LLM tools
pub trait LlmTool: Send + Sync {
    /// Execute the tool with the arguments the model supplied
    fn run(&self, args: &Value) -> Result<Value>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }
}
