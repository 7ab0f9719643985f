//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas, including attribute types, validation and plan modification.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    /// Checks the shape of a known, non-null value against this type
    fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items))
            | (AttributeType::Set(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(entries)) => {
                entries.values().all(|v| elem.accepts(v))
            }
            (AttributeType::Object(fields), Dynamic::Map(entries)) => entries
                .iter()
                .all(|(k, v)| fields.get(k).is_some_and(|t| t.accepts(v))),
            _ => false,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Bool => "bool",
            AttributeType::List(_) => "list",
            AttributeType::Set(_) => "set",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
        }
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("nested_type", &self.nested_type)
            .finish()
    }
}

// Validators and modifiers are behaviour, not data; clones carry the shape only
impl Clone for Attribute {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            r#type: self.r#type.clone(),
            description: self.description.clone(),
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            validators: vec![],
            plan_modifiers: vec![],
            nested_type: self.nested_type.clone(),
            deprecated: self.deprecated,
        }
    }
}

impl Attribute {
    /// Computed attributes the practitioner can never set
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Single,
    List,
}

/// Validator performs validation on attribute values during planning
/// Implement this for custom validation logic
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: DynamicValue,
    pub state_value: DynamicValue,
    pub plan_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of running every attribute's plan modifiers
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    /// Checks a configuration or planned value against the declared attributes.
    ///
    /// Required attributes must be present (unknown counts as present), values
    /// must match their declared type, and validators run on every known,
    /// non-null value including nested object attributes.
    pub fn validate(&self, value: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        validate_attributes(
            &self.block.attributes,
            value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        diagnostics
    }

    /// Runs plan modifiers for each top-level attribute.
    ///
    /// On create `prior_state` is null and nothing requires replacement.
    pub fn plan(
        &self,
        config: &DynamicValue,
        prior_state: &DynamicValue,
        proposed_new_state: &DynamicValue,
    ) -> PlannedChange {
        let mut planned_state = proposed_new_state.clone();
        let mut requires_replace = Vec::new();
        let mut diagnostics = Vec::new();

        if prior_state.is_null() || proposed_new_state.is_null() {
            return PlannedChange {
                planned_state,
                requires_replace,
                diagnostics,
            };
        }

        for attr in &self.block.attributes {
            if attr.plan_modifiers.is_empty() {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            let lookup = |v: &DynamicValue| DynamicValue::new(v.get(&path).cloned().unwrap_or(Dynamic::Null));

            let mut plan_value = lookup(&planned_state);
            let mut replace = false;
            for modifier in &attr.plan_modifiers {
                let response = modifier.modify(PlanModifierRequest {
                    config_value: lookup(config),
                    state_value: lookup(prior_state),
                    plan_value,
                    path: path.clone(),
                });
                plan_value = response.plan_value;
                replace |= response.requires_replace;
                diagnostics.extend(response.diagnostics);
            }

            if let Err(e) = planned_state.set(&path, plan_value.value) {
                diagnostics.push(
                    Diagnostic::error("Failed to apply plan modification", e.to_string())
                        .with_attribute(path.clone()),
                );
            }
            if replace {
                requires_replace.push(path);
            }
        }

        PlannedChange {
            planned_state,
            requires_replace,
            diagnostics,
        }
    }
}

fn validate_attributes(
    attributes: &[Attribute],
    object: &DynamicValue,
    base: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for attr in attributes {
        let path = base.clone().attribute(&attr.name);
        let value = object
            .get(&AttributePath::new(&attr.name))
            .cloned()
            .unwrap_or(Dynamic::Null);

        if value.is_null() {
            if attr.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", path),
                    )
                    .with_attribute(path),
                );
            }
            continue;
        }

        if !attr.r#type.accepts(&value) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!(
                        "Attribute \"{}\" must be a {}, got {}",
                        path,
                        attr.r#type.describe(),
                        value.type_name()
                    ),
                )
                .with_attribute(path),
            );
            continue;
        }

        if value.is_wholly_known() {
            for validator in &attr.validators {
                let response = validator.validate(ValidatorRequest {
                    config_value: DynamicValue::new(value.clone()),
                    path: path.clone(),
                });
                diagnostics.extend(response.diagnostics);
            }
        }

        if let Some(nested) = &attr.nested_type {
            match (&nested.nesting, &value) {
                (ObjectNestingMode::Single, Dynamic::Map(_)) => validate_attributes(
                    &nested.attributes,
                    &DynamicValue::new(value.clone()),
                    &path,
                    diagnostics,
                ),
                (ObjectNestingMode::List, Dynamic::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        validate_attributes(
                            &nested.attributes,
                            &DynamicValue::new(item.clone()),
                            &path.clone().index(i as i64),
                            diagnostics,
                        );
                    }
                }
                _ => {}
            }
        }
    }
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                nested_type: None,
                deprecated: false,
            },
        }
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    /// Add validator
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    /// Add plan modifier
    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    /// Set nested attributes; the attribute type is derived from them
    pub fn nested_type(mut self, nested: NestedType) -> Self {
        let fields: HashMap<String, AttributeType> = nested
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.r#type.clone()))
            .collect();
        self.attribute.r#type = match nested.nesting {
            ObjectNestingMode::Single => AttributeType::Object(fields),
            ObjectNestingMode::List => AttributeType::List(Box::new(AttributeType::Object(fields))),
        };
        self.attribute.nested_type = Some(nested);
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    version: 0,
                    attributes: Vec::new(),
                    description: String::new(),
                    deprecated: false,
                },
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    /// Add attribute
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
