//! Named prompt declarations.
//!
//! A [`PromptSpec`] ties a template to the schema of the values that fill it
//! and the schema of the reply the model must produce. All consistency checks
//! happen in [`PromptSpecBuilder::build`], so a spec that exists is known to
//! render: every slot in its template is declared in its input schema.

use serde_json::Value;

use crate::error::{DefinitionError, ValidationError};
use crate::schema::{ObjectSchema, ValidatedValue};
use crate::template::Template;

/// An immutable prompt declaration: name, input schema, output schema and
/// template.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    name: String,
    input: ObjectSchema,
    output: ObjectSchema,
    template: Template,
}

impl PromptSpec {
    pub fn builder(name: impl Into<String>) -> PromptSpecBuilder {
        PromptSpecBuilder {
            name: name.into(),
            input: ObjectSchema::new(),
            output: None,
            template: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_schema(&self) -> &ObjectSchema {
        &self.input
    }

    pub fn output_schema(&self) -> &ObjectSchema {
        &self.output
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Validate caller input and bind it to this spec.
    pub fn request(&self, input: &Value) -> Result<InvocationRequest<'_>, ValidationError> {
        let values = self.input.validate(input)?;
        Ok(InvocationRequest { spec: self, values })
    }
}

/// Input values that conform to a [`PromptSpec`]'s input schema.
#[derive(Debug, Clone)]
pub struct InvocationRequest<'a> {
    spec: &'a PromptSpec,
    values: ValidatedValue,
}

impl<'a> InvocationRequest<'a> {
    pub fn spec(&self) -> &'a PromptSpec {
        self.spec
    }

    pub fn values(&self) -> &ValidatedValue {
        &self.values
    }

    /// The prompt text sent to the model.
    pub fn render(&self) -> String {
        self.spec.template.render(self.values.as_map())
    }
}

/// Builder for [`PromptSpec`]. `build` performs every definition-time check.
pub struct PromptSpecBuilder {
    name: String,
    input: ObjectSchema,
    output: Option<ObjectSchema>,
    template: Option<String>,
}

impl PromptSpecBuilder {
    /// Input schema. Defaults to an empty object for prompts without input.
    pub fn input(mut self, schema: ObjectSchema) -> Self {
        self.input = schema;
        self
    }

    pub fn output(mut self, schema: ObjectSchema) -> Self {
        self.output = Some(schema);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn build(self) -> Result<PromptSpec, DefinitionError> {
        let output = self.output.ok_or_else(|| DefinitionError::Incomplete {
            prompt: self.name.clone(),
            part: "output schema",
        })?;
        if output.is_empty() {
            return Err(DefinitionError::Incomplete {
                prompt: self.name,
                part: "output fields",
            });
        }
        let source = self.template.ok_or_else(|| DefinitionError::Incomplete {
            prompt: self.name.clone(),
            part: "template",
        })?;

        self.input.check()?;
        output.check()?;
        let template = Template::parse(source)?;

        if let Some(slot) = template
            .slots()
            .into_iter()
            .find(|slot| self.input.get(slot).is_none())
        {
            return Err(DefinitionError::UnknownSlot {
                prompt: self.name,
                slot: slot.to_string(),
            });
        }

        Ok(PromptSpec {
            name: self.name,
            input: self.input,
            output,
            template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Constraint;
    use serde_json::json;

    fn greeting() -> PromptSpecBuilder {
        PromptSpec::builder("greeting")
            .input(ObjectSchema::new().text("name", "Who to greet"))
            .output(ObjectSchema::new().text("greeting", "The greeting"))
            .template("Greet {{name}} warmly.")
    }

    #[test]
    fn builds_and_renders() {
        let spec = greeting().build().unwrap();
        let request = spec.request(&json!({"name": "Asha"})).unwrap();
        assert_eq!(request.render(), "Greet Asha warmly.");
        assert_eq!(request.spec().name(), "greeting");
    }

    #[test]
    fn unknown_slot_is_definition_error() {
        let err = greeting()
            .template("Greet {{name}} on {{day}}.")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownSlot {
                prompt: "greeting".into(),
                slot: "day".into()
            }
        );
    }

    #[test]
    fn missing_parts_are_definition_errors() {
        let err = PromptSpec::builder("p")
            .template("hi")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Incomplete { part: "output schema", .. }));

        let err = PromptSpec::builder("p")
            .output(ObjectSchema::new().text("x", ""))
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Incomplete { part: "template", .. }));

        let err = PromptSpec::builder("p")
            .output(ObjectSchema::new())
            .template("hi")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Incomplete { part: "output fields", .. }));
    }

    #[test]
    fn malformed_output_schema_rejected() {
        let err = greeting()
            .output(ObjectSchema::new().number("score", 2.0, 1.0, ""))
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MalformedSchema { .. }));
    }

    #[test]
    fn request_validates_input() {
        let spec = greeting().build().unwrap();
        let err = spec.request(&json!({})).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.constraint, Constraint::Required);

        let err = spec.request(&json!({"name": ""})).unwrap_err();
        assert_eq!(err.constraint, Constraint::NonEmpty);
    }
}
