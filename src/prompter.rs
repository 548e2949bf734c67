//! Interactive collection of a value described by a JSON Schema.
//!
//! The prompter walks a [`SchemaNode`] tree and asks one question per
//! leaf. Answers that do not parse for the leaf type are asked again,
//! without limit: the loop waits on a human, it is not a fault. The only
//! way a session ends early is a malformed schema or an input source that
//! runs out of lines.

use serde_json::{Map, Number, Value};

use crate::error::PromptError;
use crate::line_io::LineIo;
use crate::schema::{Property, SchemaKind, SchemaNode, Variant};
use crate::style::{colorize, Color, Styled};

/// Label used for a union menu when the caller gave none.
const UNION_LABEL: &str = "Type";

/// Question asked before each array element.
const ADD_ENTRY_LABEL: &str = "Add entry?";

/// Collects schema-shaped values over a [`LineIo`] device.
pub struct SchemaPrompter<'io> {
    io: &'io mut dyn LineIo,
    colors: bool,
}

/// One leaf question as rendered on the terminal.
struct Question<'q> {
    label: &'q str,
    required: bool,
    default: Option<Value>,
    help: Option<&'q str>,
}

/// Raw outcome of a leaf question.
enum Answer {
    /// What the operator typed, possibly empty.
    Text(String),
    /// The operator accepted the default with an empty line.
    Default(Value),
}

impl<'io> SchemaPrompter<'io> {
    pub fn new(io: &'io mut dyn LineIo) -> Self {
        Self { io, colors: false }
    }

    /// Enable ANSI styling of menus and prompt markers.
    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Parse a raw schema document and collect a value for it.
    ///
    /// The whole document is checked before the first question, so a
    /// schema error never leaves a half-answered session behind.
    ///
    /// # Errors
    ///
    /// `PromptError::Schema` for a malformed document, `PromptError::Input`
    /// when the input runs out, `PromptError::Io` when the device fails.
    pub fn read_document(&mut self, schema: &Value) -> Result<Value, PromptError> {
        let node = SchemaNode::parse(schema)?;
        self.read(&node, "", false)
    }

    /// Collect a value for `schema`.
    ///
    /// `Value::Null` means "no value": an optional number left empty, or a
    /// `null` const.
    pub fn read(
        &mut self,
        schema: &SchemaNode,
        prompt: &str,
        required: bool,
    ) -> Result<Value, PromptError> {
        let help = schema.description.as_deref();

        match &schema.kind {
            SchemaKind::Const(value) => Ok(value.clone()),
            SchemaKind::Enum(values) => {
                self.ask_enum(values, prompt, schema.default.as_ref(), help)
            }
            SchemaKind::Union { variants, .. } => self.ask_variant(variants, prompt, help),
            SchemaKind::String => {
                let question = Question {
                    label: prompt,
                    required,
                    default: schema.default.clone(),
                    help,
                };
                match self.ask(&question)? {
                    Answer::Text(text) => Ok(Value::String(text)),
                    Answer::Default(value) => Ok(value),
                }
            }
            SchemaKind::Number => {
                let question = Question {
                    label: prompt,
                    required,
                    default: schema.default.clone(),
                    help,
                };
                self.ask_number(&question)
            }
            SchemaKind::Boolean => {
                let default = schema
                    .default
                    .as_ref()
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                self.ask_boolean(prompt, default, help).map(Value::Bool)
            }
            SchemaKind::Object(fields) => self.read_object(fields),
            SchemaKind::Array(items) => self.read_array(items),
        }
    }

    fn read_object(&mut self, fields: &[Property]) -> Result<Value, PromptError> {
        let mut result = Map::new();

        for field in fields {
            let value = self.read(&field.schema, field.label(), field.required)?;

            // Optional fields without a value are left out entirely.
            if field.required || !value.is_null() {
                result.insert(field.name.clone(), value);
            }
        }

        Ok(Value::Object(result))
    }

    fn read_array(&mut self, items: &SchemaNode) -> Result<Value, PromptError> {
        let mut result = Vec::new();

        self.io.write_line("")?;

        while self.ask_boolean(ADD_ENTRY_LABEL, true, None)? {
            result.push(self.read(items, "", false)?);
        }

        Ok(Value::Array(result))
    }

    fn ask_enum(
        &mut self,
        values: &[Value],
        prompt: &str,
        default: Option<&Value>,
        help: Option<&str>,
    ) -> Result<Value, PromptError> {
        self.write_menu(values.iter().map(display_value))?;

        let default_index = default
            .and_then(|d| values.iter().position(|v| v == d))
            .map(|i| Value::from(i + 1));

        loop {
            let choice = self.ask_index(prompt, default_index.clone(), help)?;
            if let Some(value) = pick(values, choice) {
                return Ok(value.clone());
            }
        }
    }

    fn ask_variant(
        &mut self,
        variants: &[Variant],
        prompt: &str,
        help: Option<&str>,
    ) -> Result<Value, PromptError> {
        self.write_menu(variants.iter().map(|v| v.title.clone()))?;

        let label = if prompt.is_empty() { UNION_LABEL } else { prompt };

        loop {
            let choice = self.ask_index(label, None, help)?;
            if let Some(variant) = pick(variants, choice) {
                return self.read(&variant.schema, "", false);
            }
        }
    }

    fn write_menu(&mut self, entries: impl Iterator<Item = String>) -> Result<(), PromptError> {
        self.io.write_line("")?;

        for (index, entry) in entries.enumerate() {
            self.io.write("  ")?;
            let marker = colorize(format!("{}) ", index + 1), Color::Cyan);
            self.io.write(&marker.render(self.colors))?;
            self.io.write_line(&entry)?;
        }

        Ok(())
    }

    /// Ask for a required integer, typically a 1-based menu index.
    fn ask_index(
        &mut self,
        label: &str,
        default: Option<Value>,
        help: Option<&str>,
    ) -> Result<i64, PromptError> {
        let question = Question {
            label,
            required: true,
            default,
            help,
        };

        loop {
            let parsed = match self.ask(&question)? {
                Answer::Text(text) => text.trim().parse::<i64>().ok(),
                Answer::Default(value) => value.as_i64(),
            };
            if let Some(index) = parsed {
                return Ok(index);
            }
        }
    }

    fn ask_number(&mut self, question: &Question<'_>) -> Result<Value, PromptError> {
        loop {
            match self.ask(question)? {
                Answer::Text(text) => {
                    if let Some(number) = parse_number(&text) {
                        return Ok(Value::Number(number));
                    }
                    if text.is_empty() && !question.required {
                        return Ok(Value::Null);
                    }
                }
                Answer::Default(Value::Number(number)) => return Ok(Value::Number(number)),
                Answer::Default(Value::String(text)) => {
                    if let Some(number) = parse_number(&text) {
                        return Ok(Value::Number(number));
                    }
                }
                Answer::Default(_) => {}
            }
        }
    }

    fn ask_boolean(
        &mut self,
        prompt: &str,
        default: bool,
        help: Option<&str>,
    ) -> Result<bool, PromptError> {
        let label = format!("{} <y/n>", prompt);
        let question = Question {
            label: &label,
            required: false,
            default: Some(Value::from(if default { "y" } else { "n" })),
            help,
        };

        loop {
            let answer = match self.ask(&question)? {
                Answer::Text(text) => text,
                Answer::Default(value) => display_value(&value),
            };
            match answer.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                "" => return Ok(default),
                _ => {}
            }
        }
    }

    /// Render the prompt and read until an acceptable raw answer arrives.
    ///
    /// An empty line yields the default when there is one, an empty text
    /// when the question is optional, and is asked again otherwise.
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer, PromptError> {
        loop {
            self.write_prompt(question)?;

            let Some(line) = self.io.read_line()? else {
                return Err(PromptError::Input {
                    prompt: question.label.to_string(),
                });
            };

            if !line.is_empty() {
                return Ok(Answer::Text(line));
            }
            if let Some(default) = &question.default {
                return Ok(Answer::Default(default.clone()));
            }
            if !question.required {
                return Ok(Answer::Text(line));
            }
        }
    }

    fn write_prompt(&mut self, question: &Question<'_>) -> Result<(), PromptError> {
        let mut parts = vec![Styled::plain(question.label)];

        if question.required {
            parts.push(colorize("*", Color::Magenta));
        }
        if let Some(default) = &question.default {
            parts.push(colorize(format!(" [{}]", display_value(default)), Color::Yellow));
        }
        if let Some(help) = question.help {
            parts.push(colorize(format!(" ({})", help), Color::Green));
        }
        parts.push(Styled::plain(": "));

        for part in &parts {
            self.io.write(&part.render(self.colors))?;
        }
        self.io.write_line("")?;
        self.io.write("> ")?;
        Ok(())
    }
}

/// 1-based lookup; anything out of range is `None`.
fn pick<T>(entries: &[T], choice: i64) -> Option<&T> {
    let index = usize::try_from(choice).ok()?.checked_sub(1)?;
    entries.get(index)
}

/// Integer first, then floating point. Non-finite floats are rejected
/// since JSON cannot carry them.
fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(uint) = text.parse::<u64>() {
        return Some(Number::from(uint));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

/// Strings verbatim, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
